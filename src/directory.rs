use core::fmt;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::PathBuf;
use std::sync::Arc;

use crate::decoder::stream::SmartReader;
use crate::error::{TiffError, TiffFormatError, TiffResult, UsageError};
use crate::geo::GeoKeyDirectory;
use crate::ifd::{Entry, Value};
use crate::registry::{self, TagRegistry};
use crate::tags::{ByteOrder, Tag, TagFamily, Type};

/// How a tag is addressed: by numeric id, by symbolic name or by id within a family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKey<'a> {
    Id(u16),
    Name(&'a str),
    Scoped(TagFamily, u16),
}

impl From<u16> for TagKey<'_> {
    fn from(id: u16) -> Self {
        TagKey::Id(id)
    }
}

impl<'a> From<&'a str> for TagKey<'a> {
    fn from(name: &'a str) -> Self {
        TagKey::Name(name)
    }
}

/// Named tags address the Tiff family.
impl From<Tag> for TagKey<'_> {
    fn from(tag: Tag) -> Self {
        TagKey::Scoped(TagFamily::Tiff, tag.to_u16())
    }
}

impl From<(TagFamily, u16)> for TagKey<'_> {
    fn from((family, id): (TagFamily, u16)) -> Self {
        TagKey::Scoped(family, id)
    }
}

impl fmt::Display for TagKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKey::Id(id) => write!(f, "{id:#06x}"),
            TagKey::Name(name) => f.write_str(name),
            TagKey::Scoped(family, id) => write!(f, "{family} {id:#06x}"),
        }
    }
}

/// Where the image data of a directory is referenced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterKind {
    Strip,
    Tile,
    Free,
    /// A JPEG stream, usually the thumbnail of IFD1.
    JpegInterchange,
}

impl RasterKind {
    /// Checked in this order, the first one present wins.
    pub const ALL: [RasterKind; 4] = [
        RasterKind::Strip,
        RasterKind::Tile,
        RasterKind::Free,
        RasterKind::JpegInterchange,
    ];

    /// The offsets and byte counts tags.
    pub fn tags(self) -> (Tag, Tag) {
        match self {
            RasterKind::Strip => (Tag::StripOffsets, Tag::StripByteCounts),
            RasterKind::Tile => (Tag::TileOffsets, Tag::TileByteCounts),
            RasterKind::Free => (Tag::FreeOffsets, Tag::FreeByteCounts),
            RasterKind::JpegInterchange => {
                (Tag::JpegInterchangeFormat, Tag::JpegInterchangeFormatLength)
            }
        }
    }

    fn detect(entries: &BTreeMap<u16, Entry>) -> Option<RasterKind> {
        RasterKind::ALL
            .into_iter()
            .find(|kind| entries.contains_key(&kind.tags().0.to_u16()))
    }
}

/// Where to load the raster of a directory from when it is needed.
#[derive(Clone, Debug)]
pub enum RasterSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Raster {
    pub(crate) kind: Option<RasterKind>,
    pub(crate) blocks: Option<Vec<Vec<u8>>>,
    pub(crate) source: Option<RasterSource>,
}

/// An Image File Directory (IFD).
///
/// A directory maps tag ids of one [`TagFamily`] to [`Entry`]s. Tags of the Exif, GPS and
/// Interoperability families are kept in sub-directories which are created when a tag of their
/// family is inserted. The root directory of a file can also carry a raster payload, a thumbnail
/// directory and GeoTIFF keys.
#[doc(alias = "IFD")]
#[derive(Clone)]
pub struct Directory {
    family: TagFamily,
    /// Ascending by tag id, the order entries are written in.
    pub(crate) entries: BTreeMap<u16, Entry>,
    pub(crate) exif: Option<Box<Directory>>,
    pub(crate) gps: Option<Box<Directory>>,
    pub(crate) interop: Option<Box<Directory>>,
    pub(crate) raster: Raster,
    pub(crate) thumbnail: Option<Box<Directory>>,
    pub(crate) geo: Option<GeoKeyDirectory>,
    registry: &'static (dyn TagRegistry + Sync),
}

impl Directory {
    /// Create a directory without entries using the standard tag tables.
    pub fn new(family: TagFamily) -> Self {
        Self::with_registry(family, registry::standard())
    }

    /// Create a directory without entries that takes tag metadata from `registry`.
    pub fn with_registry(family: TagFamily, registry: &'static (dyn TagRegistry + Sync)) -> Self {
        Directory {
            family,
            entries: BTreeMap::new(),
            exif: None,
            gps: None,
            interop: None,
            raster: Raster::default(),
            thumbnail: None,
            geo: None,
            registry,
        }
    }

    pub fn family(&self) -> TagFamily {
        self.family
    }

    pub fn registry(&self) -> &'static (dyn TagRegistry + Sync) {
        self.registry
    }

    /// Get the number of entries of this directory, without sub-directories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are any entries in this directory. Note that an empty directory can not be
    /// encoded in the file, it must contain at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve the entry of a tag, searching sub-directories as well.
    ///
    /// A bare numeric id is looked up in this directory first and then in the Exif, GPS and
    /// Interoperability directories, in that order.
    pub fn get<'k>(&self, key: impl Into<TagKey<'k>>) -> Option<&Entry> {
        match key.into() {
            TagKey::Id(id) => self
                .search_order()
                .into_iter()
                .filter_map(|family| self.directory(family))
                .find_map(|dir| dir.entries.get(&id)),
            key => {
                let (family, id) = self.resolve(key).ok()?;
                self.directory(family)?.entries.get(&id)
            }
        }
    }

    /// The logical value of a tag.
    pub fn value<'k>(&self, key: impl Into<TagKey<'k>>) -> TiffResult<Value> {
        let key = key.into();
        self.get(key)
            .map(Entry::value)
            .ok_or_else(|| TiffError::NotFound(key.to_string()))
    }

    /// The meaning of an enumerated value.
    pub fn meaning<'k>(&self, key: impl Into<TagKey<'k>>) -> Option<&'static str> {
        self.get(key)?.meaning(self.registry)
    }

    /// Check if the directory or one of its sub-directories contains a tag.
    pub fn contains<'k>(&self, key: impl Into<TagKey<'k>>) -> bool {
        self.get(key).is_some()
    }

    /// Set the value of a tag, routing it into the sub-directory of its family.
    ///
    /// Known tags get a type accepted by the tag. Unknown tags keep the type of a present entry
    /// or use the natural type of the value.
    pub fn set<'k>(&mut self, key: impl Into<TagKey<'k>>, value: impl Into<Value>) -> TiffResult<()> {
        let (family, id) = self.resolve(key.into())?;
        let value = value.into();
        let registry = self.registry;
        let target = self.directory_mut(family)?;

        let type_ = match (registry.by_id(family, id), target.entries.get(&id)) {
            (None, Some(present)) => Some(present.field_type()),
            _ => None,
        };
        let entry = Entry::with_registry(registry, family, id, type_, Some(value))?;
        log::trace!("set {} {} to {:?}", family, id, entry.field_type());
        target.entries.insert(id, entry);
        Ok(())
    }

    /// Set the value of a tag with an explicit entry type.
    pub fn set_typed<'k>(
        &mut self,
        key: impl Into<TagKey<'k>>,
        type_: Type,
        value: impl Into<Value>,
    ) -> TiffResult<()> {
        let (family, id) = self.resolve(key.into())?;
        let entry = Entry::with_registry(self.registry, family, id, Some(type_), Some(value.into()))?;
        self.insert_entry(entry)?;
        Ok(())
    }

    /// Insert an entry into the directory of its family, replacing an entry with the same tag.
    pub fn insert_entry(&mut self, entry: Entry) -> TiffResult<Option<Entry>> {
        let target = self.directory_mut(entry.family())?;
        Ok(target.entries.insert(entry.tag(), entry))
    }

    /// Remove a tag from this directory or the sub-directory holding it.
    pub fn remove<'k>(&mut self, key: impl Into<TagKey<'k>>) -> Option<Entry> {
        let (family, id) = match key.into() {
            TagKey::Id(id) => {
                let family = self
                    .search_order()
                    .into_iter()
                    .find(|family| {
                        self.directory(*family)
                            .map_or(false, |dir| dir.entries.contains_key(&id))
                    })?;
                (family, id)
            }
            key => self.resolve(key).ok()?,
        };
        self.slot_mut(family)?.entries.remove(&id)
    }

    /// Iterate over the entries of this directory only.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.values()
    }

    /// Iterate depth first over the entries of this directory and all sub-directories.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Entry> + '_> {
        Box::new(
            self.entries
                .values()
                .chain(self.sub_directories().flat_map(|dir| dir.iter())),
        )
    }

    /// The direct sub-directories, in file order.
    pub fn sub_directories(&self) -> impl Iterator<Item = &Directory> + '_ {
        [&self.exif, &self.gps, &self.interop]
            .into_iter()
            .filter_map(|dir| dir.as_deref())
    }

    pub fn exif(&self) -> Option<&Directory> {
        self.exif.as_deref()
    }

    pub fn gps(&self) -> Option<&Directory> {
        self.gps.as_deref()
    }

    pub fn interop(&self) -> Option<&Directory> {
        self.interop.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&Directory> {
        self.thumbnail.as_deref()
    }

    pub fn thumbnail_mut(&mut self) -> Option<&mut Directory> {
        self.thumbnail.as_deref_mut()
    }

    /// Attach a thumbnail, it is written as the next IFD of this directory.
    pub fn set_thumbnail(&mut self, thumbnail: Option<Directory>) {
        self.thumbnail = thumbnail.map(Box::new);
    }

    pub fn take_thumbnail(&mut self) -> Option<Directory> {
        self.thumbnail.take().map(|dir| *dir)
    }

    /// How the raster of this directory is referenced, if it has one.
    pub fn raster_kind(&self) -> Option<RasterKind> {
        self.raster.kind
    }

    pub fn is_raster_loaded(&self) -> bool {
        self.raster.blocks.is_some()
    }

    /// The raster blocks (strips, tiles, ...) if they are loaded.
    pub fn raster_blocks(&self) -> Option<&[Vec<u8>]> {
        self.raster.blocks.as_deref()
    }

    /// All raster blocks concatenated, if they are loaded.
    pub fn raster_bytes(&self) -> Option<Vec<u8>> {
        self.raster.blocks.as_ref().map(|blocks| blocks.concat())
    }

    /// Replace the raster with in-memory blocks.
    ///
    /// The offsets and byte counts tags are rewritten when the directory is encoded.
    pub fn set_raster(&mut self, kind: RasterKind, blocks: Vec<Vec<u8>>) {
        for other in RasterKind::ALL {
            if other != kind {
                let (offsets, counts) = other.tags();
                self.entries.remove(&offsets.to_u16());
                self.entries.remove(&counts.to_u16());
            }
        }
        self.raster = Raster {
            kind: Some(kind),
            blocks: Some(blocks),
            source: None,
        };
    }

    /// Drop the raster and its tags.
    pub fn clear_raster(&mut self) {
        for kind in RasterKind::ALL {
            let (offsets, counts) = kind.tags();
            self.entries.remove(&offsets.to_u16());
            self.entries.remove(&counts.to_u16());
        }
        self.raster = Raster::default();
    }

    pub fn set_raster_source(&mut self, source: Option<RasterSource>) {
        self.raster.source = source;
    }

    /// Load the raster from the source the directory was read from.
    ///
    /// Does nothing if the raster is loaded already or if there is none.
    pub fn load_raster(&mut self) -> TiffResult<()> {
        if self.raster.blocks.is_some() || self.raster.kind.is_none() {
            return Ok(());
        }

        match self.raster.source.clone() {
            Some(RasterSource::File(path)) => {
                log::debug!("loading raster from {}", path.display());
                self.load_raster_from(BufReader::new(File::open(path)?))
            }
            Some(RasterSource::Memory(bytes)) => self.load_raster_from(Cursor::new(bytes)),
            None => Err(UsageError::RasterNotLoaded.into()),
        }
    }

    /// Load the raster from a stream holding the file this directory was read from.
    pub fn load_raster_from<R: Read + Seek>(&mut self, reader: R) -> TiffResult<()> {
        let Some(kind) = self.raster.kind else {
            return Ok(());
        };

        let (offsets, counts) = self.raster_layout(kind)?;
        let mut reader = SmartReader::wrap(reader, ByteOrder::native())?;
        let blocks = offsets
            .iter()
            .zip(&counts)
            .map(|(&offset, &count)| {
                let count = usize::try_from(count).map_err(|_| TiffError::LimitsExceeded)?;
                reader.read_at(offset, count)
            })
            .collect::<TiffResult<Vec<_>>>()?;

        log::debug!("loaded {} {:?} blocks", blocks.len(), kind);
        self.raster.blocks = Some(blocks);
        Ok(())
    }

    /// Offsets and byte counts of the raster blocks as stored in the entries.
    pub(crate) fn raster_layout(&self, kind: RasterKind) -> TiffResult<(Vec<u64>, Vec<u64>)> {
        let (offsets, counts) = kind.tags();
        let read = |tag: Tag| -> TiffResult<Vec<u64>> {
            match self.entries.get(&tag.to_u16()) {
                Some(entry) => entry.value().into_u64_vec(),
                None => Ok(Vec::new()),
            }
        };

        let (offsets, counts) = (read(offsets)?, read(counts)?);
        if offsets.len() != counts.len() {
            return Err(TiffFormatError::InconsistentSizesEncountered.into());
        }
        Ok((offsets, counts))
    }

    /// Find the raster tags after reading the entries.
    pub(crate) fn detect_raster(&mut self, source: Option<RasterSource>) {
        self.raster = Raster {
            kind: RasterKind::detect(&self.entries),
            blocks: None,
            source,
        };
    }

    /// GeoTIFF keys: the pending ones set with [`Self::set_geo_keys`] or the ones stored in the
    /// host tags.
    pub fn geo_keys(&self) -> TiffResult<Option<GeoKeyDirectory>> {
        match &self.geo {
            Some(geo) => Ok(Some(geo.clone())),
            None => GeoKeyDirectory::from_host_tags(self),
        }
    }

    /// Set GeoTIFF keys, they replace the host tags when the directory is encoded.
    pub fn set_geo_keys(&mut self, keys: GeoKeyDirectory) {
        self.geo = Some(keys);
    }

    /// Write pending GeoTIFF keys into their three host tags.
    pub(crate) fn install_geo_keys(&mut self) -> TiffResult<()> {
        let Some(geo) = self.geo.take() else {
            return Ok(());
        };

        let (shorts, doubles, ascii) = geo.compute()?;
        for tag in [
            Tag::GeoKeyDirectoryTag,
            Tag::GeoDoubleParamsTag,
            Tag::GeoAsciiParamsTag,
        ] {
            self.entries.remove(&tag.to_u16());
        }

        self.set_typed(
            Tag::GeoKeyDirectoryTag,
            Type::SHORT,
            Value::from(shorts.as_slice()),
        )?;
        if !doubles.is_empty() {
            self.set_typed(
                Tag::GeoDoubleParamsTag,
                Type::DOUBLE,
                Value::from(doubles.as_slice()),
            )?;
        }
        if !ascii.is_empty() {
            self.set_typed(Tag::GeoAsciiParamsTag, Type::ASCII, ascii)?;
        }

        self.geo = Some(geo);
        Ok(())
    }

    /// Make host tags match the sub-directories that will be written.
    ///
    /// Pointers get a placeholder value, the layout assigns the actual offsets.
    pub(crate) fn sync_host_tags(&mut self) -> TiffResult<()> {
        // Interoperability tags found next to the Exif pointer belong into the Exif directory.
        if self.family == TagFamily::Tiff {
            if let Some(interop) = self.interop.take() {
                let exif = self.directory_mut(TagFamily::Exif)?;
                exif.interop.get_or_insert(interop);
            }
            self.entries.remove(&Tag::InteropDirectory.to_u16());
        }

        for family in self.family.children() {
            let Some((_, host)) = family.host_tag() else {
                continue;
            };
            let slot = self.slot(*family);
            let present = slot.map_or(false, |dir| !dir.is_empty() || dir.has_children());

            if present {
                let entry = Entry::with_registry(
                    self.registry,
                    self.family,
                    host.to_u16(),
                    Some(Type::LONG),
                    Some(Value::Unsigned(0)),
                )?;
                self.entries.insert(host.to_u16(), entry);
            } else {
                self.entries.remove(&host.to_u16());
                *self.slot_option_mut(*family) = None;
            }
        }

        for dir in [&mut self.exif, &mut self.gps, &mut self.interop]
            .into_iter()
            .filter_map(|dir| dir.as_deref_mut())
        {
            dir.sync_host_tags()?;
        }
        Ok(())
    }

    fn has_children(&self) -> bool {
        self.sub_directories()
            .any(|dir| !dir.is_empty() || dir.has_children())
    }

    /// Resolve a key to the family and id it is stored under.
    fn resolve(&self, key: TagKey<'_>) -> TiffResult<(TagFamily, u16)> {
        match key {
            TagKey::Scoped(family, id) => Ok((family, id)),
            TagKey::Name(name) => match self.registry.by_name(name) {
                Some(info) => Ok((info.family, info.id)),
                None => Err(UsageError::UnknownTag(name.to_owned()).into()),
            },
            TagKey::Id(id) => {
                if self.registry.by_id(self.family, id).is_some() {
                    return Ok((self.family, id));
                }
                Ok(self
                    .registry
                    .resolve_id(id)
                    .map_or((self.family, id), |info| (info.family, id)))
            }
        }
    }

    /// This family followed by the families of all nested sub-directories.
    fn search_order(&self) -> Vec<TagFamily> {
        let mut order = vec![self.family];
        let mut index = 0;
        while let Some(family) = order.get(index).copied() {
            order.extend(family.children());
            index += 1;
        }
        order
    }

    /// The directory holding tags of `family`, if present.
    fn directory(&self, family: TagFamily) -> Option<&Directory> {
        if family == self.family {
            return Some(self);
        }
        match (self.family, family) {
            (TagFamily::Tiff, TagFamily::Interop) => self.exif()?.directory(family),
            _ if self.family.children().contains(&family) => self.slot(family),
            _ => None,
        }
    }

    fn slot(&self, family: TagFamily) -> Option<&Directory> {
        match family {
            TagFamily::Exif => self.exif(),
            TagFamily::Gps => self.gps(),
            TagFamily::Interop => self.interop(),
            TagFamily::Tiff => None,
        }
    }

    fn slot_mut(&mut self, family: TagFamily) -> Option<&mut Directory> {
        if family == self.family {
            return Some(self);
        }
        match (self.family, family) {
            (TagFamily::Tiff, TagFamily::Interop) => self.exif.as_deref_mut()?.slot_mut(family),
            _ if self.family.children().contains(&family) => {
                self.slot_option_mut(family).as_deref_mut()
            }
            _ => None,
        }
    }

    pub(crate) fn slot_option_mut(&mut self, family: TagFamily) -> &mut Option<Box<Directory>> {
        match family {
            TagFamily::Exif => &mut self.exif,
            TagFamily::Gps => &mut self.gps,
            // Tiff directories never nest another Tiff directory, the interop slot is unused.
            TagFamily::Interop | TagFamily::Tiff => &mut self.interop,
        }
    }

    /// The directory holding tags of `family`, created on demand.
    pub(crate) fn directory_mut(&mut self, family: TagFamily) -> TiffResult<&mut Directory> {
        if family == self.family {
            return Ok(self);
        }

        match (self.family, family) {
            (TagFamily::Tiff, TagFamily::Interop) => {
                self.directory_mut(TagFamily::Exif)?.directory_mut(family)
            }
            (parent, child) if parent.children().contains(&child) => {
                let registry = self.registry;
                let slot = self.slot_option_mut(family);
                let dir = slot.get_or_insert_with(|| {
                    log::debug!("creating {} directory", family);
                    Box::new(Directory::with_registry(family, registry))
                });
                Ok(dir)
            }
            _ => Err(UsageError::FamilyMismatch(family, self.family).into()),
        }
    }

    /// Attach a sub-directory read from a file.
    ///
    /// Entries routed into the slot while the parent was read are kept, unless the sub-directory
    /// has an entry with the same tag.
    pub(crate) fn attach(&mut self, mut dir: Directory) -> TiffResult<()> {
        let family = dir.family;
        let target = match (self.family, family) {
            (TagFamily::Tiff, TagFamily::Interop) => self.directory_mut(TagFamily::Exif)?,
            (parent, child) if parent.children().contains(&child) => self,
            _ => return Err(UsageError::FamilyMismatch(family, self.family).into()),
        };
        let slot = target.slot_option_mut(family);
        if let Some(routed) = slot.take() {
            dir.merge(*routed);
        }
        *slot = Some(Box::new(dir));
        Ok(())
    }

    fn merge(&mut self, other: Directory) {
        let Directory {
            entries,
            exif,
            gps,
            interop,
            ..
        } = other;

        for (id, entry) in entries {
            self.entries.entry(id).or_insert(entry);
        }
        for (slot, routed) in [
            (&mut self.exif, exif),
            (&mut self.gps, gps),
            (&mut self.interop, interop),
        ] {
            let Some(routed) = routed else {
                continue;
            };
            if let Some(dir) = slot.as_deref_mut() {
                dir.merge(*routed);
            } else {
                *slot = Some(routed);
            }
        }
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("family", &self.family)
            .field("entries", &self.entries.values().collect::<Vec<_>>())
            .field("exif", &self.exif)
            .field("gps", &self.gps)
            .field("interop", &self.interop)
            .field("raster", &self.raster.kind)
            .field("thumbnail", &self.thumbnail)
            .finish()
    }
}
