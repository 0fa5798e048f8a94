//! Reading of TIFF headers and image file directories.

use std::io::{Read, Seek};

use crate::directory::{Directory, RasterSource};
use crate::error::{TiffError, TiffFormatError, TiffResult, TiffUnsupportedError};
use crate::ifd::Entry;
use crate::registry::{self, TagRegistry};
use crate::tags::{ByteOrder, IfdPointer, TagFamily, Type};

use self::cycles::IfdCycles;
use self::stream::{EndianReader, SmartReader};

mod cycles;
pub(crate) mod stream;

/// Decoding limits
#[derive(Clone, Debug)]
pub struct Limits {
    /// The maximum size of any ifd value in bytes, the default is
    /// 1MiB.
    pub ifd_value_size: usize,
    /// The maximum size of the raster referenced by a single directory,
    /// the default is 256MiB.
    pub raster_size: u64,
    /// The maximum number of directories read from one file, counting
    /// sub-directories. The default is 1024.
    pub max_directories: usize,
    /// The purpose of this is to prevent all the fields of the struct from
    /// being public, as this would make adding new fields a major version
    /// bump.
    _non_exhaustive: (),
}

impl Limits {
    /// A configuration that does not impose any limits.
    ///
    /// This is a good start if the caller only wants to impose selective limits, contrary to the
    /// default limits which allows selectively disabling limits.
    pub fn unlimited() -> Limits {
        Limits {
            ifd_value_size: usize::MAX,
            raster_size: u64::MAX,
            max_directories: usize::MAX,
            _non_exhaustive: (),
        }
    }
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            ifd_value_size: 1024 * 1024,
            raster_size: 256 * 1024 * 1024,
            max_directories: 1024,
            _non_exhaustive: (),
        }
    }
}

/// Reads the directories of a classic TIFF stream.
///
/// The header is checked on construction. Directories of the main chain are read with
/// [`Decoder::next_directory`], their Exif, GPS and Interoperability sub-directories are followed
/// through the host tags. Raster data is only located, see [`Directory::load_raster`].
pub struct Decoder<R>
where
    R: Read + Seek,
{
    reader: SmartReader<R>,
    byte_order: ByteOrder,
    limits: Limits,
    registry: &'static (dyn TagRegistry + Sync),
    source: Option<RasterSource>,
    next_ifd: Option<IfdPointer>,
    cycles: IfdCycles,
    directories: usize,
}

impl<R: Read + Seek> Decoder<R> {
    /// Create a new decoder that reads from a stream holding a TIFF header at offset zero.
    pub fn new(reader: R) -> TiffResult<Decoder<R>> {
        let reader = SmartReader::wrap(reader, ByteOrder::LittleEndian)?;
        let mut decoder = Decoder {
            reader,
            byte_order: ByteOrder::LittleEndian,
            limits: Limits::default(),
            registry: registry::standard(),
            source: None,
            next_ifd: None,
            cycles: IfdCycles::new(),
            directories: 0,
        };
        decoder.read_header()?;
        Ok(decoder)
    }

    pub fn with_limits(mut self, limits: Limits) -> Decoder<R> {
        self.limits = limits;
        self
    }

    /// Use another tag registry for the directories read.
    pub fn with_registry(mut self, registry: &'static (dyn TagRegistry + Sync)) -> Decoder<R> {
        self.registry = registry;
        self
    }

    /// Where directories read by this decoder load their raster from.
    pub fn with_raster_source(mut self, source: RasterSource) -> Decoder<R> {
        self.source = Some(source);
        self
    }

    /// Returns the byte_order
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns `true` if there is at least one more directory in the main chain.
    pub fn more_directories(&self) -> bool {
        self.next_ifd.is_some()
    }

    /// The offset of the next directory of the main chain.
    pub fn next_ifd(&self) -> Option<IfdPointer> {
        self.next_ifd
    }

    fn read_header(&mut self) -> TiffResult<()> {
        if self.reader.len() < 8 {
            return Err(TiffError::FormatError(
                TiffFormatError::TiffSignatureNotFound,
            ));
        }

        let header = self.reader.read_at(0, 2)?;
        self.byte_order = match &*header {
            b"II" => ByteOrder::LittleEndian,
            b"MM" => ByteOrder::BigEndian,
            _ => {
                return Err(TiffError::FormatError(
                    TiffFormatError::TiffSignatureNotFound,
                ))
            }
        };
        self.reader.set_byte_order(self.byte_order);

        match self.reader.read_u16()? {
            42 => {}
            43 => {
                return Err(TiffError::UnsupportedError(
                    TiffUnsupportedError::BigTiff,
                ))
            }
            magic => {
                return Err(TiffError::FormatError(
                    TiffFormatError::TiffSignatureInvalid(magic),
                ))
            }
        }

        self.next_ifd = match self.reader.read_u32()? {
            0 => None,
            n => Some(IfdPointer(n)),
        };
        log::debug!(
            "{:?} TIFF, first directory at {:?}",
            self.byte_order,
            self.next_ifd
        );
        Ok(())
    }

    /// Reads the next directory of the main chain with its sub-directories.
    pub fn next_directory(&mut self) -> TiffResult<Directory> {
        let pointer = self.next_ifd.ok_or(TiffError::FormatError(
            TiffFormatError::ImageFileDirectoryNotFound,
        ))?;

        let (mut dir, next) = self.read_tree(pointer, TagFamily::Tiff)?;
        self.cycles.insert_next(pointer, next)?;
        self.next_ifd = next;

        dir.detect_raster(self.source.clone());
        if let Some(kind) = dir.raster_kind() {
            let (_, counts) = dir.raster_layout(kind)?;
            let total = counts
                .iter()
                .try_fold(0u64, |total, &count| total.checked_add(count))
                .ok_or(TiffError::LimitsExceeded)?;
            if total > self.limits.raster_size {
                return Err(TiffError::LimitsExceeded);
            }
        }

        Ok(dir)
    }

    /// Reads all remaining directories of the main chain.
    pub fn read_all(&mut self) -> TiffResult<Vec<Directory>> {
        let mut pages = Vec::new();
        while self.more_directories() {
            pages.push(self.next_directory()?);
        }
        Ok(pages)
    }

    /// Reads a directory of `family` and, recursively, the sub-directories it points to.
    fn read_tree(
        &mut self,
        pointer: IfdPointer,
        family: TagFamily,
    ) -> TiffResult<(Directory, Option<IfdPointer>)> {
        let (mut dir, next) = self.read_ifd(pointer, family)?;

        let hosts: Vec<(TagFamily, u32)> = dir
            .entries()
            .filter_map(|entry| {
                let child = family.child_for_host(entry.tag())?;
                Some((child, entry.value().into_u32().ok()?))
            })
            .collect();

        for (child, offset) in hosts {
            if offset == 0 || u64::from(offset) >= self.reader.len() {
                log::warn!("{child} directory pointer {offset} is out of range, skipped");
                continue;
            }
            log::debug!("reading {child} directory at {offset}");
            let (sub, _) = self.read_tree(IfdPointer(offset), child)?;
            dir.attach(sub)?;
        }

        Ok((dir, next))
    }

    /// Reads the entries of a single directory.
    fn read_ifd(
        &mut self,
        pointer: IfdPointer,
        family: TagFamily,
    ) -> TiffResult<(Directory, Option<IfdPointer>)> {
        self.directories += 1;
        if self.directories > self.limits.max_directories {
            return Err(TiffError::LimitsExceeded);
        }

        let offset = u64::from(pointer.0);
        self.reader.goto_offset(offset, 2)?;
        let num_tags = self.reader.read_u16()?;
        let mut dir = Directory::with_registry(family, self.registry);

        for i in 0..u64::from(num_tags) {
            if let Some(entry) = self.read_entry(offset + 2 + 12 * i, family)? {
                dir.insert_entry(self.route(entry))?;
            }
        }

        self.reader
            .goto_offset(offset + 2 + 12 * u64::from(num_tags), 4)?;
        let next = match self.reader.read_u32()? {
            0 => None,
            n => Some(IfdPointer(n)),
        };

        log::debug!(
            "{} directory at {} with {} entries",
            family,
            offset,
            dir.len()
        );
        Ok((dir, next))
    }

    /// Moves an entry that belongs to a nested family, like an Exif tag stored in IFD0, into that
    /// family. Entries known to their own family or unknown everywhere stay put.
    fn route(&self, entry: Entry) -> Entry {
        let family = entry.family();
        if self.registry.by_id(family, entry.tag()).is_some() {
            return entry;
        }
        let Some(info) = self.registry.resolve_id(entry.tag()) else {
            return entry;
        };
        let nested = family
            .children()
            .iter()
            .any(|child| *child == info.family || child.children().contains(&info.family));
        if !nested {
            return entry;
        }

        log::debug!("{} {} found in a {} directory", info.family, info.name, family);
        Entry::from_raw(
            info.family,
            entry.tag(),
            entry.field_type(),
            entry.count(),
            entry.bytes().to_vec(),
            entry.byte_order(),
        )
    }

    /// Reads an IFD entry.
    // An IFD entry has four fields:
    //
    // Tag   2 bytes
    // Type  2 bytes
    // Count 4 bytes
    // Value 4 bytes either a pointer the value itself
    fn read_entry(&mut self, position: u64, family: TagFamily) -> TiffResult<Option<Entry>> {
        self.reader.goto_offset(position, 12)?;
        let tag = self.reader.read_u16()?;
        let code = self.reader.read_u16()?;
        let count = self.reader.read_u32()?;

        let Some(type_) = Type::from_u16(code) else {
            // Unknown type, the entry cannot be sized and is skipped.
            log::warn!("{family} {tag} has unknown type {code}, skipped");
            return Ok(None);
        };

        let len = type_.value_bytes(count)?;
        if len > self.limits.ifd_value_size as u64 {
            return Err(TiffError::LimitsExceeded);
        }
        // Bounded by the limit and the stream length checked in `read_at`.
        let len = len as usize;

        let bytes = if len <= 4 {
            let mut field = [0; 4];
            self.reader.read_exact(&mut field)?;
            field[..len].to_vec()
        } else {
            let value_offset = self.reader.read_u32()?;
            self.reader.read_at(u64::from(value_offset), len)?
        };

        log::trace!("{family} {tag}: {count} x {type_:?}");
        Ok(Some(Entry::from_raw(
            family,
            tag,
            type_,
            count,
            bytes,
            self.byte_order,
        )))
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}
