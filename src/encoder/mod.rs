//! Serialization of directories into TIFF streams.
//!
//! The layout of a directory is computed completely before the first byte is emitted:
//!
//! ```text
//! table | overflow values | Exif | GPS | Interop | thumbnail | raster blocks
//! ```
//!
//! Every directory table and overflow value starts on a four byte boundary. Raster blocks are
//! packed without padding, each offset is the previous offset plus the previous byte count.

use std::io::{Seek, Write};

use crate::directory::Directory;
use crate::error::{EncodingError, TiffResult, TiffUnsupportedError, UsageError};
use crate::ifd::Value;
use crate::tags::{ByteOrder, Type};

mod writer;

use self::writer::align;
pub use self::writer::TiffWriter;

/// Configuration of a [`TiffEncoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Byte order of the written stream, every entry is converted to it.
    pub byte_order: ByteOrder,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            byte_order: ByteOrder::native(),
        }
    }
}

/// Encoder for TIFF streams.
///
/// Each call to [`TiffEncoder::write_directory`] appends a directory to the IFD chain.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use tiff_ifd::encoder::{EncoderOptions, TiffEncoder};
/// use tiff_ifd::{ByteOrder, Directory, TagFamily};
///
/// let mut dir = Directory::new(TagFamily::Tiff);
/// dir.set("Make", "Nikon").unwrap();
///
/// let options = EncoderOptions { byte_order: ByteOrder::LittleEndian };
/// let mut tiff = TiffEncoder::with_options(Cursor::new(Vec::new()), options).unwrap();
/// tiff.write_directory(&dir).unwrap();
/// let bytes = tiff.finish().unwrap().into_inner();
/// assert_eq!(&bytes[..4], b"II*\0");
/// assert_eq!(&bytes[8..10], &[1, 0]);
/// ```
pub struct TiffEncoder<W: Write + Seek> {
    writer: TiffWriter<W>,
    /// Where the offset of the next directory is written.
    next_slot: u64,
}

impl<W: Write + Seek> TiffEncoder<W> {
    pub fn new(writer: W) -> TiffResult<TiffEncoder<W>> {
        Self::with_options(writer, EncoderOptions::default())
    }

    pub fn with_options(writer: W, options: EncoderOptions) -> TiffResult<TiffEncoder<W>> {
        let mut writer = TiffWriter::new(writer, options.byte_order)?;
        writer.write_header()?;
        let next_slot = writer.offset();
        writer.write_u32(0)?;

        Ok(TiffEncoder { writer, next_slot })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.writer.byte_order()
    }

    /// Writes a directory with its sub-directories, thumbnail and raster.
    ///
    /// The directory itself is left untouched. Returns the offset of its table.
    pub fn write_directory(&mut self, dir: &Directory) -> TiffResult<u64> {
        let mut dir = dir.clone();
        prepare(&mut dir, self.writer.byte_order())?;

        let offset = align(self.writer.offset());
        let layout = layout(&mut dir, offset)?;
        if layout.end > u64::from(u32::MAX) {
            return Err(TiffUnsupportedError::FileTooLarge(layout.end).into());
        }
        log::debug!(
            "directory at {}, {} bytes with raster",
            offset,
            layout.end - offset
        );

        let position = self.writer.offset();
        self.writer.goto_offset(self.next_slot)?;
        self.writer.write_u32(offset32(offset)?)?;
        self.writer.goto_offset(position)?;

        self.next_slot = emit(&mut self.writer, &dir, &layout, 0)?;
        Ok(offset)
    }

    /// Flushes the stream and returns it.
    pub fn finish(mut self) -> TiffResult<W> {
        self.writer.flush()?;
        Ok(self.writer.into_inner())
    }
}

/// Serializes a single directory into a complete TIFF stream.
pub fn encode(dir: &Directory, options: EncoderOptions) -> TiffResult<Vec<u8>> {
    let mut encoder = TiffEncoder::with_options(std::io::Cursor::new(Vec::new()), options)?;
    encoder.write_directory(dir)?;
    Ok(encoder.finish()?.into_inner())
}

/// Offsets assigned to a directory tree.
#[derive(Debug)]
struct Layout {
    offset: u64,
    children: Vec<Layout>,
    thumbnail: Option<Box<Layout>>,
    raster: u64,
    end: u64,
}

fn offset32(offset: u64) -> TiffResult<u32> {
    u32::try_from(offset).map_err(|_| TiffUnsupportedError::FileTooLarge(offset).into())
}

/// Pass 0: bring every directory of the tree into the shape that is written.
fn prepare(dir: &mut Directory, byte_order: ByteOrder) -> TiffResult<()> {
    prepare_contents(dir)?;

    for_each_directory(dir, &mut |dir: &mut Directory| -> TiffResult<()> {
        if dir.is_empty() {
            return Err(UsageError::EmptyDirectory.into());
        }
        if dir.len() > usize::from(u16::MAX) {
            return Err(EncodingError::TooManyElements(dir.len()).into());
        }
        for entry in dir.entries.values_mut() {
            entry.set_byte_order(byte_order);
        }
        Ok(())
    })
}

fn prepare_contents(dir: &mut Directory) -> TiffResult<()> {
    dir.install_geo_keys()?;
    dir.sync_host_tags()?;
    prepare_raster(dir)?;

    match dir.thumbnail.as_deref_mut() {
        Some(thumbnail) => prepare_contents(thumbnail),
        None => Ok(()),
    }
}

/// Byte counts follow the raster blocks, offsets get placeholders of the final width.
fn prepare_raster(dir: &mut Directory) -> TiffResult<()> {
    let Some(kind) = dir.raster_kind() else {
        return Ok(());
    };
    dir.load_raster()?;

    let blocks = dir.raster_blocks().ok_or(UsageError::RasterNotLoaded)?;
    let counts = blocks
        .iter()
        .map(|block| offset32(block.len() as u64))
        .collect::<TiffResult<Vec<u32>>>()?;
    let placeholders = vec![0u32; counts.len()];

    let (offsets, byte_counts) = kind.tags();
    dir.set_typed(byte_counts, Type::LONG, Value::from(counts.as_slice()))?;
    dir.set_typed(offsets, Type::LONG, Value::from(placeholders.as_slice()))?;
    Ok(())
}

/// Applies `f` to a directory, its sub-directories and its thumbnail chain.
fn for_each_directory(
    dir: &mut Directory,
    f: &mut dyn FnMut(&mut Directory) -> TiffResult<()>,
) -> TiffResult<()> {
    f(dir)?;
    for sub in [&mut dir.exif, &mut dir.gps, &mut dir.interop] {
        if let Some(sub) = sub.as_deref_mut() {
            for_each_directory(sub, f)?;
        }
    }
    if let Some(thumbnail) = dir.thumbnail.as_deref_mut() {
        for_each_directory(thumbnail, f)?;
    }
    Ok(())
}

/// Size of the table and overflow values of a single directory.
fn block_size(dir: &Directory) -> u64 {
    let table = align(2 + 12 * dir.len() as u64 + 4);
    table
        + dir
            .entries()
            .map(|entry| align(entry.byte_length() as u64))
            .sum::<u64>()
}

/// Block sizes of all directories in layout order.
fn measure(dir: &Directory, sizes: &mut Vec<u64>) {
    sizes.push(block_size(dir));
    for sub in dir.sub_directories() {
        measure(sub, sizes);
    }
    if let Some(thumbnail) = dir.thumbnail() {
        measure(thumbnail, sizes);
    }
}

/// Passes 1 and 2: place the tree, re-measure and place again if any block changed its size.
///
/// An offsets tag holding fewer elements than its raster has blocks grows during the first pass.
/// Placement keeps every count after that, so the second pass settles.
fn layout(dir: &mut Directory, offset: u64) -> TiffResult<Layout> {
    let mut sizes = Vec::new();
    measure(dir, &mut sizes);

    for pass in 1..=2 {
        let layout = place(dir, offset)?;

        let mut measured = Vec::new();
        measure(dir, &mut measured);
        if measured == sizes {
            return Ok(layout);
        }

        let before: u64 = sizes.iter().sum();
        let after: u64 = measured.iter().sum();
        log::debug!(
            "layout pass {} moved directory data from {} to {} bytes",
            pass,
            before,
            after
        );
        sizes = measured;
    }

    Err(UsageError::LayoutUnstable.into())
}

/// Assigns offsets to a directory placed at `offset` and writes them into host and raster tags.
fn place(dir: &mut Directory, offset: u64) -> TiffResult<Layout> {
    let offset = align(offset);
    let mut pos = offset + block_size(dir);

    let mut children = Vec::new();
    let mut hosts = Vec::new();
    for &family in dir.family().children() {
        let Some(sub) = dir.slot_option_mut(family).as_deref_mut() else {
            continue;
        };
        let layout = place(sub, pos)?;
        pos = layout.end;
        if let Some((_, host)) = family.host_tag() {
            hosts.push((host.to_u16(), layout.offset));
        }
        children.push(layout);
    }

    for (host, sub_offset) in hosts {
        if let Some(entry) = dir.entries.get_mut(&host) {
            entry.set_value(&Value::Unsigned(offset32(sub_offset)?))?;
        }
    }

    let thumbnail = match dir.thumbnail.as_deref_mut() {
        Some(thumbnail) => {
            let layout = place(thumbnail, pos)?;
            pos = layout.end;
            Some(Box::new(layout))
        }
        None => None,
    };

    let raster = pos;
    if let (Some(kind), Some(blocks)) = (dir.raster.kind, &dir.raster.blocks) {
        let mut offsets = Vec::with_capacity(blocks.len());
        for block in blocks {
            offsets.push(offset32(pos)?);
            pos += block.len() as u64;
        }

        let (tag, _) = kind.tags();
        if let Some(entry) = dir.entries.get_mut(&tag.to_u16()) {
            entry.set_value(&Value::from(offsets.as_slice()))?;
        }
    }

    Ok(Layout {
        offset,
        children,
        thumbnail,
        raster,
        end: pos,
    })
}

/// Writes a placed directory tree. Returns the position of the last next-IFD slot written,
/// the one of the thumbnail if there is one.
fn emit<W: Write>(
    writer: &mut TiffWriter<W>,
    dir: &Directory,
    layout: &Layout,
    next: u32,
) -> TiffResult<u64> {
    writer.pad_to(layout.offset)?;

    let table_end = layout.offset + 2 + 12 * dir.len() as u64 + 4;
    let mut value_offset = align(table_end);

    writer.write_u16(dir.len() as u16)?;
    for entry in dir.entries() {
        writer.write_u16(entry.tag())?;
        writer.write_u16(entry.field_type().to_u16())?;
        writer.write_u32(entry.count())?;
        if entry.is_inline() {
            writer.write_bytes(&entry.inline_field())?;
        } else {
            writer.write_u32(offset32(value_offset)?)?;
            value_offset += align(entry.bytes().len() as u64);
        }
        log::trace!(
            "{} {}: {} x {:?}",
            entry.family(),
            entry.tag(),
            entry.count(),
            entry.field_type()
        );
    }

    let next_slot = writer.offset();
    match &layout.thumbnail {
        // A thumbnail is the next directory of its parent.
        Some(thumbnail) => writer.write_u32(offset32(thumbnail.offset)?)?,
        None => writer.write_u32(next)?,
    }

    for entry in dir.entries().filter(|entry| !entry.is_inline()) {
        writer.pad_word_boundary()?;
        writer.write_bytes(entry.bytes())?;
    }

    for (sub, sub_layout) in dir.sub_directories().zip(&layout.children) {
        emit(writer, sub, sub_layout, 0)?;
    }

    let mut last_slot = next_slot;
    if let (Some(thumbnail), Some(thumbnail_layout)) = (dir.thumbnail(), &layout.thumbnail) {
        last_slot = emit(writer, thumbnail, thumbnail_layout, next)?;
    }

    if let Some(blocks) = dir.raster_blocks() {
        writer.pad_to(layout.raster)?;
        for block in blocks {
            writer.write_bytes(block)?;
        }
    }

    Ok(last_slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::RasterKind;
    use crate::tags::{Tag, TagFamily};

    fn le() -> EncoderOptions {
        EncoderOptions {
            byte_order: ByteOrder::LittleEndian,
        }
    }

    #[test]
    fn layout_corrects_grown_blocks() {
        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set(Tag::ImageWidth, 4u16).unwrap();
        dir.set_raster(RasterKind::Strip, vec![vec![1, 2, 3], vec![4]]);
        // One inline placeholder for two strips, the first pass grows it into overflow.
        dir.set_typed(Tag::StripOffsets, Type::LONG, 0u32).unwrap();
        assert_eq!(block_size(&dir), 32);

        let layout = layout(&mut dir, 8).unwrap();
        assert_eq!(block_size(&dir), 40);
        assert_eq!(layout.raster, 48);
        assert_eq!(
            dir.value(Tag::StripOffsets).unwrap().into_u32_vec().unwrap(),
            vec![48, 51]
        );
        assert_eq!(layout.end, 52);
    }

    #[test]
    fn single_inline_entry() {
        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set(Tag::ImageWidth, 7u16).unwrap();
        let bytes = encode(&dir, le()).unwrap();

        assert_eq!(
            bytes,
            vec![
                b'I', b'I', 42, 0, 8, 0, 0, 0, // header
                1, 0, // entries
                0, 1, 3, 0, 1, 0, 0, 0, 7, 0, 0, 0, // ImageWidth
                0, 0, 0, 0, // next
            ]
        );
    }

    #[test]
    fn overflow_values_are_aligned() {
        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set("Make", "Canon").unwrap();
        dir.set("Model", "EOS").unwrap();
        let bytes = encode(&dir, le()).unwrap();

        // 8 + 2 + 2 * 12 + 4 = 38, the first value is aligned to 40.
        assert_eq!(&bytes[18..22], &[40, 0, 0, 0]);
        assert_eq!(&bytes[40..46], b"Canon\0");
        // "EOS\0" is inline.
        assert_eq!(&bytes[30..34], b"EOS\0");
        assert_eq!(bytes.len(), 46);
    }

    #[test]
    fn sub_directories_follow_the_parent() {
        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set("Make", "Nikon").unwrap();
        dir.set("ExposureTime", 0.004).unwrap();
        dir.set("GPSAltitude", 12.5).unwrap();
        let bytes = encode(&dir, le()).unwrap();

        // IFD0: Make, ExifIFD, GPSIFD; 8 + 6 + 36 = 50 -> 52, "Nikon\0" padded to 8.
        let exif = u32::from_le_bytes([bytes[30], bytes[31], bytes[32], bytes[33]]);
        let gps = u32::from_le_bytes([bytes[42], bytes[43], bytes[44], bytes[45]]);
        assert_eq!(exif, 60);
        // Exif: one RATIONAL overflow value, 6 + 12 = 18 -> 20, plus 8.
        assert_eq!(gps, 88);
        assert_eq!(&bytes[60..62], &[1, 0]);
        assert_eq!(&bytes[88..90], &[1, 0]);
    }

    #[test]
    fn raster_offsets_are_a_running_sum() {
        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set(Tag::ImageWidth, 4u16).unwrap();
        dir.set_raster(RasterKind::Strip, vec![vec![1; 3], vec![2; 5], vec![3; 2]]);
        let bytes = encode(&dir, le()).unwrap();

        let mut decoded = crate::decoder::Decoder::new(std::io::Cursor::new(bytes.clone()))
            .unwrap()
            .next_directory()
            .unwrap();
        let offsets = decoded.value(Tag::StripOffsets).unwrap().into_u64_vec().unwrap();
        let counts = decoded.value(Tag::StripByteCounts).unwrap().into_u64_vec().unwrap();
        assert_eq!(counts, vec![3, 5, 2]);
        assert_eq!(offsets[1], offsets[0] + 3);
        assert_eq!(offsets[2], offsets[1] + 5);
        assert_eq!(offsets[2] + 2, bytes.len() as u64);

        decoded.load_raster_from(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.raster_blocks().unwrap()[1], vec![2; 5]);
    }

    #[test]
    fn chains_and_thumbnails() {
        let mut thumbnail = Directory::new(TagFamily::Tiff);
        thumbnail.set(Tag::Compression, 6u16).unwrap();
        thumbnail.set_raster(RasterKind::JpegInterchange, vec![vec![0xff, 0xd8, 0xff, 0xd9]]);

        let mut first = Directory::new(TagFamily::Tiff);
        first.set(Tag::ImageWidth, 1u16).unwrap();
        first.set_thumbnail(Some(thumbnail));
        let mut second = Directory::new(TagFamily::Tiff);
        second.set(Tag::ImageWidth, 2u16).unwrap();

        let mut tiff = TiffEncoder::with_options(std::io::Cursor::new(Vec::new()), le()).unwrap();
        tiff.write_directory(&first).unwrap();
        tiff.write_directory(&second).unwrap();
        let bytes = tiff.finish().unwrap().into_inner();

        let mut decoder = crate::decoder::Decoder::new(std::io::Cursor::new(bytes)).unwrap();
        let pages = decoder.read_all().unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].value(Tag::ImageWidth).unwrap(), Value::Short(1));
        assert_eq!(
            pages[1].raster_kind(),
            Some(RasterKind::JpegInterchange)
        );
        assert_eq!(pages[2].value(Tag::ImageWidth).unwrap(), Value::Short(2));
        // The caller's directory keeps its thumbnail and is not modified.
        assert!(first.thumbnail().is_some());
        assert!(first.get(Tag::ExifDirectory).is_none());
    }

    #[test]
    fn empty_directories_are_rejected() {
        let dir = Directory::new(TagFamily::Tiff);
        let err = encode(&dir, le()).unwrap_err();
        assert!(matches!(
            err,
            crate::TiffError::UsageError(UsageError::EmptyDirectory)
        ));
    }
}
