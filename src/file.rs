use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::ops::{Index, IndexMut};
use std::path::Path;
use std::sync::Arc;

use crate::decoder::Decoder;
use crate::directory::{Directory, RasterSource};
use crate::encoder::{EncoderOptions, TiffEncoder};
use crate::error::{TiffFormatError, TiffResult};
use crate::jpeg::JpegFile;
use crate::tags::ByteOrder;

/// A TIFF file: the chain of IFDs, one per page.
#[derive(Clone, Debug)]
pub struct TiffFile {
    pages: Vec<Directory>,
    byte_order: ByteOrder,
}

impl TiffFile {
    pub fn new(byte_order: ByteOrder) -> TiffFile {
        TiffFile {
            pages: Vec::new(),
            byte_order,
        }
    }

    /// Reads every page of the file at `path`.
    ///
    /// Rasters are loaded from the file when they are first needed.
    pub fn open<P: AsRef<Path>>(path: P) -> TiffResult<TiffFile> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let decoder =
            Decoder::new(reader)?.with_raster_source(RasterSource::File(path.to_path_buf()));
        Self::read(decoder)
    }

    /// Reads every page of an in-memory file. Rasters are loaded lazily from the shared buffer.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> TiffResult<TiffFile> {
        let bytes: Arc<[u8]> = bytes.into();
        let decoder = Decoder::new(Cursor::new(bytes.clone()))?
            .with_raster_source(RasterSource::Memory(bytes));
        Self::read(decoder)
    }

    /// Reads every page from a stream, rasters included, since the stream is not kept.
    pub fn from_reader<R: Read + Seek>(reader: R) -> TiffResult<TiffFile> {
        let mut decoder = Decoder::new(reader)?;
        let byte_order = decoder.byte_order();
        let mut pages = decoder.read_all()?;

        let mut reader = decoder.into_inner();
        for page in &mut pages {
            page.load_raster_from(&mut reader)?;
        }
        Ok(TiffFile { pages, byte_order })
    }

    fn read<R: Read + Seek>(mut decoder: Decoder<R>) -> TiffResult<TiffFile> {
        let byte_order = decoder.byte_order();
        let pages = decoder.read_all()?;
        log::debug!("read {} pages ({:?})", pages.len(), byte_order);
        Ok(TiffFile { pages, byte_order })
    }

    pub fn pages(&self) -> &[Directory] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut Vec<Directory> {
        &mut self.pages
    }

    pub fn push(&mut self, page: Directory) {
        self.pages.push(page);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Directory> {
        self.pages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Directory> {
        self.pages.get_mut(index)
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The byte order used by [`Self::write_to`] and [`Self::save`].
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Loads the rasters of all pages into memory.
    pub fn load_rasters(&mut self) -> TiffResult<()> {
        for page in &mut self.pages {
            page.load_raster()?;
            if let Some(thumbnail) = page.thumbnail_mut() {
                thumbnail.load_raster()?;
            }
        }
        Ok(())
    }

    /// Writes all pages as one IFD chain.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> TiffResult<W> {
        let options = EncoderOptions {
            byte_order: self.byte_order,
        };
        let mut encoder = TiffEncoder::with_options(writer, options)?;
        for page in &self.pages {
            encoder.write_directory(page)?;
        }
        encoder.finish()
    }

    /// Writes the file to `path`, which may be the file it was read from.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TiffResult<()> {
        let buffer = self.write_to(Cursor::new(Vec::new()))?.into_inner();
        fs::write(path, buffer)?;
        Ok(())
    }
}

impl Index<usize> for TiffFile {
    type Output = Directory;

    fn index(&self, index: usize) -> &Directory {
        &self.pages[index]
    }
}

impl IndexMut<usize> for TiffFile {
    fn index_mut(&mut self, index: usize) -> &mut Directory {
        &mut self.pages[index]
    }
}

/// A file opened with [`open`].
#[derive(Clone, Debug)]
pub enum Container {
    Tiff(TiffFile),
    Jpeg(JpegFile),
}

impl Container {
    /// IFD0 of a TIFF file or the Exif directory of a JPEG file.
    pub fn first_directory(&self) -> Option<&Directory> {
        match self {
            Container::Tiff(tiff) => tiff.get(0),
            Container::Jpeg(jpeg) => jpeg.exif(),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> TiffResult<()> {
        match self {
            Container::Tiff(tiff) => tiff.save(path),
            Container::Jpeg(jpeg) => jpeg.save(path),
        }
    }
}

/// Opens a TIFF or JPEG file, telling them apart by their first two bytes.
pub fn open<P: AsRef<Path>>(path: P) -> TiffResult<Container> {
    let path = path.as_ref();
    let mut magic = [0; 2];
    let read = File::open(path)?.read(&mut magic)?;

    match &magic[..read] {
        [0xff, 0xd8] => Ok(Container::Jpeg(JpegFile::open(path)?)),
        b"II" | b"MM" => Ok(Container::Tiff(TiffFile::open(path)?)),
        _ => Err(TiffFormatError::TiffSignatureNotFound.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::RasterKind;
    use crate::tags::{Tag, TagFamily};

    fn page(width: u32) -> Directory {
        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set(Tag::ImageWidth, width).unwrap();
        dir.set(Tag::ImageLength, 1u32).unwrap();
        dir.set_raster(RasterKind::Strip, vec![vec![width as u8; width as usize]]);
        dir
    }

    #[test]
    fn pages_round_trip() {
        let mut file = TiffFile::new(ByteOrder::BigEndian);
        file.push(page(3));
        file.push(page(5));

        let bytes = file.write_to(Cursor::new(Vec::new())).unwrap().into_inner();
        assert_eq!(&bytes[..2], b"MM");

        let mut read = TiffFile::from_bytes(bytes.clone()).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read.byte_order(), ByteOrder::BigEndian);
        assert_eq!(read[1].value(Tag::ImageWidth).unwrap().into_u32().unwrap(), 5);
        assert!(!read[0].is_raster_loaded());
        read.load_rasters().unwrap();
        assert_eq!(read[1].raster_bytes(), Some(vec![5; 5]));

        let eager = TiffFile::from_reader(Cursor::new(bytes)).unwrap();
        assert!(eager[0].is_raster_loaded());
        assert_eq!(eager[0].raster_bytes(), Some(vec![3; 3]));
    }

    #[test]
    fn rewrites_in_other_byte_order() {
        let mut file = TiffFile::new(ByteOrder::LittleEndian);
        file.push(page(4));
        let bytes = file.write_to(Cursor::new(Vec::new())).unwrap().into_inner();

        let mut read = TiffFile::from_bytes(bytes).unwrap();
        read.set_byte_order(ByteOrder::BigEndian);
        let bytes = read.write_to(Cursor::new(Vec::new())).unwrap().into_inner();

        let read = TiffFile::from_bytes(bytes).unwrap();
        assert_eq!(read.byte_order(), ByteOrder::BigEndian);
        let mut first = read[0].clone();
        first.load_raster().unwrap();
        assert_eq!(first.raster_bytes(), Some(vec![4; 4]));
    }
}
