//! Exif and XMP metadata of JPEG files.
//!
//! A JPEG stream is a sequence of big endian markers. Every marker up to the start of scan carries
//! a two byte length and a payload. Exif is stored in an APP1 segment as a complete TIFF stream:
//! IFD0 holds the image metadata and links the Exif and GPS directories, IFD1 describes the
//! thumbnail.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::decoder::Decoder;
use crate::directory::{Directory, RasterSource};
use crate::encoder::{self, EncoderOptions};
use crate::error::{TiffError, TiffFormatError, TiffResult, UsageError};
use crate::tags::{ByteOrder, TagFamily};

const SOI: u16 = 0xffd8;
const EOI: u16 = 0xffd9;
const SOS: u16 = 0xffda;
const APP0: u16 = 0xffe0;
const APP1: u16 = 0xffe1;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// A marker segment. The payload excludes marker and length, the payload of the start of scan
/// segment runs to the end of the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub marker: u16,
    pub data: Vec<u8>,
}

impl Segment {
    fn is_exif(&self) -> bool {
        self.marker == APP1 && self.data.starts_with(EXIF_HEADER)
    }

    fn is_xmp(&self) -> bool {
        self.marker == APP1 && self.data.starts_with(XMP_HEADER)
    }
}

/// A JPEG file with its Exif directory and XMP packet.
#[derive(Clone, Debug)]
pub struct JpegFile {
    segments: Vec<Segment>,
    exif: Option<Directory>,
    xmp: Option<Vec<u8>>,
    byte_order: ByteOrder,
}

impl JpegFile {
    pub fn open<P: AsRef<Path>>(path: P) -> TiffResult<JpegFile> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Walks the markers of a JPEG stream and reads its Exif segment.
    pub fn from_reader<R: Read>(mut reader: R) -> TiffResult<JpegFile> {
        match reader.read_u16::<BigEndian>() {
            Ok(SOI) => {}
            Ok(_) => return Err(TiffFormatError::JpegSignatureNotFound.into()),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(TiffFormatError::JpegSignatureNotFound.into())
            }
            Err(err) => return Err(err.into()),
        }

        let mut segments = Vec::new();
        loop {
            let marker = match reader.read_u16::<BigEndian>() {
                Ok(marker) => marker,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    log::warn!("JPEG stream ends without an end of image marker");
                    break;
                }
                Err(err) => return Err(err.into()),
            };

            match marker {
                EOI => break,
                SOS => {
                    let mut data = Vec::new();
                    reader.read_to_end(&mut data)?;
                    segments.push(Segment { marker, data });
                    break;
                }
                _ => {
                    let len = reader
                        .read_u16::<BigEndian>()
                        .map_err(|_| TiffFormatError::InvalidJpegSegment(marker))?;
                    if len < 2 {
                        return Err(TiffFormatError::InvalidJpegSegment(marker).into());
                    }
                    let mut data = vec![0; usize::from(len) - 2];
                    reader.read_exact(&mut data).map_err(|err| match err.kind() {
                        io::ErrorKind::UnexpectedEof => {
                            TiffError::from(TiffFormatError::InvalidJpegSegment(marker))
                        }
                        _ => TiffError::from(err),
                    })?;
                    log::trace!("JPEG segment {:#06x}, {} bytes", marker, data.len());
                    segments.push(Segment { marker, data });
                }
            }
        }

        let mut jpeg = JpegFile {
            segments,
            exif: None,
            xmp: None,
            byte_order: EncoderOptions::default().byte_order,
        };

        if let Some(segment) = jpeg.segments.iter().find(|s| s.is_exif()) {
            let (exif, byte_order) = read_exif(&segment.data[EXIF_HEADER.len()..])?;
            jpeg.exif = Some(exif);
            jpeg.byte_order = byte_order;
        }
        if let Some(segment) = jpeg.segments.iter().find(|s| s.is_xmp()) {
            jpeg.xmp = Some(segment.data[XMP_HEADER.len()..].to_vec());
        }

        Ok(jpeg)
    }

    /// The segments as read, the Exif and XMP segments included.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// IFD0 of the Exif segment, with the thumbnail directory attached.
    pub fn exif(&self) -> Option<&Directory> {
        self.exif.as_ref()
    }

    pub fn exif_mut(&mut self) -> Option<&mut Directory> {
        self.exif.as_mut()
    }

    /// IFD0 of the Exif segment, created if the file has none.
    pub fn exif_or_insert(&mut self) -> &mut Directory {
        self.exif
            .get_or_insert_with(|| Directory::new(TagFamily::Tiff))
    }

    /// Replace or, with `None`, remove the Exif segment.
    pub fn set_exif(&mut self, exif: Option<Directory>) {
        self.exif = exif;
    }

    pub fn thumbnail(&self) -> Option<&Directory> {
        self.exif.as_ref()?.thumbnail()
    }

    /// The JPEG stream of the thumbnail.
    pub fn thumbnail_bytes(&mut self) -> TiffResult<Option<Vec<u8>>> {
        let Some(thumbnail) = self.exif.as_mut().and_then(Directory::thumbnail_mut) else {
            return Ok(None);
        };
        thumbnail.load_raster()?;
        Ok(thumbnail.raster_bytes())
    }

    /// The raw XMP packet.
    pub fn xmp(&self) -> Option<&[u8]> {
        self.xmp.as_deref()
    }

    pub fn set_xmp(&mut self, xmp: Option<Vec<u8>>) {
        self.xmp = xmp;
    }

    /// Byte order the Exif segment is written in.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Writes the JPEG stream with freshly serialized Exif and XMP segments.
    ///
    /// Segments added to a file without them are placed after the JFIF segment.
    pub fn write_to<W: Write>(&self, mut writer: W) -> TiffResult<()> {
        let mut exif = match &self.exif {
            Some(dir) => {
                let options = EncoderOptions {
                    byte_order: self.byte_order,
                };
                let mut payload = EXIF_HEADER.to_vec();
                payload.extend(encoder::encode(dir, options)?);
                Some(payload)
            }
            None => None,
        };
        let mut xmp = self.xmp.as_ref().map(|packet| [XMP_HEADER, packet.as_slice()].concat());

        let mut segments: Vec<(u16, Cow<'_, [u8]>)> = Vec::with_capacity(self.segments.len() + 2);
        for segment in &self.segments {
            let data = if segment.is_exif() {
                exif.take().map(Cow::Owned)
            } else if segment.is_xmp() {
                xmp.take().map(Cow::Owned)
            } else {
                Some(Cow::Borrowed(segment.data.as_slice()))
            };
            if let Some(data) = data {
                segments.push((segment.marker, data));
            }
        }

        let at = segments
            .iter()
            .take_while(|(marker, _)| *marker == APP0)
            .count();
        for payload in [exif, xmp].into_iter().flatten().rev() {
            segments.insert(at, (APP1, Cow::Owned(payload)));
        }

        writer.write_u16::<BigEndian>(SOI)?;
        let mut scanned = false;
        for (marker, data) in segments {
            writer.write_u16::<BigEndian>(marker)?;
            if marker == SOS {
                writer.write_all(&data)?;
                scanned = true;
                continue;
            }
            let len = u16::try_from(data.len() + 2)
                .map_err(|_| UsageError::SegmentTooLarge(data.len()))?;
            writer.write_u16::<BigEndian>(len)?;
            writer.write_all(&data)?;
        }
        if !scanned {
            writer.write_u16::<BigEndian>(EOI)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> TiffResult<()> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        std::fs::write(path, buffer)?;
        Ok(())
    }
}

/// Reads IFD0 and, if present, the thumbnail directory IFD1 of an Exif TIFF stream.
fn read_exif(tiff: &[u8]) -> TiffResult<(Directory, ByteOrder)> {
    let bytes: Arc<[u8]> = Arc::from(tiff);
    let mut decoder = Decoder::new(Cursor::new(bytes.clone()))?
        .with_raster_source(RasterSource::Memory(bytes));

    let mut ifd0 = decoder.next_directory()?;
    if decoder.more_directories() {
        let ifd1 = decoder.next_directory()?;
        ifd0.set_thumbnail(Some(ifd1));
    }
    log::debug!(
        "Exif segment with {} tags, thumbnail: {}",
        ifd0.iter().count(),
        ifd0.thumbnail().is_some()
    );
    Ok((ifd0, decoder.byte_order()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::RasterKind;
    use crate::ifd::Value;
    use crate::tags::Tag;

    fn jfif() -> Vec<u8> {
        let mut data = vec![0xff, 0xd8];
        data.extend_from_slice(&[0xff, 0xe0, 0, 7, b'J', b'F', b'I', b'F', 0]);
        data.extend_from_slice(&[0xff, 0xdb, 0, 4, 1, 2]);
        data.extend_from_slice(&[0xff, 0xda, 0, 3, 0, 0x12, 0x34, 0xff, 0xd9]);
        data
    }

    #[test]
    fn walks_markers() {
        let jpeg = JpegFile::from_reader(Cursor::new(jfif())).unwrap();
        let markers: Vec<u16> = jpeg.segments().iter().map(|s| s.marker).collect();
        assert_eq!(markers, vec![APP0, 0xffdb, SOS]);
        assert_eq!(
            jpeg.segments()[2].data,
            vec![0, 3, 0, 0x12, 0x34, 0xff, 0xd9]
        );
        assert!(jpeg.exif().is_none());

        let mut written = Vec::new();
        jpeg.write_to(&mut written).unwrap();
        assert_eq!(written, jfif());
    }

    #[test]
    fn adds_exif_after_jfif() {
        let mut jpeg = JpegFile::from_reader(Cursor::new(jfif())).unwrap();
        jpeg.set_byte_order(ByteOrder::BigEndian);
        jpeg.exif_or_insert().set("Make", "Canon").unwrap();

        let mut written = Vec::new();
        jpeg.write_to(&mut written).unwrap();
        assert_eq!(&written[11..13], &[0xff, 0xe1]);
        assert_eq!(&written[15..23], b"Exif\0\0MM");

        let read = JpegFile::from_reader(Cursor::new(written)).unwrap();
        assert_eq!(read.byte_order(), ByteOrder::BigEndian);
        let exif = read.exif().unwrap();
        assert_eq!(exif.value("Make").unwrap(), Value::Ascii("Canon".into()));
        assert_eq!(read.segments().len(), 4);
    }

    #[test]
    fn thumbnail_is_ifd1() {
        let thumb = vec![0xff, 0xd8, 0xff, 0xd9];
        let mut thumbnail = Directory::new(TagFamily::Tiff);
        thumbnail.set(Tag::Compression, 6u16).unwrap();
        thumbnail.set_raster(RasterKind::JpegInterchange, vec![thumb.clone()]);

        let mut jpeg = JpegFile::from_reader(Cursor::new(jfif())).unwrap();
        jpeg.exif_or_insert().set("Model", "X100").unwrap();
        jpeg.exif_or_insert().set_thumbnail(Some(thumbnail));

        let mut written = Vec::new();
        jpeg.write_to(&mut written).unwrap();
        let mut read = JpegFile::from_reader(Cursor::new(written)).unwrap();

        let ifd1 = read.thumbnail().unwrap();
        assert_eq!(ifd1.raster_kind(), Some(RasterKind::JpegInterchange));
        assert!(!ifd1.is_raster_loaded());
        assert_eq!(read.thumbnail_bytes().unwrap(), Some(thumb));
    }

    #[test]
    fn xmp_is_kept_raw() {
        let packet = b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>".to_vec();
        let mut jpeg = JpegFile::from_reader(Cursor::new(jfif())).unwrap();
        jpeg.set_xmp(Some(packet.clone()));

        let mut written = Vec::new();
        jpeg.write_to(&mut written).unwrap();
        let mut read = JpegFile::from_reader(Cursor::new(written)).unwrap();
        assert_eq!(read.xmp(), Some(packet.as_slice()));

        read.set_xmp(None);
        let mut written = Vec::new();
        read.write_to(&mut written).unwrap();
        assert_eq!(written, jfif());
    }

    #[test]
    fn malformed_streams() {
        let err = JpegFile::from_reader(Cursor::new(b"II*\0".to_vec())).unwrap_err();
        assert!(matches!(
            err,
            TiffError::FormatError(TiffFormatError::JpegSignatureNotFound)
        ));

        let err = JpegFile::from_reader(Cursor::new(vec![0xff, 0xd8, 0xff, 0xe0, 0, 1])).unwrap_err();
        assert!(matches!(
            err,
            TiffError::FormatError(TiffFormatError::InvalidJpegSegment(0xffe0))
        ));

        let err =
            JpegFile::from_reader(Cursor::new(vec![0xff, 0xd8, 0xff, 0xe0, 0, 9, 1])).unwrap_err();
        assert!(matches!(
            err,
            TiffError::FormatError(TiffFormatError::InvalidJpegSegment(0xffe0))
        ));
    }
}
