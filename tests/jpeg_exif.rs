extern crate tempfile;
extern crate tiff_ifd;

use std::fs;
use std::io::Cursor;

use tiff_ifd::{ByteOrder, Container, Directory, JpegFile, RasterKind, Tag, TagFamily, Value};

/// SOI, a JFIF APP0, a quantization table and a scan with EOI.
fn plain_jpeg() -> Vec<u8> {
    let mut data = vec![0xff, 0xd8];
    data.extend_from_slice(&[0xff, 0xe0, 0, 16]);
    data.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
    data.extend_from_slice(&[0xff, 0xdb, 0, 5, 0, 1, 1]);
    data.extend_from_slice(&[0xff, 0xda, 0, 4, 1, 0, 0xa5, 0x5a, 0xff, 0x00, 0x11, 0xff, 0xd9]);
    data
}

fn open_jpeg(path: &std::path::Path) -> JpegFile {
    match tiff_ifd::open(path).unwrap() {
        Container::Jpeg(jpeg) => jpeg,
        Container::Tiff(_) => panic!("sniffed a JPEG file as TIFF"),
    }
}

#[test]
fn exif_is_added_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, plain_jpeg()).unwrap();

    let mut jpeg = open_jpeg(&path);
    assert!(jpeg.exif().is_none());
    assert!(jpeg.xmp().is_none());

    jpeg.set_byte_order(ByteOrder::LittleEndian);
    let exif = jpeg.exif_or_insert();
    exif.set("Make", "FUJIFILM").unwrap();
    exif.set("ExposureTime", 1.0 / 60.0).unwrap();
    exif.set("GPSLatitude", 52.999999999).unwrap();
    exif.set("GPSLatitudeRef", true).unwrap();
    jpeg.save(&path).unwrap();

    let jpeg = open_jpeg(&path);
    assert_eq!(jpeg.byte_order(), ByteOrder::LittleEndian);
    let exif = jpeg.exif().unwrap();
    assert_eq!(exif.value("Make").unwrap(), Value::Ascii("FUJIFILM".into()));
    assert!((exif.value("ExposureTime").unwrap().into_f64().unwrap() - 1.0 / 60.0).abs() < 1e-9);
    assert!((exif.value("GPSLatitude").unwrap().into_f64().unwrap() - 52.999999999).abs() < 1e-4);
    assert_eq!(exif.value("GPSLatitudeRef").unwrap(), Value::Bool(true));

    // The scan is untouched.
    let bytes = fs::read(&path).unwrap();
    let plain = plain_jpeg();
    assert_eq!(&bytes[bytes.len() - 13..], &plain[plain.len() - 13..]);
    assert_eq!(&bytes[2..20], &plain[2..20]);
    assert_eq!(&bytes[20..22], &[0xff, 0xe1]);
}

#[test]
fn exif_is_replaced_in_place() {
    let mut jpeg = JpegFile::from_reader(Cursor::new(plain_jpeg())).unwrap();
    jpeg.exif_or_insert().set("Model", "first").unwrap();
    let mut first = Vec::new();
    jpeg.write_to(&mut first).unwrap();

    let mut jpeg = JpegFile::from_reader(Cursor::new(first)).unwrap();
    assert_eq!(jpeg.segments().len(), 4);
    jpeg.exif_mut().unwrap().set("Model", "second").unwrap();
    let mut second = Vec::new();
    jpeg.write_to(&mut second).unwrap();

    let jpeg = JpegFile::from_reader(Cursor::new(second)).unwrap();
    assert_eq!(jpeg.segments().len(), 4);
    assert_eq!(
        jpeg.exif().unwrap().value("Model").unwrap(),
        Value::Ascii("second".into())
    );

    let mut jpeg = jpeg;
    jpeg.set_exif(None);
    let mut stripped = Vec::new();
    jpeg.write_to(&mut stripped).unwrap();
    assert_eq!(stripped, plain_jpeg());
}

#[test]
fn thumbnail_and_xmp() {
    let thumb = vec![0xff, 0xd8, 0xff, 0xda, 0, 2, 7, 7, 0xff, 0xd9];
    let mut thumbnail = Directory::new(TagFamily::Tiff);
    thumbnail.set(Tag::Compression, 6u16).unwrap();
    thumbnail.set_raster(RasterKind::JpegInterchange, vec![thumb.clone()]);

    let packet = b"<?xpacket begin=\"\"?><x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/><?xpacket end=\"w\"?>";

    let mut jpeg = JpegFile::from_reader(Cursor::new(plain_jpeg())).unwrap();
    jpeg.set_byte_order(ByteOrder::BigEndian);
    jpeg.exif_or_insert().set("Orientation", 1u16).unwrap();
    jpeg.exif_or_insert().set_thumbnail(Some(thumbnail));
    jpeg.set_xmp(Some(packet.to_vec()));

    let mut written = Vec::new();
    jpeg.write_to(&mut written).unwrap();
    let mut jpeg = JpegFile::from_reader(Cursor::new(written)).unwrap();

    assert_eq!(jpeg.xmp(), Some(&packet[..]));
    let ifd1 = jpeg.thumbnail().unwrap();
    assert_eq!(ifd1.value(Tag::Compression).unwrap().into_u16().unwrap(), 6);
    assert_eq!(
        ifd1.value(Tag::JpegInterchangeFormatLength)
            .unwrap()
            .into_u32()
            .unwrap(),
        thumb.len() as u32
    );
    assert_eq!(jpeg.thumbnail_bytes().unwrap(), Some(thumb));
}
