extern crate tempfile;
extern crate tiff_ifd;

use std::io::Cursor;

use chrono::NaiveDate;
use tiff_ifd::{
    ByteOrder, Container, Directory, RasterKind, Tag, TagFamily, TiffFile, Type, Value,
};

fn write(file: &TiffFile) -> Vec<u8> {
    file.write_to(Cursor::new(Vec::new())).unwrap().into_inner()
}

fn single_page(page: Directory, byte_order: ByteOrder) -> TiffFile {
    let mut file = TiffFile::new(byte_order);
    file.push(page);
    file
}

#[test]
fn values_survive_both_byte_orders() {
    let taken = NaiveDate::from_ymd_opt(2019, 4, 1)
        .unwrap()
        .and_hms_opt(12, 30, 5)
        .unwrap();

    for byte_order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let mut page = Directory::new(TagFamily::Tiff);
        page.set(Tag::ImageWidth, 640u32).unwrap();
        page.set("Make", "Canon").unwrap();
        page.set("Orientation", 6u16).unwrap();
        page.set("XResolution", 72.0).unwrap();
        page.set("DateTime", taken).unwrap();
        page.set("ExposureTime", 1.0 / 250.0).unwrap();
        page.set("GPSLatitudeRef", true).unwrap();
        page.set("GPSLatitude", 48.8566).unwrap();
        page.set("InteroperabilityIndex", "R98").unwrap();

        let bytes = write(&single_page(page, byte_order));
        assert_eq!(&bytes[..2], &byte_order.marker());

        let file = TiffFile::from_bytes(bytes).unwrap();
        assert_eq!(file.byte_order(), byte_order);
        let page = &file[0];
        assert_eq!(page.value(Tag::ImageWidth).unwrap().into_u32().unwrap(), 640);
        assert_eq!(page.value("Make").unwrap(), Value::Ascii("Canon".into()));
        assert_eq!(page.meaning("Orientation"), Some("Rotate 90 CW"));
        assert_eq!(page.value("XResolution").unwrap().into_f64().unwrap(), 72.0);
        assert_eq!(page.value("DateTime").unwrap(), Value::DateTime(taken));
        assert_eq!(page.value("ExposureTime").unwrap().into_f64().unwrap(), 0.004);
        assert_eq!(page.value("GPSLatitudeRef").unwrap(), Value::Bool(true));
        assert!((page.value("GPSLatitude").unwrap().into_f64().unwrap() - 48.8566).abs() < 1e-4);
        assert_eq!(
            page.value("InteroperabilityIndex").unwrap(),
            Value::Ascii("R98".into())
        );

        assert!(page.exif().unwrap().interop().is_some());
        assert!(page.gps().is_some());
    }
}

#[test]
fn inline_boundary() {
    let mut page = Directory::new(TagFamily::Tiff);
    page.set("Make", "abc").unwrap();
    page.set("Model", "abcd").unwrap();
    page.set_typed(Tag::ImageWidth, Type::LONG, 7u32).unwrap();
    page.set((TagFamily::Tiff, 50000), &[1u32, 2][..]).unwrap();

    let file = TiffFile::from_bytes(write(&single_page(page, ByteOrder::LittleEndian))).unwrap();
    let page = &file[0];

    let make = page.get("Make").unwrap();
    assert_eq!((make.count(), make.is_inline()), (4, true));
    let model = page.get("Model").unwrap();
    assert_eq!((model.count(), model.is_inline()), (5, false));

    let width = page.get(Tag::ImageWidth).unwrap();
    assert_eq!(width.field_type(), Type::LONG);
    assert!(width.is_inline());
    let pair = page.get(50000).unwrap();
    assert_eq!((pair.field_type(), pair.count()), (Type::LONG, 2));
    assert!(!pair.is_inline());
    assert_eq!(pair.value().into_u32_vec().unwrap(), vec![1, 2]);
}

#[test]
fn rational_accuracy() {
    for x in [1.0 / 3.0, 0.0001234, 12345.678, std::f64::consts::PI, 0.5] {
        let mut page = Directory::new(TagFamily::Tiff);
        page.set("ExposureTime", x).unwrap();

        let file = TiffFile::from_bytes(write(&single_page(page, ByteOrder::BigEndian))).unwrap();
        let read = file[0].value("ExposureTime").unwrap().into_f64().unwrap();
        assert!(((read - x) / x).abs() <= 1e-7, "{x} read back as {read}");
    }
}

#[test]
fn gps_degrees() {
    for degrees in [52.999999999, 0.0, 12.5, 179.99] {
        let mut page = Directory::new(TagFamily::Tiff);
        page.set("GPSLongitude", degrees).unwrap();

        let file =
            TiffFile::from_bytes(write(&single_page(page, ByteOrder::LittleEndian))).unwrap();
        let entry = file[0].get("GPSLongitude").unwrap();
        assert_eq!((entry.field_type(), entry.count()), (Type::RATIONAL, 3));
        let read = entry.value().into_f64().unwrap();
        assert!((read - degrees).abs() < 1e-4, "{degrees} read back as {read}");
    }
}

#[test]
fn raster_offsets_are_a_running_sum() {
    let blocks = vec![vec![1; 5], vec![2; 3], vec![3; 7]];
    let mut page = Directory::new(TagFamily::Tiff);
    page.set(Tag::ImageWidth, 5u32).unwrap();
    page.set_raster(RasterKind::Strip, blocks.clone());

    let bytes = write(&single_page(page, ByteOrder::BigEndian));
    let file = TiffFile::from_reader(Cursor::new(bytes)).unwrap();
    let page = &file[0];

    let offsets = page.value(Tag::StripOffsets).unwrap().into_u32_vec().unwrap();
    let counts = page.value(Tag::StripByteCounts).unwrap().into_u32_vec().unwrap();
    assert_eq!(counts, vec![5, 3, 7]);
    assert_eq!(offsets[1], offsets[0] + 5);
    assert_eq!(offsets[2], offsets[1] + 3);
    assert_eq!(page.raster_blocks().unwrap(), blocks.as_slice());
}

#[test]
fn single_strip_sample() {
    let strip = vec![10, 20, 30, 40];
    let mut page = Directory::new(TagFamily::Tiff);
    page.set(Tag::ImageWidth, 2u32).unwrap();
    page.set(Tag::ImageLength, 2u32).unwrap();
    page.set(Tag::BitsPerSample, 8u16).unwrap();
    page.set(Tag::Compression, 1u16).unwrap();
    page.set_raster(RasterKind::Strip, vec![strip.clone()]);

    let bytes = write(&single_page(page, ByteOrder::LittleEndian));
    let file = TiffFile::from_reader(Cursor::new(bytes)).unwrap();
    let page = &file[0];

    assert!(page.is_raster_loaded());
    assert_eq!(page.raster_blocks().unwrap(), &[strip.clone()][..]);
    assert_eq!(page.raster_bytes(), Some(strip));
    assert_eq!(page.value(Tag::Compression).unwrap().into_u16().unwrap(), 1);
    assert_eq!(
        page.value(Tag::StripByteCounts).unwrap().into_u32_vec().unwrap(),
        vec![4]
    );
}

#[test]
fn two_by_two_strips_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strips.tif");

    let mut page = Directory::new(TagFamily::Tiff);
    page.set(Tag::ImageWidth, 2u32).unwrap();
    page.set(Tag::ImageLength, 2u32).unwrap();
    page.set(Tag::BitsPerSample, 8u16).unwrap();
    page.set(Tag::RowsPerStrip, 1u32).unwrap();
    page.set_raster(RasterKind::Strip, vec![vec![10, 20], vec![30, 40]]);
    single_page(page, ByteOrder::LittleEndian).save(&path).unwrap();

    let mut file = match tiff_ifd::open(&path).unwrap() {
        Container::Tiff(file) => file,
        Container::Jpeg(_) => panic!("sniffed a TIFF file as JPEG"),
    };
    assert_eq!(file.len(), 1);
    assert_eq!(file[0].raster_kind(), Some(RasterKind::Strip));
    assert!(!file[0].is_raster_loaded());

    file[0].load_raster().unwrap();
    assert!(file[0].is_raster_loaded());
    assert_eq!(file[0].raster_bytes(), Some(vec![10, 20, 30, 40]));

    // Rewriting the file in place reads the raster before the file is replaced.
    let mut lazy = TiffFile::open(&path).unwrap();
    lazy[0].set("Software", "tiff-ifd").unwrap();
    lazy.save(&path).unwrap();

    let mut reread = TiffFile::open(&path).unwrap();
    reread.load_rasters().unwrap();
    assert_eq!(reread[0].value("Software").unwrap(), Value::Ascii("tiff-ifd".into()));
    assert_eq!(reread[0].raster_bytes(), Some(vec![10, 20, 30, 40]));
}
