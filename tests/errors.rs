extern crate tempfile;
extern crate tiff_ifd;

use std::io::Cursor;

use tiff_ifd::{
    Decoder, Directory, JpegFile, TagFamily, TiffError, TiffFile, TiffFormatError,
    TiffUnsupportedError, UsageError,
};

#[test]
fn invalid_magic_is_a_format_error() {
    let bytes = vec![b'I', b'I', 0x34, 0x12, 8, 0, 0, 0];
    let err = TiffFile::from_bytes(bytes).unwrap_err();
    assert!(matches!(
        err,
        TiffError::FormatError(TiffFormatError::TiffSignatureInvalid(0x1234))
    ));

    let err = TiffFile::from_bytes(b"PK\x03\x04\0\0\0\0".to_vec()).unwrap_err();
    assert!(matches!(
        err,
        TiffError::FormatError(TiffFormatError::TiffSignatureNotFound)
    ));
}

#[test]
fn bigtiff_is_unsupported() {
    let bytes = vec![b'M', b'M', 0, 0x2b, 0, 8, 0, 0, 0, 0, 0, 0, 0, 16];
    let err = Decoder::new(Cursor::new(bytes)).err().unwrap();
    assert!(matches!(
        err,
        TiffError::UnsupportedError(TiffUnsupportedError::BigTiff)
    ));
}

#[test]
fn missing_tags() {
    let mut dir = Directory::new(TagFamily::Tiff);
    assert!(matches!(dir.value("Make"), Err(TiffError::NotFound(_))));
    assert!(matches!(dir.value(0x9999), Err(TiffError::NotFound(_))));
    assert!(matches!(
        dir.set("NoSuchTag", 1u16),
        Err(TiffError::UsageError(UsageError::UnknownTag(_)))
    ));
}

#[test]
fn unknown_files_are_not_opened() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();
    assert!(matches!(
        tiff_ifd::open(&path),
        Err(TiffError::FormatError(TiffFormatError::TiffSignatureNotFound))
    ));

    assert!(matches!(
        tiff_ifd::open(dir.path().join("missing.tif")),
        Err(TiffError::IoError(_))
    ));
}

#[test]
fn jpeg_without_start_of_image() {
    let err = JpegFile::from_reader(Cursor::new(vec![0xff, 0xe0, 0, 2])).unwrap_err();
    assert!(matches!(
        err,
        TiffError::FormatError(TiffFormatError::JpegSignatureNotFound)
    ));
}
