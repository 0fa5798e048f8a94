use std::io;

use quick_error::quick_error;

use crate::tags::{TagFamily, Type};

quick_error! {
    /// Tiff error kinds.
    #[derive(Debug)]
    pub enum TiffError {
        /// The byte stream is not a well formed TIFF or JPEG container.
        FormatError(err: TiffFormatError) {
            from()
            display("Format error: {}", err)
        }

        /// The container is recognized but uses a variant this crate does not handle.
        UnsupportedError(err: TiffUnsupportedError) {
            from()
            display("The container format `{}` is not supported", err)
        }

        /// A logical value can not be represented in the target type of an entry.
        EncodingError(err: EncodingError) {
            from()
            display("Encoding error: {}", err)
        }

        /// A tag or key is absent from a directory and all of its sub-directories.
        NotFound(name: String) {
            display("Tag `{}` not found", name)
        }

        /// An I/O Error occurred while reading or writing the container.
        IoError(err: io::Error) {
            from()
            display("{}", err)
            source(err)
        }

        /// A configured limit was exceeded while reading.
        LimitsExceeded {
            display("The container exceeds the configured limits")
        }

        /// The API was used in an inconsistent way.
        UsageError(err: UsageError) {
            from()
            display("Usage error: {}", err)
        }
    }
}

quick_error! {
    /// The container is not formatted properly.
    ///
    /// This indicates that the byte stream does not follow the TIFF (or JPEG) layout at a point
    /// where that layout is assumed. Offsets tables can not be trusted after such an error, the
    /// whole read is aborted.
    #[derive(Debug, Clone, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum TiffFormatError {
        TiffSignatureNotFound {
            display("TIFF signature not found.")
        }
        TiffSignatureInvalid(magic: u16) {
            display("TIFF signature invalid, found magic number {:#06x}.", magic)
        }
        ImageFileDirectoryNotFound {
            display("Image file directory not found.")
        }
        InvalidOffset(offset: u64) {
            display("Offset {} points outside of the container.", offset)
        }
        InconsistentSizesEncountered {
            display("Inconsistent sizes encountered.")
        }
        CycleInOffsets {
            display("File contained a cycle in the list of IFDs")
        }
        JpegSignatureNotFound {
            display("JPEG start of image marker not found.")
        }
        InvalidJpegSegment(marker: u16) {
            display("JPEG segment {:#06x} has an invalid length.", marker)
        }
        UnexpectedValue(expected: &'static str, found: String) {
            display("Expected {} value, found {}.", expected, found)
        }
    }
}

quick_error! {
    /// The container uses a variant this crate recognizes but does not handle.
    #[derive(Debug, Clone, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum TiffUnsupportedError {
        BigTiff {
            display("BigTIFF")
        }
        FileTooLarge(size: u64) {
            display("TIFF with {} bytes, larger than 32-bit offsets can address", size)
        }
    }
}

quick_error! {
    /// A logical value that can not be encoded.
    #[derive(Debug, Clone, PartialEq)]
    #[non_exhaustive]
    pub enum EncodingError {
        InvalidDateTime(text: String) {
            display("`{}` does not match the date/time pattern", text)
        }
        InvalidNumber(text: String) {
            display("`{}` is not a number", text)
        }
        IncompatibleValue(ty: Type, value: String) {
            display("value {} can not be stored as {:?}", value, ty)
        }
        NotEnumerated(key: String, value: String) {
            display("`{}` value must be one of its enumerated codes, got {}", key, value)
        }
        TooManyElements(count: usize) {
            display("{} elements do not fit into a single entry", count)
        }
    }
}

quick_error! {
    /// The API was used in a way the codec can not satisfy.
    #[derive(Debug, Clone, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum UsageError {
        RasterNotLoaded {
            display("raster payload is not loaded and no source is available")
        }
        EmptyDirectory {
            display("a directory without entries can not be encoded")
        }
        LayoutUnstable {
            display("directory layout did not stabilize after two passes")
        }
        UnknownTag(name: String) {
            display("no tag named `{}` is known", name)
        }
        NoDefault(tag: u16) {
            display("tag {} has no default value, a value is required", tag)
        }
        SegmentTooLarge(len: usize) {
            display("a JPEG segment of {} bytes exceeds the 65533 byte limit", len)
        }
        FamilyMismatch(family: TagFamily, directory: TagFamily) {
            display("a {} can not be stored below a directory of {}s", family, directory)
        }
    }
}

/// Result of a TIFF/Exif read or write.
pub type TiffResult<T> = Result<T, TiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: TiffError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, TiffError::IoError(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn nested_kinds_display() {
        let err = TiffError::from(TiffFormatError::TiffSignatureInvalid(0x1234));
        assert_eq!(
            err.to_string(),
            "Format error: TIFF signature invalid, found magic number 0x1234."
        );

        let err = TiffError::from(TiffUnsupportedError::BigTiff);
        assert!(err.to_string().contains("BigTIFF"));
    }
}
