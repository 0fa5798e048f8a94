//! Reading and writing of TIFF Image File Directories
//!
//! TIFF (Tagged Image File Format) stores its metadata in Image File Directories (IFDs): tables of
//! tagged, typed values. The same structure carries the Exif metadata of JPEG files and the
//! GeoTIFF keys of georeferenced rasters. This crate reads such directories into a mutable
//! [`Directory`] tree, converts entry values to and from their logical [`Value`]s and writes the
//! tree back with a fresh, consistent layout.
//!
//! ```
//! use tiff_ifd::{Directory, TagFamily, TiffFile, ByteOrder};
//!
//! let mut page = Directory::new(TagFamily::Tiff);
//! page.set("Make", "Canon")?;
//! page.set("GPSLatitude", 52.5)?;
//!
//! let mut file = TiffFile::new(ByteOrder::BigEndian);
//! file.push(page);
//! let bytes = file.write_to(std::io::Cursor::new(Vec::new()))?.into_inner();
//!
//! let file = TiffFile::from_bytes(bytes)?;
//! assert_eq!(file[0].value("Make")?.into_string()?, "Canon");
//! # Ok::<(), tiff_ifd::TiffError>(())
//! ```
//!
//! # Related Links
//! * <https://web.archive.org/web/20210108073850/https://www.adobe.io/open/standards/TIFF.html> - The TIFF specification
//! * <https://www.cipa.jp/std/documents/e/DC-008-2012_E.pdf> - Exif 2.3
//! * <http://geotiff.maptools.org/spec/geotiff2.4.html> - GeoTIFF keys

pub mod codec;
pub mod decoder;
mod directory;
pub mod encoder;
mod error;
mod file;
pub mod geo;
mod ifd;
mod jpeg;
pub mod rational;
mod registry;
pub mod tags;

pub use self::decoder::{Decoder, Limits};
pub use self::directory::{Directory, RasterKind, RasterSource, TagKey};
pub use self::encoder::{EncoderOptions, TiffEncoder};
pub use self::error::{
    EncodingError, TiffError, TiffFormatError, TiffResult, TiffUnsupportedError, UsageError,
};
pub use self::file::{open, Container, TiffFile};
pub use self::geo::{GeoKey, GeoKeyDirectory, GeoKeyValue};
pub use self::ifd::{Entry, Value};
pub use self::jpeg::{JpegFile, Segment};
pub use self::registry::{StandardTags, StaticValue, TagInfo, TagRegistry, STANDARD_TAGS};
pub use self::tags::{ByteOrder, IfdPointer, Tag, TagFamily, Type};
