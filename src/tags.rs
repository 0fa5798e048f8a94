macro_rules! tags {
    {
        // Permit arbitrary meta items, which include documentation.
        $( #[$enum_attr:meta] )*
        $vis:vis enum $name:ident($ty:tt) $(unknown(#[$unknown_meta:meta] $unknown_doc:ident))* {
            // Each of the `Name = Val,` permitting documentation.
            $($(#[$ident_attr:meta])* $tag:ident = $val:expr,)*
        }
    } => {
        $( #[$enum_attr] )*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
        #[non_exhaustive]
        pub enum $name {
            $($(#[$ident_attr])* $tag,)*
            $(
                #[$unknown_meta]
                Unknown($ty),
            )*
        }

        impl $name {
            #[inline(always)]
            const fn __from_inner_type(n: $ty) -> Result<Self, $ty> {
                match n {
                    $( $val => Ok($name::$tag), )*
                    n => Err(n),
                }
            }

            #[inline(always)]
            const fn __to_inner_type(&self) -> $ty {
                match *self {
                    $( $name::$tag => $val, )*
                    $( $name::Unknown($unknown_doc) => { $unknown_doc }, )*
                }
            }
        }

        tags!($name, $ty, $($unknown_doc)*);
    };
    // For u16 tags, provide direct inherent primitive conversion methods.
    ($name:tt, u16, $($unknown_doc:ident)*) => {
        impl $name {
            #[inline(always)]
            pub const fn from_u16(val: u16) -> Option<Self> {
                match Self::__from_inner_type(val) {
                    Ok(v) => Some(v),
                    Err(_) => None,
                }
            }

            $(
            #[inline(always)]
            pub const fn from_u16_exhaustive($unknown_doc: u16) -> Self {
                match Self::__from_inner_type($unknown_doc) {
                    Ok(v) => v,
                    Err(_) => $name::Unknown($unknown_doc),
                }
            }
            )*

            #[inline(always)]
            pub const fn to_u16(&self) -> u16 {
                Self::__to_inner_type(self)
            }
        }
    };
}

pub(crate) use tags;

// Note: only the tags the reader and writer act on are named here. Every other tag is
// addressed through the registry by its id or symbolic name.
tags! {
/// Baseline and extension tags with a structural meaning for the codec.
pub enum Tag(u16) unknown(
    /// A tag without structural meaning
    unknown
) {
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInterpretation = 262,
    ImageDescription = 270,
    Make = 271,
    Model = 272,
    StripOffsets = 273,
    Orientation = 274,
    SamplesPerPixel = 277,
    RowsPerStrip = 278,
    StripByteCounts = 279,
    XResolution = 282,
    YResolution = 283,
    FreeOffsets = 288,
    FreeByteCounts = 289,
    ResolutionUnit = 296,
    Software = 305,
    DateTime = 306,
    TileWidth = 322,
    TileLength = 323,
    TileOffsets = 324,
    TileByteCounts = 325,
    JpegInterchangeFormat = 513,
    JpegInterchangeFormatLength = 514,
    Copyright = 33_432,
    ModelPixelScaleTag = 33550,
    ModelTiepointTag = 33922,
    // <https://web.archive.org/web/20131111073619/http://www.exif.org/Exif2-1.PDF>
    ExifDirectory = 0x8769,
    // <https://web.archive.org/web/20131111073619/http://www.exif.org/Exif2-1.PDF>
    GpsDirectory = 0x8825,
    GeoKeyDirectoryTag = 34735, // (SPOT)
    GeoDoubleParamsTag = 34736, // (SPOT)
    GeoAsciiParamsTag = 34737, // (SPOT)
    // Stored in the Exif directory, points to the Interoperability directory.
    InteropDirectory = 0xA005,
}
}

/// Identifies the offset of an IFD.
///
/// Only classic TIFF is supported, offsets never exceed 32 bits.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct IfdPointer(pub u32);

tags! {
/// The type of an IFD entry (a 2 byte field).
pub enum Type(u16) {
    /// 8-bit unsigned integer
    BYTE = 1,
    /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
    ASCII = 2,
    /// 16-bit unsigned integer
    SHORT = 3,
    /// 32-bit unsigned integer
    LONG = 4,
    /// Fraction stored as two 32-bit unsigned integers
    RATIONAL = 5,
    /// 8-bit signed integer
    SBYTE = 6,
    /// 8-bit byte that may contain anything, depending on the field
    UNDEFINED = 7,
    /// 16-bit signed integer
    SSHORT = 8,
    /// 32-bit signed integer
    SLONG = 9,
    /// Fraction stored as two 32-bit signed integers
    SRATIONAL = 10,
    /// 32-bit IEEE floating point
    FLOAT = 11,
    /// 64-bit IEEE floating point
    DOUBLE = 12,
}
}

impl Type {
    /// Width in bytes of a single element of this type.
    pub fn byte_len(&self) -> u8 {
        match *self {
            Type::BYTE | Type::SBYTE | Type::ASCII | Type::UNDEFINED => 1,
            Type::SHORT | Type::SSHORT => 2,
            Type::LONG | Type::SLONG | Type::FLOAT => 4,
            Type::DOUBLE | Type::RATIONAL | Type::SRATIONAL => 8,
        }
    }

    /// Number of bytes occupied by `count` elements.
    pub(crate) fn value_bytes(&self, count: u32) -> Result<u64, crate::error::TiffError> {
        let tag_size = u64::from(self.byte_len());

        match u64::from(count).checked_mul(tag_size) {
            Some(n) => Ok(n),
            None => Err(crate::error::TiffError::LimitsExceeded),
        }
    }

    pub(crate) fn endian_bytes(self) -> EndianBytes {
        match self {
            Type::BYTE | Type::SBYTE | Type::ASCII | Type::UNDEFINED => EndianBytes::One,
            Type::SHORT | Type::SSHORT => EndianBytes::Two,
            Type::LONG | Type::SLONG | Type::FLOAT | Type::RATIONAL | Type::SRATIONAL => {
                EndianBytes::Four
            }
            Type::DOUBLE => EndianBytes::Eight,
        }
    }

    pub(crate) fn is_integer(self) -> bool {
        matches!(
            self,
            Type::BYTE | Type::SHORT | Type::LONG | Type::SBYTE | Type::SSHORT | Type::SLONG
        )
    }

    pub(crate) fn is_rational(self) -> bool {
        matches!(self, Type::RATIONAL | Type::SRATIONAL)
    }
}

/// The namespace a tag id belongs to.
///
/// Tag ids are only unique within one family: GPS tag 1 (`GPSLatitudeRef`) and Interoperability
/// tag 1 (`InteroperabilityIndex`) share an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagFamily {
    /// Baseline and extension TIFF tags of IFD0 and the thumbnail IFD.
    Tiff,
    /// Tags of the Exif private directory.
    Exif,
    /// Tags of the GPS private directory.
    Gps,
    /// Tags of the Interoperability private directory.
    Interop,
}

impl TagFamily {
    /// The host tag (and its family) that points to a directory of this family.
    pub fn host_tag(self) -> Option<(TagFamily, Tag)> {
        match self {
            TagFamily::Tiff => None,
            TagFamily::Exif => Some((TagFamily::Tiff, Tag::ExifDirectory)),
            TagFamily::Gps => Some((TagFamily::Tiff, Tag::GpsDirectory)),
            TagFamily::Interop => Some((TagFamily::Exif, Tag::InteropDirectory)),
        }
    }

    /// Families that live in direct sub-directories of a directory of this family, in the
    /// order they are laid out in a file.
    pub fn children(self) -> &'static [TagFamily] {
        match self {
            TagFamily::Tiff => &[TagFamily::Exif, TagFamily::Gps],
            TagFamily::Exif => &[TagFamily::Interop],
            TagFamily::Gps | TagFamily::Interop => &[],
        }
    }

    /// The family of the sub-directory a host tag of this family points to.
    pub fn child_for_host(self, tag: u16) -> Option<TagFamily> {
        match (self, Tag::from_u16_exhaustive(tag)) {
            (TagFamily::Tiff, Tag::ExifDirectory) => Some(TagFamily::Exif),
            (TagFamily::Tiff, Tag::GpsDirectory) => Some(TagFamily::Gps),
            // Some writers put the Interoperability pointer into IFD0.
            (TagFamily::Tiff | TagFamily::Exif, Tag::InteropDirectory) => {
                Some(TagFamily::Interop)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for TagFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TagFamily::Tiff => "Tiff tag",
            TagFamily::Exif => "Exif tag",
            TagFamily::Gps => "GPS tag",
            TagFamily::Interop => "Interop tag",
        })
    }
}

/// Byte order of the TIFF file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// little endian byte order
    LittleEndian,
    /// big endian byte order
    BigEndian,
}

impl ByteOrder {
    /// Get the byte order representing the running target.
    pub const fn native() -> Self {
        match () {
            #[cfg(target_endian = "little")]
            () => ByteOrder::LittleEndian,
            #[cfg(target_endian = "big")]
            () => ByteOrder::BigEndian,
            #[cfg(not(any(target_endian = "big", target_endian = "little")))]
            () => compile_error!("Unsupported target"),
        }
    }

    /// The two byte marker opening a TIFF header, `II` or `MM`.
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Given a typed buffer, convert its contents to the specified byte order in-place.
    ///
    /// The buffer is assumed to represent an array of the given type. Trailing bytes that do not
    /// form a whole element are left untouched.
    pub fn convert(self, ty: Type, buffer: &mut [u8], to: ByteOrder) {
        self.convert_endian_bytes(ty.endian_bytes(), buffer, to)
    }

    pub(crate) fn convert_endian_bytes(self, cls: EndianBytes, buffer: &mut [u8], to: ByteOrder) {
        if self == to {
            return;
        }

        let width = match cls {
            EndianBytes::One => return,
            EndianBytes::Two => 2,
            EndianBytes::Four => 4,
            EndianBytes::Eight => 8,
        };

        for chunk in buffer.chunks_exact_mut(width) {
            chunk.reverse();
        }
    }
}

/// The size of individual byte-order corrected elements.
#[derive(Clone, Copy)]
pub(crate) enum EndianBytes {
    One,
    Two,
    Four,
    Eight,
}
