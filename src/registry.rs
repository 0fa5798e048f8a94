//! Tag metadata: names, accepted types, defaults and enumerated meanings.
//!
//! Directories consult a [`TagRegistry`] to route tags into the right sub-directory, to choose
//! an entry type and to resolve symbolic names. [`StandardTags`] covers the baseline TIFF,
//! Exif 2.3, GPS and Interoperability tags.

use crate::ifd::Value;
use crate::tags::{TagFamily, Type};

/// A default value that can live in a static table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StaticValue {
    Byte(u8),
    Short(u16),
    Long(u32),
    Rational(u32, u32),
    Ascii(&'static str),
    Bytes(&'static [u8]),
}

impl StaticValue {
    pub fn to_value(self) -> Value {
        match self {
            StaticValue::Byte(v) => Value::Byte(v),
            StaticValue::Short(v) => Value::Short(v),
            StaticValue::Long(v) => Value::Unsigned(v),
            StaticValue::Rational(n, d) => Value::Rational(n, d),
            StaticValue::Ascii(v) => Value::Ascii(v.to_owned()),
            StaticValue::Bytes(v) => Value::Undefined(v.to_vec()),
        }
    }
}

/// Metadata of a single tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagInfo {
    pub id: u16,
    pub name: &'static str,
    pub family: TagFamily,
    /// Accepted entry types, the preferred one first.
    pub types: &'static [Type],
    pub default: Option<StaticValue>,
    pub comment: &'static str,
}

/// Read-only source of tag metadata.
pub trait TagRegistry {
    /// Metadata of a tag id within a family.
    fn by_id(&self, family: TagFamily, id: u16) -> Option<&TagInfo>;

    /// Metadata of a tag by its symbolic name, in any family.
    fn by_name(&self, name: &str) -> Option<&TagInfo>;

    /// The enumerated codes of a tag (or GeoKey) and their meaning.
    fn meanings(&self, name: &str) -> Option<&'static [(u16, &'static str)]>;

    /// Resolve a bare numeric id, families are tried in the order Tiff, Exif, GPS, Interop.
    fn resolve_id(&self, id: u16) -> Option<&TagInfo> {
        [
            TagFamily::Tiff,
            TagFamily::Exif,
            TagFamily::Gps,
            TagFamily::Interop,
        ]
        .into_iter()
        .find_map(|family| self.by_id(family, id))
    }

    /// The meaning of an enumerated code.
    fn meaning(&self, name: &str, code: u16) -> Option<&'static str> {
        self.meanings(name)?
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, m)| *m)
    }
}

/// The built-in tag tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardTags;

impl StandardTags {
    /// All known tags.
    pub fn all(&self) -> &'static [TagInfo] {
        TAGS
    }
}

impl TagRegistry for StandardTags {
    fn by_id(&self, family: TagFamily, id: u16) -> Option<&TagInfo> {
        TAGS.iter().find(|t| t.family == family && t.id == id)
    }

    fn by_name(&self, name: &str) -> Option<&TagInfo> {
        TAGS.iter().find(|t| t.name == name)
    }

    fn meanings(&self, name: &str) -> Option<&'static [(u16, &'static str)]> {
        MEANINGS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, table)| *table)
    }
}

/// The registry directories use unless another one is injected.
pub static STANDARD_TAGS: StandardTags = StandardTags;

pub(crate) fn standard() -> &'static (dyn TagRegistry + Sync) {
    &STANDARD_TAGS
}

const fn tag(
    family: TagFamily,
    id: u16,
    name: &'static str,
    types: &'static [Type],
    default: Option<StaticValue>,
    comment: &'static str,
) -> TagInfo {
    TagInfo {
        id,
        name,
        family,
        types,
        default,
        comment,
    }
}

use self::StaticValue::{Ascii as A, Bytes as B, Long as L, Rational as R, Short as S};
use crate::tags::TagFamily::{Exif, Gps, Interop, Tiff};

const BYTE: &[Type] = &[Type::BYTE];
const ASCII: &[Type] = &[Type::ASCII];
const SHORT: &[Type] = &[Type::SHORT];
const LONG: &[Type] = &[Type::LONG];
const SHORT_LONG: &[Type] = &[Type::SHORT, Type::LONG];
const RATIONAL: &[Type] = &[Type::RATIONAL];
const SRATIONAL: &[Type] = &[Type::SRATIONAL];
const UNDEFINED: &[Type] = &[Type::UNDEFINED];
const DOUBLE: &[Type] = &[Type::DOUBLE];

#[rustfmt::skip]
static TAGS: &[TagInfo] = &[
    // Baseline and extension TIFF tags.
    tag(Tiff, 254, "NewSubfileType", LONG, Some(L(0)), "A general indication of the kind of data contained in this subfile"),
    tag(Tiff, 255, "SubfileType", SHORT, None, "Deprecated, use NewSubfileType instead"),
    tag(Tiff, 256, "ImageWidth", SHORT_LONG, None, "Number of columns in the image"),
    tag(Tiff, 257, "ImageLength", SHORT_LONG, None, "Number of rows in the image"),
    tag(Tiff, 258, "BitsPerSample", SHORT, Some(S(1)), "Number of bits per component"),
    tag(Tiff, 259, "Compression", SHORT, Some(S(1)), "Compression scheme used on the image data"),
    tag(Tiff, 262, "PhotometricInterpretation", SHORT, None, "The color space of the image data"),
    tag(Tiff, 263, "Threshholding", SHORT, Some(S(1)), "Technique used to convert from gray to black and white pixels"),
    tag(Tiff, 264, "CellWidth", SHORT, None, "Width of the dithering or halftoning matrix"),
    tag(Tiff, 265, "CellLength", SHORT, None, "Length of the dithering or halftoning matrix"),
    tag(Tiff, 266, "FillOrder", SHORT, Some(S(1)), "Logical order of bits within a byte"),
    tag(Tiff, 269, "DocumentName", ASCII, None, "Name of the document from which this image was scanned"),
    tag(Tiff, 270, "ImageDescription", ASCII, None, "A string that describes the subject of the image"),
    tag(Tiff, 271, "Make", ASCII, None, "Manufacturer of the recording equipment"),
    tag(Tiff, 272, "Model", ASCII, None, "Model name or number of the recording equipment"),
    tag(Tiff, 273, "StripOffsets", SHORT_LONG, None, "Byte offset of each strip"),
    tag(Tiff, 274, "Orientation", SHORT, Some(S(1)), "Orientation of the image with respect to the rows and columns"),
    tag(Tiff, 277, "SamplesPerPixel", SHORT, Some(S(1)), "Number of components per pixel"),
    tag(Tiff, 278, "RowsPerStrip", SHORT_LONG, None, "Number of rows per strip"),
    tag(Tiff, 279, "StripByteCounts", SHORT_LONG, None, "Number of bytes in each strip after compression"),
    tag(Tiff, 280, "MinSampleValue", SHORT, None, "Minimum component value used"),
    tag(Tiff, 281, "MaxSampleValue", SHORT, None, "Maximum component value used"),
    tag(Tiff, 282, "XResolution", RATIONAL, Some(R(72, 1)), "Number of pixels per ResolutionUnit in the image width"),
    tag(Tiff, 283, "YResolution", RATIONAL, Some(R(72, 1)), "Number of pixels per ResolutionUnit in the image length"),
    tag(Tiff, 284, "PlanarConfiguration", SHORT, Some(S(1)), "How the components of each pixel are stored"),
    tag(Tiff, 285, "PageName", ASCII, None, "Name of the page from which this image was scanned"),
    tag(Tiff, 286, "XPosition", RATIONAL, None, "X position of the image"),
    tag(Tiff, 287, "YPosition", RATIONAL, None, "Y position of the image"),
    tag(Tiff, 288, "FreeOffsets", LONG, None, "Byte offset of each string of unused bytes"),
    tag(Tiff, 289, "FreeByteCounts", LONG, None, "Number of bytes in each string of unused bytes"),
    tag(Tiff, 290, "GrayResponseUnit", SHORT, Some(S(2)), "Precision of the information in GrayResponseCurve"),
    tag(Tiff, 291, "GrayResponseCurve", SHORT, None, "Optical density of each possible pixel value"),
    tag(Tiff, 292, "T4Options", LONG, Some(L(0)), "Options for Group 3 Fax compression"),
    tag(Tiff, 293, "T6Options", LONG, Some(L(0)), "Options for Group 4 Fax compression"),
    tag(Tiff, 296, "ResolutionUnit", SHORT, Some(S(2)), "Unit of measurement for XResolution and YResolution"),
    tag(Tiff, 297, "PageNumber", SHORT, None, "Page number of the page from which this image was scanned"),
    tag(Tiff, 301, "TransferFunction", SHORT, None, "Transfer function for the image"),
    tag(Tiff, 305, "Software", ASCII, None, "Name and version of the software used to create the image"),
    tag(Tiff, 306, "DateTime", ASCII, None, "Date and time of image creation"),
    tag(Tiff, 315, "Artist", ASCII, None, "Person who created the image"),
    tag(Tiff, 316, "HostComputer", ASCII, None, "Computer and operating system in use at the time of image creation"),
    tag(Tiff, 317, "Predictor", SHORT, Some(S(1)), "Mathematical operator applied to the image data before encoding"),
    tag(Tiff, 318, "WhitePoint", RATIONAL, None, "Chromaticity of the white point of the image"),
    tag(Tiff, 319, "PrimaryChromaticities", RATIONAL, None, "Chromaticities of the primaries of the image"),
    tag(Tiff, 320, "ColorMap", SHORT, None, "Color map for palette color images"),
    tag(Tiff, 321, "HalftoneHints", SHORT, None, "Purpose and usage of highlight and shadow values"),
    tag(Tiff, 322, "TileWidth", SHORT_LONG, None, "Tile width in pixels"),
    tag(Tiff, 323, "TileLength", SHORT_LONG, None, "Tile length in pixels"),
    tag(Tiff, 324, "TileOffsets", LONG, None, "Byte offset of each tile"),
    tag(Tiff, 325, "TileByteCounts", SHORT_LONG, None, "Number of bytes in each compressed tile"),
    tag(Tiff, 330, "SubIFDs", LONG, None, "Offsets to child IFDs"),
    tag(Tiff, 332, "InkSet", SHORT, Some(S(1)), "Set of inks used in a separated image"),
    tag(Tiff, 333, "InkNames", ASCII, None, "Name of each ink used in a separated image"),
    tag(Tiff, 334, "NumberOfInks", SHORT, Some(S(4)), "Number of inks"),
    tag(Tiff, 336, "DotRange", &[Type::BYTE, Type::SHORT], None, "Component values that correspond to a 0% dot and 100% dot"),
    tag(Tiff, 337, "TargetPrinter", ASCII, None, "Description of the printing environment"),
    tag(Tiff, 338, "ExtraSamples", SHORT, None, "Description of extra components"),
    tag(Tiff, 339, "SampleFormat", SHORT, Some(S(1)), "How to interpret each data sample in a pixel"),
    tag(Tiff, 342, "TransferRange", SHORT, None, "Expands the range of the TransferFunction"),
    tag(Tiff, 347, "JPEGTables", UNDEFINED, None, "JPEG quantization and Huffman tables"),
    tag(Tiff, 512, "JPEGProc", SHORT, None, "Old-style JPEG compression field"),
    tag(Tiff, 513, "JPEGInterchangeFormat", LONG, None, "Offset to the start byte of JPEG compressed thumbnail data"),
    tag(Tiff, 514, "JPEGInterchangeFormatLength", LONG, None, "Number of bytes of JPEG compressed thumbnail data"),
    tag(Tiff, 529, "YCbCrCoefficients", RATIONAL, None, "Matrix coefficients for transformation from RGB to YCbCr"),
    tag(Tiff, 530, "YCbCrSubSampling", SHORT, None, "Sampling ratio of chrominance components"),
    tag(Tiff, 531, "YCbCrPositioning", SHORT, Some(S(1)), "Position of chrominance components relative to luminance"),
    tag(Tiff, 532, "ReferenceBlackWhite", RATIONAL, None, "Pair of headroom and footroom values for each component"),
    tag(Tiff, 700, "XMLPacket", BYTE, None, "XMP metadata"),
    tag(Tiff, 18246, "Rating", SHORT, None, "Rating tag used by Windows"),
    tag(Tiff, 18249, "RatingPercent", SHORT, None, "Rating tag used by Windows, value in percent"),
    tag(Tiff, 32781, "ImageID", ASCII, None, "OPI related"),
    tag(Tiff, 33432, "Copyright", ASCII, None, "Copyright notice"),
    tag(Tiff, 33550, "ModelPixelScaleTag", DOUBLE, None, "Model space scale of a raster pixel"),
    tag(Tiff, 33723, "IPTCNAA", LONG, None, "IPTC/NAA record"),
    tag(Tiff, 33922, "ModelTiepointTag", DOUBLE, None, "Raster to model space tie points"),
    tag(Tiff, 34264, "ModelTransformationTag", DOUBLE, None, "Raster to model space transformation matrix"),
    tag(Tiff, 34377, "ImageResources", BYTE, None, "Photoshop image resources"),
    tag(Tiff, 34665, "ExifIFD", LONG, None, "A pointer to the Exif IFD"),
    tag(Tiff, 34675, "InterColorProfile", UNDEFINED, None, "ICC profile"),
    tag(Tiff, 34735, "GeoKeyDirectoryTag", SHORT, None, "GeoTIFF key directory"),
    tag(Tiff, 34736, "GeoDoubleParamsTag", DOUBLE, None, "GeoTIFF double parameters"),
    tag(Tiff, 34737, "GeoAsciiParamsTag", ASCII, None, "GeoTIFF ASCII parameters"),
    tag(Tiff, 34853, "GPSIFD", LONG, None, "A pointer to the GPS IFD"),
    tag(Tiff, 37398, "TIFFEPStandardID", BYTE, None, "TIFF/EP standard version"),
    tag(Tiff, 40091, "XPTitle", BYTE, None, "Title, used by Windows, encoded in UTF-16LE"),
    tag(Tiff, 40092, "XPComment", BYTE, None, "Comment, used by Windows, encoded in UTF-16LE"),
    tag(Tiff, 40093, "XPAuthor", BYTE, None, "Author, used by Windows, encoded in UTF-16LE"),
    tag(Tiff, 40094, "XPKeywords", BYTE, None, "Keywords, used by Windows, encoded in UTF-16LE"),
    tag(Tiff, 40095, "XPSubject", BYTE, None, "Subject, used by Windows, encoded in UTF-16LE"),
    tag(Tiff, 42112, "GDAL_METADATA", ASCII, None, "GDAL metadata XML"),
    tag(Tiff, 42113, "GDAL_NODATA", ASCII, None, "GDAL no data value"),
    tag(Tiff, 50341, "PrintImageMatching", UNDEFINED, None, "Print Image Matching data"),
    tag(Tiff, 50706, "DNGVersion", BYTE, None, "DNG specification version"),
    tag(Tiff, 50707, "DNGBackwardVersion", BYTE, None, "Oldest DNG version the file is compatible with"),
    tag(Tiff, 50708, "UniqueCameraModel", ASCII, None, "Unique, non-localized camera model name"),
    tag(Tiff, 50709, "LocalizedCameraModel", BYTE, None, "Localized camera model name"),

    // Exif private directory.
    tag(Exif, 33434, "ExposureTime", RATIONAL, None, "Exposure time, given in seconds"),
    tag(Exif, 33437, "FNumber", RATIONAL, None, "The F number"),
    tag(Exif, 34850, "ExposureProgram", SHORT, Some(S(0)), "Class of the program used by the camera to set exposure"),
    tag(Exif, 34852, "SpectralSensitivity", ASCII, None, "Spectral sensitivity of each channel"),
    tag(Exif, 34855, "ISOSpeedRatings", SHORT, None, "ISO speed and ISO latitude of the camera"),
    tag(Exif, 34856, "OECF", UNDEFINED, None, "Opto-Electric Conversion Function"),
    tag(Exif, 34864, "SensitivityType", SHORT, None, "Which of the sensitivity parameters is recorded"),
    tag(Exif, 34865, "StandardOutputSensitivity", LONG, None, "Standard output sensitivity"),
    tag(Exif, 34866, "RecommendedExposureIndex", LONG, None, "Recommended exposure index"),
    tag(Exif, 34867, "ISOSpeed", LONG, None, "ISO speed value"),
    tag(Exif, 36864, "ExifVersion", UNDEFINED, Some(B(b"0230")), "Version of the Exif standard"),
    tag(Exif, 36867, "DateTimeOriginal", ASCII, None, "Date and time the original image data was generated"),
    tag(Exif, 36868, "DateTimeDigitized", ASCII, None, "Date and time the image was stored as digital data"),
    tag(Exif, 36880, "OffsetTime", ASCII, None, "Time zone offset of DateTime"),
    tag(Exif, 36881, "OffsetTimeOriginal", ASCII, None, "Time zone offset of DateTimeOriginal"),
    tag(Exif, 36882, "OffsetTimeDigitized", ASCII, None, "Time zone offset of DateTimeDigitized"),
    tag(Exif, 37121, "ComponentsConfiguration", UNDEFINED, Some(B(&[1, 2, 3, 0])), "Meaning of each component"),
    tag(Exif, 37122, "CompressedBitsPerPixel", RATIONAL, None, "Image compression mode"),
    tag(Exif, 37377, "ShutterSpeedValue", SRATIONAL, None, "Shutter speed in APEX units"),
    tag(Exif, 37378, "ApertureValue", RATIONAL, None, "Lens aperture in APEX units"),
    tag(Exif, 37379, "BrightnessValue", SRATIONAL, None, "Brightness in APEX units"),
    tag(Exif, 37380, "ExposureBiasValue", SRATIONAL, None, "Exposure bias in APEX units"),
    tag(Exif, 37381, "MaxApertureValue", RATIONAL, None, "Smallest F number of the lens"),
    tag(Exif, 37382, "SubjectDistance", RATIONAL, None, "Distance to the subject, given in meters"),
    tag(Exif, 37383, "MeteringMode", SHORT, Some(S(0)), "Metering mode"),
    tag(Exif, 37384, "LightSource", SHORT, Some(S(0)), "Kind of light source"),
    tag(Exif, 37385, "Flash", SHORT, None, "Status of flash when the image was shot"),
    tag(Exif, 37386, "FocalLength", RATIONAL, None, "Actual focal length of the lens, in mm"),
    tag(Exif, 37396, "SubjectArea", SHORT, None, "Location and area of the main subject"),
    tag(Exif, 37500, "MakerNote", UNDEFINED, None, "Manufacturer specific information"),
    tag(Exif, 37510, "UserComment", UNDEFINED, None, "Keywords or comments on the image"),
    tag(Exif, 37520, "SubsecTime", ASCII, None, "Fractions of seconds for DateTime"),
    tag(Exif, 37521, "SubsecTimeOriginal", ASCII, None, "Fractions of seconds for DateTimeOriginal"),
    tag(Exif, 37522, "SubsecTimeDigitized", ASCII, None, "Fractions of seconds for DateTimeDigitized"),
    tag(Exif, 37888, "Temperature", SRATIONAL, None, "Ambient temperature in degrees Celsius"),
    tag(Exif, 37889, "Humidity", RATIONAL, None, "Ambient relative humidity in percent"),
    tag(Exif, 37890, "Pressure", RATIONAL, None, "Ambient pressure in hPa"),
    tag(Exif, 37891, "WaterDepth", SRATIONAL, None, "Water depth in meters"),
    tag(Exif, 37892, "Acceleration", RATIONAL, None, "Acceleration in mGal"),
    tag(Exif, 37893, "CameraElevationAngle", SRATIONAL, None, "Elevation angle of the camera in degrees"),
    tag(Exif, 40960, "FlashpixVersion", UNDEFINED, Some(B(b"0100")), "Supported Flashpix version"),
    tag(Exif, 40961, "ColorSpace", SHORT, Some(S(1)), "Color space information"),
    tag(Exif, 40962, "PixelXDimension", SHORT_LONG, None, "Valid image width"),
    tag(Exif, 40963, "PixelYDimension", SHORT_LONG, None, "Valid image height"),
    tag(Exif, 40964, "RelatedSoundFile", ASCII, None, "Name of an audio file related to the image"),
    tag(Exif, 40965, "InteroperabilityIFD", LONG, None, "A pointer to the Interoperability IFD"),
    tag(Exif, 41483, "FlashEnergy", RATIONAL, None, "Strobe energy in BCPS"),
    tag(Exif, 41484, "SpatialFrequencyResponse", UNDEFINED, None, "Spatial frequency table and SFR values"),
    tag(Exif, 41486, "FocalPlaneXResolution", RATIONAL, None, "Pixels per FocalPlaneResolutionUnit in the image width"),
    tag(Exif, 41487, "FocalPlaneYResolution", RATIONAL, None, "Pixels per FocalPlaneResolutionUnit in the image height"),
    tag(Exif, 41488, "FocalPlaneResolutionUnit", SHORT, Some(S(2)), "Unit of FocalPlaneXResolution and FocalPlaneYResolution"),
    tag(Exif, 41492, "SubjectLocation", SHORT, None, "Location of the main subject"),
    tag(Exif, 41493, "ExposureIndex", RATIONAL, None, "Exposure index selected on the camera"),
    tag(Exif, 41495, "SensingMethod", SHORT, None, "Image sensor type"),
    tag(Exif, 41728, "FileSource", UNDEFINED, Some(B(&[3])), "Image source"),
    tag(Exif, 41729, "SceneType", UNDEFINED, Some(B(&[1])), "Type of scene"),
    tag(Exif, 41730, "CFAPattern", UNDEFINED, None, "Color filter array geometric pattern"),
    tag(Exif, 41985, "CustomRendered", SHORT, Some(S(0)), "Use of special processing on image data"),
    tag(Exif, 41986, "ExposureMode", SHORT, None, "Exposure mode set when the image was shot"),
    tag(Exif, 41987, "WhiteBalance", SHORT, None, "White balance mode set when the image was shot"),
    tag(Exif, 41988, "DigitalZoomRatio", RATIONAL, None, "Digital zoom ratio"),
    tag(Exif, 41989, "FocalLengthIn35mmFilm", SHORT, None, "Equivalent focal length assuming a 35mm film camera"),
    tag(Exif, 41990, "SceneCaptureType", SHORT, Some(S(0)), "Type of scene that was shot"),
    tag(Exif, 41991, "GainControl", SHORT, None, "Degree of overall image gain adjustment"),
    tag(Exif, 41992, "Contrast", SHORT, Some(S(0)), "Direction of contrast processing"),
    tag(Exif, 41993, "Saturation", SHORT, Some(S(0)), "Direction of saturation processing"),
    tag(Exif, 41994, "Sharpness", SHORT, Some(S(0)), "Direction of sharpness processing"),
    tag(Exif, 41995, "DeviceSettingDescription", UNDEFINED, None, "Picture-taking conditions of a particular camera model"),
    tag(Exif, 41996, "SubjectDistanceRange", SHORT, None, "Distance to the subject"),
    tag(Exif, 42016, "ImageUniqueID", ASCII, None, "Unique image identifier"),
    tag(Exif, 42032, "CameraOwnerName", ASCII, None, "Owner of the camera"),
    tag(Exif, 42033, "BodySerialNumber", ASCII, None, "Serial number of the camera body"),
    tag(Exif, 42034, "LensSpecification", RATIONAL, None, "Minimum and maximum focal length and F number"),
    tag(Exif, 42035, "LensMake", ASCII, None, "Manufacturer of the lens"),
    tag(Exif, 42036, "LensModel", ASCII, None, "Model name of the lens"),
    tag(Exif, 42037, "LensSerialNumber", ASCII, None, "Serial number of the lens"),
    tag(Exif, 42240, "Gamma", RATIONAL, None, "Gamma coefficient"),

    // GPS private directory.
    tag(Gps, 0, "GPSVersionID", BYTE, Some(B(&[2, 2, 0, 0])), "Version of the GPS IFD"),
    tag(Gps, 1, "GPSLatitudeRef", ASCII, None, "North or south latitude"),
    tag(Gps, 2, "GPSLatitude", RATIONAL, None, "Latitude"),
    tag(Gps, 3, "GPSLongitudeRef", ASCII, None, "East or west longitude"),
    tag(Gps, 4, "GPSLongitude", RATIONAL, None, "Longitude"),
    tag(Gps, 5, "GPSAltitudeRef", BYTE, Some(StaticValue::Byte(0)), "Altitude used as the reference altitude"),
    tag(Gps, 6, "GPSAltitude", RATIONAL, None, "Altitude in meters"),
    tag(Gps, 7, "GPSTimeStamp", RATIONAL, None, "Time as UTC"),
    tag(Gps, 8, "GPSSatellites", ASCII, None, "Satellites used for measurement"),
    tag(Gps, 9, "GPSStatus", ASCII, None, "Status of the GPS receiver"),
    tag(Gps, 10, "GPSMeasureMode", ASCII, None, "GPS measurement mode"),
    tag(Gps, 11, "GPSDOP", RATIONAL, None, "Measurement precision"),
    tag(Gps, 12, "GPSSpeedRef", ASCII, Some(A("K")), "Unit used to express the GPS receiver speed"),
    tag(Gps, 13, "GPSSpeed", RATIONAL, None, "Speed of the GPS receiver"),
    tag(Gps, 14, "GPSTrackRef", ASCII, Some(A("T")), "Reference for the direction of movement"),
    tag(Gps, 15, "GPSTrack", RATIONAL, None, "Direction of movement"),
    tag(Gps, 16, "GPSImgDirectionRef", ASCII, Some(A("T")), "Reference for the direction of the image"),
    tag(Gps, 17, "GPSImgDirection", RATIONAL, None, "Direction of the image when it was captured"),
    tag(Gps, 18, "GPSMapDatum", ASCII, None, "Geodetic survey data used by the GPS receiver"),
    tag(Gps, 19, "GPSDestLatitudeRef", ASCII, None, "North or south latitude of the destination"),
    tag(Gps, 20, "GPSDestLatitude", RATIONAL, None, "Latitude of the destination"),
    tag(Gps, 21, "GPSDestLongitudeRef", ASCII, None, "East or west longitude of the destination"),
    tag(Gps, 22, "GPSDestLongitude", RATIONAL, None, "Longitude of the destination"),
    tag(Gps, 23, "GPSDestBearingRef", ASCII, Some(A("T")), "Reference for the bearing to the destination"),
    tag(Gps, 24, "GPSDestBearing", RATIONAL, None, "Bearing to the destination"),
    tag(Gps, 25, "GPSDestDistanceRef", ASCII, Some(A("K")), "Unit of the distance to the destination"),
    tag(Gps, 26, "GPSDestDistance", RATIONAL, None, "Distance to the destination"),
    tag(Gps, 27, "GPSProcessingMethod", UNDEFINED, None, "Name of the method used for location finding"),
    tag(Gps, 28, "GPSAreaInformation", UNDEFINED, None, "Name of the GPS area"),
    tag(Gps, 29, "GPSDateStamp", ASCII, None, "Date as UTC"),
    tag(Gps, 30, "GPSDifferential", SHORT, None, "Whether differential correction is applied"),
    tag(Gps, 31, "GPSHPositioningError", RATIONAL, None, "Horizontal positioning error in meters"),

    // Interoperability private directory.
    tag(Interop, 1, "InteroperabilityIndex", ASCII, None, "Identification of the interoperability rule"),
    tag(Interop, 2, "InteroperabilityVersion", UNDEFINED, Some(B(b"0100")), "Version of the interoperability rule"),
    tag(Interop, 4096, "RelatedImageFileFormat", ASCII, None, "File format of the image"),
    tag(Interop, 4097, "RelatedImageWidth", SHORT_LONG, None, "Image width"),
    tag(Interop, 4098, "RelatedImageLength", SHORT_LONG, None, "Image height"),
];

const RESOLUTION_UNITS: &[(u16, &str)] = &[(1, "No absolute unit"), (2, "Inch"), (3, "Centimeter")];
const PROCESSING_DIRECTION: &[(u16, &str)] = &[(0, "Normal"), (1, "Low"), (2, "High")];

#[rustfmt::skip]
static MEANINGS: &[(&str, &[(u16, &str)])] = &[
    ("Compression", &[
        (1, "Uncompressed"), (2, "CCITT 1D"), (3, "T4/Group 3 Fax"), (4, "T6/Group 4 Fax"),
        (5, "LZW"), (6, "JPEG (old-style)"), (7, "JPEG"), (8, "Adobe Deflate"),
        (32773, "PackBits"), (32946, "Deflate"), (34712, "JPEG 2000"),
    ]),
    ("PhotometricInterpretation", &[
        (0, "WhiteIsZero"), (1, "BlackIsZero"), (2, "RGB"), (3, "RGB Palette"),
        (4, "Transparency Mask"), (5, "CMYK"), (6, "YCbCr"), (8, "CIELab"), (9, "ICCLab"),
        (10, "ITULab"),
    ]),
    ("Orientation", &[
        (1, "Horizontal (normal)"), (2, "Mirror horizontal"), (3, "Rotate 180"),
        (4, "Mirror vertical"), (5, "Mirror horizontal and rotate 270 CW"), (6, "Rotate 90 CW"),
        (7, "Mirror horizontal and rotate 90 CW"), (8, "Rotate 270 CW"),
    ]),
    ("ResolutionUnit", RESOLUTION_UNITS),
    ("FocalPlaneResolutionUnit", RESOLUTION_UNITS),
    ("PlanarConfiguration", &[(1, "Chunky"), (2, "Planar")]),
    ("YCbCrPositioning", &[(1, "Centered"), (2, "Co-sited")]),
    ("ExposureProgram", &[
        (0, "Not defined"), (1, "Manual"), (2, "Normal program"), (3, "Aperture priority"),
        (4, "Shutter priority"), (5, "Creative program"), (6, "Action program"),
        (7, "Portrait mode"), (8, "Landscape mode"),
    ]),
    ("MeteringMode", &[
        (0, "Unknown"), (1, "Average"), (2, "Center weighted average"), (3, "Spot"),
        (4, "Multi-spot"), (5, "Pattern"), (6, "Partial"), (255, "Other"),
    ]),
    ("LightSource", &[
        (0, "Unknown"), (1, "Daylight"), (2, "Fluorescent"), (3, "Tungsten"), (4, "Flash"),
        (9, "Fine weather"), (10, "Cloudy weather"), (11, "Shade"), (255, "Other"),
    ]),
    ("ColorSpace", &[(1, "sRGB"), (65535, "Uncalibrated")]),
    ("SensingMethod", &[
        (1, "Not defined"), (2, "One-chip color area sensor"), (3, "Two-chip color area sensor"),
        (4, "Three-chip color area sensor"), (5, "Color sequential area sensor"),
        (7, "Trilinear sensor"), (8, "Color sequential linear sensor"),
    ]),
    ("CustomRendered", &[(0, "Normal process"), (1, "Custom process")]),
    ("ExposureMode", &[(0, "Auto exposure"), (1, "Manual exposure"), (2, "Auto bracket")]),
    ("WhiteBalance", &[(0, "Auto white balance"), (1, "Manual white balance")]),
    ("SceneCaptureType", &[(0, "Standard"), (1, "Landscape"), (2, "Portrait"), (3, "Night scene")]),
    ("GainControl", &[
        (0, "None"), (1, "Low gain up"), (2, "High gain up"), (3, "Low gain down"),
        (4, "High gain down"),
    ]),
    ("Contrast", &[(0, "Normal"), (1, "Soft"), (2, "Hard")]),
    ("Saturation", PROCESSING_DIRECTION),
    ("Sharpness", &[(0, "Normal"), (1, "Soft"), (2, "Hard")]),
    ("SubjectDistanceRange", &[(0, "Unknown"), (1, "Macro"), (2, "Close view"), (3, "Distant view")]),
    ("GPSAltitudeRef", &[(0, "Above sea level"), (1, "Below sea level")]),
    ("GPSDifferential", &[(0, "Without correction"), (1, "Correction applied")]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let all = STANDARD_TAGS.all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name, b.name);
                assert!(a.family != b.family || a.id != b.id, "{} duplicated", a.name);
            }
        }
    }

    #[test]
    fn ids_are_scoped_by_family() {
        let gps = STANDARD_TAGS.by_id(TagFamily::Gps, 1).unwrap();
        let interop = STANDARD_TAGS.by_id(TagFamily::Interop, 1).unwrap();
        assert_eq!(gps.name, "GPSLatitudeRef");
        assert_eq!(interop.name, "InteroperabilityIndex");

        // Bare ids prefer GPS over Interoperability.
        assert_eq!(STANDARD_TAGS.resolve_id(1).unwrap().family, TagFamily::Gps);
        assert_eq!(STANDARD_TAGS.resolve_id(271).unwrap().name, "Make");
    }

    #[test]
    fn meanings() {
        assert_eq!(STANDARD_TAGS.meaning("Orientation", 6), Some("Rotate 90 CW"));
        assert_eq!(STANDARD_TAGS.meaning("Orientation", 42), None);
        assert_eq!(STANDARD_TAGS.meaning("Make", 1), None);
    }

    #[test]
    fn defaults() {
        let info = STANDARD_TAGS.by_name("XResolution").unwrap();
        assert_eq!(info.default.map(StaticValue::to_value), Some(Value::Rational(72, 1)));
    }
}
