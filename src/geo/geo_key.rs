use crate::tags::{tags, Tag};

// More info about geotiff keys can be found
// [here](http://geotiff.maptools.org/spec/geotiff2.7.html)
tags! {
/// A key of the GeoTIFF key directory.
pub enum GeoKey(u16) unknown(
    /// A key outside of the GeoTIFF 1.0 key set
    unknown
) {
    // GeoTIFF Configuration GeoKeys
    GTModelTypeGeoKey = 1024,
    GTRasterTypeGeoKey = 1025,
    GTCitationGeoKey = 1026,
    // Geographic CS Parameter GeoKeys
    GeographicTypeGeoKey = 2048,
    GeogCitationGeoKey = 2049,
    GeogGeodeticDatumGeoKey = 2050,
    GeogPrimeMeridianGeoKey = 2051,
    GeogLinearUnitsGeoKey = 2052,
    GeogLinearUnitSizeGeoKey = 2053,
    GeogAngularUnitsGeoKey = 2054,
    GeogAngularUnitSizeGeoKey = 2055,
    GeogEllipsoidGeoKey = 2056,
    GeogSemiMajorAxisGeoKey = 2057,
    GeogSemiMinorAxisGeoKey = 2058,
    GeogInvFlatteningGeoKey = 2059,
    GeogAzimuthUnitsGeoKey = 2060,
    GeogPrimeMeridianLongGeoKey = 2061,
    // Projected CS Parameter GeoKeys
    ProjectedCSTypeGeoKey = 3072,
    PCSCitationGeoKey = 3073,
    // Projection Definition GeoKeys
    ProjectionGeoKey = 3074,
    ProjCoordTransGeoKey = 3075,
    ProjLinearUnitsGeoKey = 3076,
    ProjLinearUnitSizeGeoKey = 3077,
    ProjStdParallel1GeoKey = 3078,
    ProjStdParallel2GeoKey = 3079,
    ProjNatOriginLongGeoKey = 3080,
    ProjNatOriginLatGeoKey = 3081,
    ProjFalseEastingGeoKey = 3082,
    ProjFalseNorthingGeoKey = 3083,
    ProjFalseOriginLongGeoKey = 3084,
    ProjFalseOriginLatGeoKey = 3085,
    ProjFalseOriginEastingGeoKey = 3086,
    ProjFalseOriginNorthingGeoKey = 3087,
    ProjCenterLongGeoKey = 3088,
    ProjCenterLatGeoKey = 3089,
    ProjCenterEastingGeoKey = 3090,
    ProjCenterNorthingGeoKey = 3091,
    ProjScaleAtNatOriginGeoKey = 3092,
    ProjScaleAtCenterGeoKey = 3093,
    ProjAzimuthAngleGeoKey = 3094,
    ProjStraightVertPoleLongGeoKey = 3095,
    // Vertical CS Parameter Keys
    VerticalCSTypeGeoKey = 4096,
    VerticalCitationGeoKey = 4097,
    VerticalDatumGeoKey = 4098,
    VerticalUnitsGeoKey = 4099,
}
}

/// Where the value of a key is stored, the second short of a key entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeoKeyLocation {
    /// The value is the fourth short of the key entry.
    Inline,
    /// Shorts appended to the key directory.
    Shorts,
    /// Elements of `GeoDoubleParamsTag`.
    Doubles,
    /// A `|` terminated slice of `GeoAsciiParamsTag`.
    Ascii,
}

impl GeoKeyLocation {
    pub fn to_u16(self) -> u16 {
        match self {
            GeoKeyLocation::Inline => 0,
            GeoKeyLocation::Shorts => Tag::GeoKeyDirectoryTag.to_u16(),
            GeoKeyLocation::Doubles => Tag::GeoDoubleParamsTag.to_u16(),
            GeoKeyLocation::Ascii => Tag::GeoAsciiParamsTag.to_u16(),
        }
    }

    pub fn from_u16(location: u16) -> Option<Self> {
        if location == 0 {
            return Some(GeoKeyLocation::Inline);
        }
        match Tag::from_u16(location)? {
            Tag::GeoKeyDirectoryTag => Some(GeoKeyLocation::Shorts),
            Tag::GeoDoubleParamsTag => Some(GeoKeyLocation::Doubles),
            Tag::GeoAsciiParamsTag => Some(GeoKeyLocation::Ascii),
            _ => None,
        }
    }
}

/// Metadata of a GeoKey.
#[derive(Debug)]
pub struct GeoKeyInfo {
    pub key: GeoKey,
    pub name: &'static str,
    pub location: GeoKeyLocation,
    pub default: Option<u16>,
    pub comment: Option<&'static str>,
}

const fn info(
    key: GeoKey,
    name: &'static str,
    location: GeoKeyLocation,
    default: Option<u16>,
    comment: Option<&'static str>,
) -> GeoKeyInfo {
    GeoKeyInfo {
        key,
        name,
        location,
        default,
        comment,
    }
}

use self::GeoKeyLocation::{Ascii, Doubles, Inline};

static KEYS: &[GeoKeyInfo] = &[
    info(GeoKey::GTModelTypeGeoKey, "GTModelTypeGeoKey", Inline, None, None),
    info(GeoKey::GTRasterTypeGeoKey, "GTRasterTypeGeoKey", Inline, Some(1), None),
    info(GeoKey::GTCitationGeoKey, "GTCitationGeoKey", Ascii, None, None),
    info(
        GeoKey::GeographicTypeGeoKey,
        "GeographicTypeGeoKey",
        Inline,
        Some(4326),
        Some("EPSG geographic CS code, 4000 to 4999"),
    ),
    info(GeoKey::GeogCitationGeoKey, "GeogCitationGeoKey", Ascii, None, None),
    info(
        GeoKey::GeogGeodeticDatumGeoKey,
        "GeogGeodeticDatumGeoKey",
        Inline,
        None,
        Some("EPSG datum code, 6000 to 6999"),
    ),
    info(
        GeoKey::GeogPrimeMeridianGeoKey,
        "GeogPrimeMeridianGeoKey",
        Inline,
        Some(8901),
        Some("EPSG prime meridian code, 8000 to 8999"),
    ),
    info(
        GeoKey::GeogLinearUnitsGeoKey,
        "GeogLinearUnitsGeoKey",
        Inline,
        Some(9001),
        None,
    ),
    info(
        GeoKey::GeogLinearUnitSizeGeoKey,
        "GeogLinearUnitSizeGeoKey",
        Doubles,
        None,
        Some("custom unit in meters"),
    ),
    info(
        GeoKey::GeogAngularUnitsGeoKey,
        "GeogAngularUnitsGeoKey",
        Inline,
        Some(9102),
        None,
    ),
    info(
        GeoKey::GeogAngularUnitSizeGeoKey,
        "GeogAngularUnitSizeGeoKey",
        Doubles,
        None,
        Some("custom unit in radians"),
    ),
    info(
        GeoKey::GeogEllipsoidGeoKey,
        "GeogEllipsoidGeoKey",
        Inline,
        None,
        Some("EPSG ellipsoid code, 7000 to 7999"),
    ),
    info(GeoKey::GeogSemiMajorAxisGeoKey, "GeogSemiMajorAxisGeoKey", Doubles, None, None),
    info(GeoKey::GeogSemiMinorAxisGeoKey, "GeogSemiMinorAxisGeoKey", Doubles, None, None),
    info(GeoKey::GeogInvFlatteningGeoKey, "GeogInvFlatteningGeoKey", Doubles, None, None),
    info(GeoKey::GeogAzimuthUnitsGeoKey, "GeogAzimuthUnitsGeoKey", Inline, None, None),
    info(
        GeoKey::GeogPrimeMeridianLongGeoKey,
        "GeogPrimeMeridianLongGeoKey",
        Doubles,
        None,
        Some("custom prime meridian in GeogAngularUnits"),
    ),
    info(
        GeoKey::ProjectedCSTypeGeoKey,
        "ProjectedCSTypeGeoKey",
        Inline,
        None,
        Some("EPSG projected CS code, 20000 to 32760"),
    ),
    info(GeoKey::PCSCitationGeoKey, "PCSCitationGeoKey", Ascii, None, None),
    info(GeoKey::ProjectionGeoKey, "ProjectionGeoKey", Inline, None, Some("10000 to 19999")),
    info(GeoKey::ProjCoordTransGeoKey, "ProjCoordTransGeoKey", Inline, None, None),
    info(GeoKey::ProjLinearUnitsGeoKey, "ProjLinearUnitsGeoKey", Inline, None, None),
    info(
        GeoKey::ProjLinearUnitSizeGeoKey,
        "ProjLinearUnitSizeGeoKey",
        Doubles,
        None,
        Some("custom unit in meters"),
    ),
    info(GeoKey::ProjStdParallel1GeoKey, "ProjStdParallel1GeoKey", Doubles, None, None),
    info(GeoKey::ProjStdParallel2GeoKey, "ProjStdParallel2GeoKey", Doubles, None, None),
    info(GeoKey::ProjNatOriginLongGeoKey, "ProjNatOriginLongGeoKey", Doubles, None, None),
    info(GeoKey::ProjNatOriginLatGeoKey, "ProjNatOriginLatGeoKey", Doubles, None, None),
    info(GeoKey::ProjFalseEastingGeoKey, "ProjFalseEastingGeoKey", Doubles, None, None),
    info(GeoKey::ProjFalseNorthingGeoKey, "ProjFalseNorthingGeoKey", Doubles, None, None),
    info(GeoKey::ProjFalseOriginLongGeoKey, "ProjFalseOriginLongGeoKey", Doubles, None, None),
    info(GeoKey::ProjFalseOriginLatGeoKey, "ProjFalseOriginLatGeoKey", Doubles, None, None),
    info(
        GeoKey::ProjFalseOriginEastingGeoKey,
        "ProjFalseOriginEastingGeoKey",
        Doubles,
        None,
        None,
    ),
    info(
        GeoKey::ProjFalseOriginNorthingGeoKey,
        "ProjFalseOriginNorthingGeoKey",
        Doubles,
        None,
        None,
    ),
    info(GeoKey::ProjCenterLongGeoKey, "ProjCenterLongGeoKey", Doubles, None, None),
    info(GeoKey::ProjCenterLatGeoKey, "ProjCenterLatGeoKey", Doubles, None, None),
    info(GeoKey::ProjCenterEastingGeoKey, "ProjCenterEastingGeoKey", Doubles, None, None),
    info(GeoKey::ProjCenterNorthingGeoKey, "ProjCenterNorthingGeoKey", Doubles, None, None),
    info(GeoKey::ProjScaleAtNatOriginGeoKey, "ProjScaleAtNatOriginGeoKey", Doubles, None, None),
    info(GeoKey::ProjScaleAtCenterGeoKey, "ProjScaleAtCenterGeoKey", Doubles, None, None),
    info(GeoKey::ProjAzimuthAngleGeoKey, "ProjAzimuthAngleGeoKey", Doubles, None, None),
    info(
        GeoKey::ProjStraightVertPoleLongGeoKey,
        "ProjStraightVertPoleLongGeoKey",
        Doubles,
        None,
        None,
    ),
    info(GeoKey::VerticalCSTypeGeoKey, "VerticalCSTypeGeoKey", Inline, None, None),
    info(GeoKey::VerticalCitationGeoKey, "VerticalCitationGeoKey", Ascii, None, None),
    info(GeoKey::VerticalDatumGeoKey, "VerticalDatumGeoKey", Inline, None, None),
    info(GeoKey::VerticalUnitsGeoKey, "VerticalUnitsGeoKey", Inline, None, None),
];

const MODEL_TYPES: &[(u16, &str)] = &[
    (1, "ModelTypeProjected"),
    (2, "ModelTypeGeographic"),
    (3, "ModelTypeGeocentric"),
    (32767, "user-defined"),
];

const RASTER_TYPES: &[(u16, &str)] = &[
    (1, "RasterPixelIsArea"),
    (2, "RasterPixelIsPoint"),
    (32767, "user-defined"),
];

const LINEAR_UNITS: &[(u16, &str)] = &[
    (9001, "Linear_Meter"),
    (9002, "Linear_Foot"),
    (9003, "Linear_Foot_US_Survey"),
    (9004, "Linear_Foot_Modified_American"),
    (9005, "Linear_Foot_Clarke"),
    (9006, "Linear_Foot_Indian"),
    (9007, "Linear_Link"),
    (9008, "Linear_Link_Benoit"),
    (9009, "Linear_Link_Sears"),
    (9010, "Linear_Chain_Benoit"),
    (9011, "Linear_Chain_Sears"),
    (9012, "Linear_Yard_Sears"),
    (9013, "Linear_Yard_Indian"),
    (9014, "Linear_Fathom"),
    (9015, "Linear_Mile_International_Nautical"),
    (32767, "user-defined"),
];

const ANGULAR_UNITS: &[(u16, &str)] = &[
    (9101, "Angular_Radian"),
    (9102, "Angular_Degree"),
    (9103, "Angular_Arc_Minute"),
    (9104, "Angular_Arc_Second"),
    (9105, "Angular_Grad"),
    (9106, "Angular_Gon"),
    (9107, "Angular_DMS"),
    (9108, "Angular_DMS_Hemisphere"),
    (32767, "user-defined"),
];

const COORD_TRANSFORMS: &[(u16, &str)] = &[
    (1, "CT_TransverseMercator"),
    (2, "CT_TransvMercator_Modified_Alaska"),
    (3, "CT_ObliqueMercator"),
    (4, "CT_ObliqueMercator_Laborde"),
    (5, "CT_ObliqueMercator_Rosenmund"),
    (6, "CT_ObliqueMercator_Spherical"),
    (7, "CT_Mercator"),
    (8, "CT_LambertConfConic_2SP"),
    (9, "CT_LambertConfConic_Helmert"),
    (10, "CT_LambertAzimEqualArea"),
    (11, "CT_AlbersEqualArea"),
    (12, "CT_AzimuthalEquidistant"),
    (13, "CT_EquidistantConic"),
    (14, "CT_Stereographic"),
    (15, "CT_PolarStereographic"),
    (16, "CT_ObliqueStereographic"),
    (17, "CT_Equirectangular"),
    (18, "CT_CassiniSoldner"),
    (19, "CT_Gnomonic"),
    (20, "CT_MillerCylindrical"),
    (21, "CT_Orthographic"),
    (22, "CT_Polyconic"),
    (23, "CT_Robinson"),
    (24, "CT_Sinusoidal"),
    (25, "CT_VanDerGrinten"),
    (26, "CT_NewZealandMapGrid"),
    (27, "CT_TransvMercator_SouthOriented"),
    (32767, "user-defined"),
];

impl GeoKey {
    pub fn info(self) -> Option<&'static GeoKeyInfo> {
        KEYS.iter().find(|info| info.key == self)
    }

    pub fn by_name(name: &str) -> Option<GeoKey> {
        KEYS.iter().find(|info| info.name == name).map(|info| info.key)
    }

    pub fn name(self) -> Option<&'static str> {
        self.info().map(|info| info.name)
    }

    /// Where values of this key are stored. Unknown keys are stored inline.
    pub fn location(self) -> GeoKeyLocation {
        self.info().map_or(GeoKeyLocation::Inline, |info| info.location)
    }

    /// The legal codes of an enumerated key and their meanings.
    pub fn meanings(self) -> Option<&'static [(u16, &'static str)]> {
        match self {
            GeoKey::GTModelTypeGeoKey => Some(MODEL_TYPES),
            GeoKey::GTRasterTypeGeoKey => Some(RASTER_TYPES),
            GeoKey::GeogLinearUnitsGeoKey
            | GeoKey::ProjLinearUnitsGeoKey
            | GeoKey::VerticalUnitsGeoKey => Some(LINEAR_UNITS),
            GeoKey::GeogAngularUnitsGeoKey | GeoKey::GeogAzimuthUnitsGeoKey => {
                Some(ANGULAR_UNITS)
            }
            GeoKey::ProjCoordTransGeoKey => Some(COORD_TRANSFORMS),
            _ => None,
        }
    }

    pub fn meaning(self, code: u16) -> Option<&'static str> {
        self.meanings()?
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, meaning)| *meaning)
    }
}

impl std::fmt::Display for GeoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "GeoKey {}", self.to_u16()),
        }
    }
}
