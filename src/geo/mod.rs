//! GeoTIFF key directories.
//!
//! GeoTIFF stores its keys in three ordinary TIFF tags: a SHORT key directory
//! (`GeoKeyDirectoryTag`), an array of doubles (`GeoDoubleParamsTag`) and a `|` separated
//! ASCII blob (`GeoAsciiParamsTag`). [`GeoKeyDirectory`] packs and unpacks that layout.

use std::collections::BTreeMap;
use std::fmt;

use crate::directory::Directory;
use crate::error::{EncodingError, TiffError, TiffFormatError, TiffResult, UsageError};
use crate::tags::{Tag, Type};

mod geo_key;

pub use self::geo_key::{GeoKey, GeoKeyInfo, GeoKeyLocation};

/// The value of a GeoKey.
#[derive(Clone, Debug, PartialEq)]
pub enum GeoKeyValue {
    /// A code stored in the key entry itself.
    Short(u16),
    /// Shorts appended to the key directory.
    Shorts(Vec<u16>),
    Doubles(Vec<f64>),
    Ascii(String),
}

impl GeoKeyValue {
    pub fn as_short(&self) -> Option<u16> {
        match self {
            GeoKeyValue::Short(v) => Some(*v),
            GeoKeyValue::Shorts(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeoKeyValue::Doubles(v) if v.len() == 1 => Some(v[0]),
            other => other.as_short().map(f64::from),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeoKeyValue::Ascii(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for GeoKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoKeyValue::Short(v) => write!(f, "{v}"),
            GeoKeyValue::Shorts(v) => write!(f, "{v:?}"),
            GeoKeyValue::Doubles(v) if v.len() == 1 => write!(f, "{}", v[0]),
            GeoKeyValue::Doubles(v) => write!(f, "{v:?}"),
            GeoKeyValue::Ascii(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<u16> for GeoKeyValue {
    fn from(v: u16) -> Self {
        GeoKeyValue::Short(v)
    }
}

impl From<Vec<u16>> for GeoKeyValue {
    fn from(v: Vec<u16>) -> Self {
        GeoKeyValue::Shorts(v)
    }
}

impl From<f64> for GeoKeyValue {
    fn from(v: f64) -> Self {
        GeoKeyValue::Doubles(vec![v])
    }
}

impl From<Vec<f64>> for GeoKeyValue {
    fn from(v: Vec<f64>) -> Self {
        GeoKeyValue::Doubles(v)
    }
}

impl From<&str> for GeoKeyValue {
    fn from(v: &str) -> Self {
        GeoKeyValue::Ascii(v.to_owned())
    }
}

impl From<String> for GeoKeyValue {
    fn from(v: String) -> Self {
        GeoKeyValue::Ascii(v)
    }
}

/// The keys of a GeoTIFF key directory.
///
/// Keys are kept sorted by id, the order GeoTIFF requires for the key entries. With `strict` set
/// (the default), values of enumerated keys must be one of their legal codes or the symbolic
/// meaning of one.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoKeyDirectory {
    pub version: u16,
    pub revision: (u16, u16),
    pub strict: bool,
    keys: BTreeMap<u16, GeoKeyValue>,
}

impl Default for GeoKeyDirectory {
    fn default() -> Self {
        GeoKeyDirectory {
            version: 1,
            revision: (1, 0),
            strict: true,
            keys: BTreeMap::new(),
        }
    }
}

impl GeoKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, key: GeoKey) -> Option<&GeoKeyValue> {
        self.keys.get(&key.to_u16())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&GeoKeyValue> {
        self.get(GeoKey::by_name(name)?)
    }

    /// Like [`Self::get`] but fails with `NotFound` for absent keys.
    pub fn value(&self, key: GeoKey) -> TiffResult<&GeoKeyValue> {
        self.get(key)
            .ok_or_else(|| TiffError::NotFound(key.to_string()))
    }

    /// Meaning of the code stored for an enumerated key.
    pub fn meaning(&self, key: GeoKey) -> Option<&'static str> {
        key.meaning(self.get(key)?.as_short()?)
    }

    /// Set a key, converting the value to the location the key is stored in.
    pub fn set(&mut self, key: GeoKey, value: impl Into<GeoKeyValue>) -> TiffResult<()> {
        let value = self.normalize(key, value.into())?;
        log::trace!("GeoKey {key} = {value}");
        self.keys.insert(key.to_u16(), value);
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<GeoKeyValue>) -> TiffResult<()> {
        let key =
            GeoKey::by_name(name).ok_or_else(|| UsageError::UnknownTag(name.to_owned()))?;
        self.set(key, value)
    }

    /// Set a key to its default code.
    pub fn set_default(&mut self, key: GeoKey) -> TiffResult<()> {
        let default = key
            .info()
            .and_then(|info| info.default)
            .ok_or(UsageError::NoDefault(key.to_u16()))?;
        self.set(key, default)
    }

    pub fn remove(&mut self, key: GeoKey) -> Option<GeoKeyValue> {
        self.keys.remove(&key.to_u16())
    }

    /// Iterate over the keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (GeoKey, &GeoKeyValue)> + '_ {
        self.keys
            .iter()
            .map(|(&key, value)| (GeoKey::from_u16_exhaustive(key), value))
    }

    fn normalize(&self, key: GeoKey, value: GeoKeyValue) -> TiffResult<GeoKeyValue> {
        let incompatible =
            |ty: Type, value: &GeoKeyValue| EncodingError::IncompatibleValue(ty, value.to_string());

        match key.location() {
            GeoKeyLocation::Inline | GeoKeyLocation::Shorts => {
                let value = match value {
                    GeoKeyValue::Shorts(v) if v.len() != 1 => return Ok(GeoKeyValue::Shorts(v)),
                    GeoKeyValue::Ascii(ref text) => match key.meanings() {
                        Some(meanings) => meanings
                            .iter()
                            .find(|(_, meaning)| *meaning == text.as_str())
                            .map(|(code, _)| *code)
                            .ok_or_else(|| {
                                EncodingError::NotEnumerated(key.to_string(), text.clone())
                            })?,
                        None => return Err(incompatible(Type::SHORT, &value).into()),
                    },
                    GeoKeyValue::Doubles(ref v) => match v.as_slice() {
                        [x] if x.fract() == 0.0 && (0.0..=65535.0).contains(x) => *x as u16,
                        _ => return Err(incompatible(Type::SHORT, &value).into()),
                    },
                    other => other.as_short().unwrap_or_default(),
                };

                if self.strict && key.meanings().is_some() && key.meaning(value).is_none() {
                    return Err(
                        EncodingError::NotEnumerated(key.to_string(), value.to_string()).into(),
                    );
                }
                Ok(GeoKeyValue::Short(value))
            }
            GeoKeyLocation::Doubles => match value {
                GeoKeyValue::Short(v) => Ok(GeoKeyValue::Doubles(vec![f64::from(v)])),
                GeoKeyValue::Shorts(v) => Ok(GeoKeyValue::Doubles(
                    v.into_iter().map(f64::from).collect(),
                )),
                GeoKeyValue::Doubles(v) => Ok(GeoKeyValue::Doubles(v)),
                other => Err(incompatible(Type::DOUBLE, &other).into()),
            },
            GeoKeyLocation::Ascii => match value {
                GeoKeyValue::Ascii(text) => Ok(GeoKeyValue::Ascii(text)),
                other => Err(incompatible(Type::ASCII, &other).into()),
            },
        }
    }

    /// Reads the keys stored in the host tags of a directory.
    ///
    /// Returns `None` if there is no `GeoKeyDirectoryTag`.
    pub fn from_host_tags(dir: &Directory) -> TiffResult<Option<GeoKeyDirectory>> {
        let Some(entry) = dir.get(Tag::GeoKeyDirectoryTag) else {
            return Ok(None);
        };
        let shorts = entry.value().into_u16_vec()?;
        let doubles = match dir.get(Tag::GeoDoubleParamsTag) {
            Some(entry) => entry.value().into_f64_vec()?,
            None => Vec::new(),
        };
        let ascii = match dir.get(Tag::GeoAsciiParamsTag) {
            Some(entry) => entry.value().into_string()?,
            None => String::new(),
        };
        Self::parse(&shorts, &doubles, &ascii).map(Some)
    }

    /// Unpacks the contents of the three host tags.
    ///
    /// Keys pointing outside of their parameter arrays are skipped.
    pub fn parse(shorts: &[u16], doubles: &[f64], ascii: &str) -> TiffResult<GeoKeyDirectory> {
        let [version, major, minor, count, ref entries @ ..] = *shorts else {
            return Err(TiffFormatError::InconsistentSizesEncountered.into());
        };
        let count = usize::from(count);
        if entries.len() < count * 4 {
            return Err(TiffFormatError::InconsistentSizesEncountered.into());
        }

        let mut dir = GeoKeyDirectory {
            version,
            revision: (major, minor),
            ..GeoKeyDirectory::default()
        };

        // Each key entry is made up of SHORTS: KeyID, TIFFTagLocation, Count, Value_Offset
        for chunk in entries.chunks_exact(4).take(count) {
            let [key, location, count, offset] = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let range = usize::from(offset)..usize::from(offset) + usize::from(count);

            let value = match GeoKeyLocation::from_u16(location) {
                Some(GeoKeyLocation::Inline) => Some(GeoKeyValue::Short(offset)),
                Some(GeoKeyLocation::Shorts) => shorts
                    .get(range)
                    .map(|v| GeoKeyValue::Shorts(v.to_vec())),
                Some(GeoKeyLocation::Doubles) => doubles
                    .get(range)
                    .map(|v| GeoKeyValue::Doubles(v.to_vec())),
                Some(GeoKeyLocation::Ascii) => ascii.get(range).map(|text| {
                    GeoKeyValue::Ascii(text.strip_suffix('|').unwrap_or(text).to_owned())
                }),
                None => {
                    log::warn!("GeoKey {key} has unknown location {location}, skipped");
                    continue;
                }
            };

            match value {
                Some(value) => {
                    dir.keys.insert(key, value);
                }
                None => log::warn!("GeoKey {key} points outside of its parameters, skipped"),
            }
        }

        Ok(dir)
    }

    /// Packs the keys into the contents of the three host tags: the key directory, the double
    /// parameters and the ASCII parameters.
    ///
    /// Fails if a count or an offset does not fit the 16 bit fields of a key entry.
    pub fn compute(&self) -> TiffResult<(Vec<u16>, Vec<f64>, String)> {
        let short = |n: usize| {
            u16::try_from(n).map_err(|_| TiffError::from(EncodingError::TooManyElements(n)))
        };

        let mut shorts = vec![
            self.version,
            self.revision.0,
            self.revision.1,
            short(self.keys.len())?,
        ];
        let mut appended = Vec::new();
        let mut doubles = Vec::new();
        let mut ascii = String::new();
        let appended_base = 4 + 4 * self.keys.len();

        for (&key, value) in &self.keys {
            let (location, count, offset) = match value {
                GeoKeyValue::Short(v) => (GeoKeyLocation::Inline, 1, usize::from(*v)),
                GeoKeyValue::Shorts(v) => {
                    let offset = appended_base + appended.len();
                    appended.extend_from_slice(v);
                    (GeoKeyLocation::Shorts, v.len(), offset)
                }
                GeoKeyValue::Doubles(v) => {
                    let offset = doubles.len();
                    doubles.extend_from_slice(v);
                    (GeoKeyLocation::Doubles, v.len(), offset)
                }
                GeoKeyValue::Ascii(text) => {
                    let offset = ascii.len();
                    ascii.push_str(text);
                    ascii.push('|');
                    (GeoKeyLocation::Ascii, text.len() + 1, offset)
                }
            };
            shorts.extend([key, location.to_u16(), short(count)?, short(offset)?]);
        }

        shorts.extend(appended);
        Ok((shorts, doubles, ascii))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagFamily;

    fn sample() -> GeoKeyDirectory {
        let mut keys = GeoKeyDirectory::new();
        keys.set(GeoKey::GTModelTypeGeoKey, 2u16).unwrap();
        keys.set(GeoKey::GeogSemiMajorAxisGeoKey, 6378137.0).unwrap();
        keys.set(GeoKey::GTCitationGeoKey, "WGS 84").unwrap();
        keys.set(GeoKey::GeogCitationGeoKey, "EPSG:4326").unwrap();
        keys
    }

    #[test]
    fn compute_layout() {
        let (shorts, doubles, ascii) = sample().compute().unwrap();
        assert_eq!(&shorts[..4], &[1, 1, 0, 4]);
        assert_eq!(&shorts[4..8], &[1024, 0, 1, 2]);
        assert_eq!(&shorts[8..12], &[1026, 34737, 7, 0]);
        assert_eq!(&shorts[12..16], &[2049, 34737, 10, 7]);
        assert_eq!(&shorts[16..20], &[2057, 34736, 1, 0]);
        assert_eq!(doubles, vec![6378137.0]);
        assert_eq!(ascii, "WGS 84|EPSG:4326|");
    }

    #[test]
    fn parse_reverses_compute() {
        let keys = sample();
        let (shorts, doubles, ascii) = keys.compute().unwrap();
        let parsed = GeoKeyDirectory::parse(&shorts, &doubles, &ascii).unwrap();
        assert_eq!(parsed, keys);
        assert_eq!(parsed.meaning(GeoKey::GTModelTypeGeoKey), Some("ModelTypeGeographic"));
    }

    #[test]
    fn appended_shorts() {
        let mut keys = GeoKeyDirectory::new();
        keys.set(GeoKey::VerticalCSTypeGeoKey, vec![5703u16, 5773])
            .unwrap();
        let (shorts, _, _) = keys.compute().unwrap();
        assert_eq!(shorts, vec![1, 1, 0, 1, 4096, 34735, 2, 8, 5703, 5773]);

        let parsed = GeoKeyDirectory::parse(&shorts, &[], "").unwrap();
        assert_eq!(
            parsed.get(GeoKey::VerticalCSTypeGeoKey),
            Some(&GeoKeyValue::Shorts(vec![5703, 5773]))
        );
    }

    #[test]
    fn enumerated_keys() {
        let mut keys = GeoKeyDirectory::new();
        keys.set(GeoKey::GTRasterTypeGeoKey, "RasterPixelIsPoint")
            .unwrap();
        assert_eq!(
            keys.get(GeoKey::GTRasterTypeGeoKey),
            Some(&GeoKeyValue::Short(2))
        );

        let err = keys.set(GeoKey::GTRasterTypeGeoKey, 9u16).unwrap_err();
        assert!(matches!(
            err,
            TiffError::EncodingError(EncodingError::NotEnumerated(..))
        ));
        assert!(keys.set(GeoKey::GTRasterTypeGeoKey, "Nowhere").is_err());

        keys.strict = false;
        keys.set(GeoKey::GTRasterTypeGeoKey, 9u16).unwrap();
        assert_eq!(keys.meaning(GeoKey::GTRasterTypeGeoKey), None);
    }

    #[test]
    fn values_follow_key_location() {
        let mut keys = GeoKeyDirectory::new();
        keys.set(GeoKey::ProjFalseEastingGeoKey, 50000u16).unwrap();
        assert_eq!(
            keys.get(GeoKey::ProjFalseEastingGeoKey),
            Some(&GeoKeyValue::Doubles(vec![50000.0]))
        );
        assert!(keys.set(GeoKey::PCSCitationGeoKey, 4.0).is_err());

        keys.set_default(GeoKey::GeographicTypeGeoKey).unwrap();
        assert_eq!(
            keys.get_by_name("GeographicTypeGeoKey").and_then(GeoKeyValue::as_short),
            Some(4326)
        );
        assert!(keys.set_default(GeoKey::GTCitationGeoKey).is_err());
    }

    #[test]
    fn offsets_must_fit_key_entries() {
        let mut keys = GeoKeyDirectory::new();
        keys.set(GeoKey::GTCitationGeoKey, "x".repeat(70_000)).unwrap();
        keys.set(GeoKey::GeogCitationGeoKey, "EPSG:4326").unwrap();
        assert!(matches!(
            keys.compute(),
            Err(TiffError::EncodingError(EncodingError::TooManyElements(70_001)))
        ));

        // Every count fits, the offset of the third text does not.
        let mut keys = GeoKeyDirectory::new();
        keys.set(GeoKey::GTCitationGeoKey, "x".repeat(40_000)).unwrap();
        keys.set(GeoKey::GeogCitationGeoKey, "y".repeat(40_000)).unwrap();
        keys.set(GeoKey::PCSCitationGeoKey, "EPSG:32632").unwrap();
        assert!(matches!(
            keys.compute(),
            Err(TiffError::EncodingError(EncodingError::TooManyElements(80_002)))
        ));

        let mut dir = Directory::new(TagFamily::Tiff);
        dir.set_geo_keys(keys);
        assert!(matches!(
            crate::encoder::encode(&dir, Default::default()),
            Err(TiffError::EncodingError(EncodingError::TooManyElements(_)))
        ));
    }

    #[test]
    fn malformed_directories() {
        assert!(GeoKeyDirectory::parse(&[1, 1], &[], "").is_err());
        assert!(GeoKeyDirectory::parse(&[1, 1, 0, 2, 1024, 0, 1, 1], &[], "").is_err());

        // Pointer past the double parameters.
        let parsed = GeoKeyDirectory::parse(&[1, 1, 0, 1, 2057, 34736, 1, 3], &[1.0], "").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn host_tags() {
        let mut dir = Directory::new(TagFamily::Tiff);
        assert_eq!(GeoKeyDirectory::from_host_tags(&dir).unwrap(), None);

        let mut keys = sample();
        keys.version = 1;
        keys.revision = (1, 2);
        dir.set_geo_keys(keys.clone());
        dir.install_geo_keys().unwrap();

        assert_eq!(
            dir.value("GeoAsciiParamsTag").unwrap(),
            crate::Value::Ascii("WGS 84|EPSG:4326|".into())
        );
        let read = GeoKeyDirectory::from_host_tags(&dir).unwrap().unwrap();
        assert_eq!(read, keys);
    }
}
