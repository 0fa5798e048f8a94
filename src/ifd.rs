//! Abstractions over IFD entries and their values

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use self::Value::{
    Ascii, Bool, Byte, Date, DateTime, Double, Float, List, Rational, SRational, Short, Signed,
    SignedByte, SignedShort, Time, Undefined, Unsigned,
};
use crate::codec::{self, Codec, DATE_FORMAT, DATE_TIME_FORMAT};
use crate::error::{EncodingError, TiffError, TiffFormatError, TiffResult, UsageError};
use crate::registry::{self, TagInfo, TagRegistry};
use crate::tags::{ByteOrder, TagFamily, Type};

#[allow(unused_qualifications)]
/// The logical value of an entry.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    Byte(u8),
    Short(u16),
    Unsigned(u32),
    SignedByte(i8),
    SignedShort(i16),
    Signed(i32),
    Float(f32),
    Double(f64),
    Rational(u32, u32),
    SRational(i32, i32),
    Ascii(String),
    Undefined(Vec<u8>),
    List(Vec<Value>),
    /// GPS reference letters and flags.
    Bool(bool),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Byte(e) => write!(f, "{e}"),
            Short(e) => write!(f, "{e}"),
            Unsigned(e) => write!(f, "{e}"),
            SignedByte(e) => write!(f, "{e}"),
            SignedShort(e) => write!(f, "{e}"),
            Signed(e) => write!(f, "{e}"),
            Float(e) => write!(f, "{e}"),
            Double(e) => write!(f, "{e}"),
            Rational(n, d) => write!(f, "{n}/{d}"),
            SRational(n, d) => write!(f, "{n}/{d}"),
            Ascii(e) => write!(f, "{e:?}"),
            Undefined(e) => write!(f, "<{} bytes>", e.len()),
            List(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Bool(e) => write!(f, "{e}"),
            DateTime(e) => write!(f, "{}", e.format(DATE_TIME_FORMAT)),
            Date(e) => write!(f, "{}", e.format(DATE_FORMAT)),
            Time(e) => write!(f, "{}", e.format("%H:%M:%S%.f")),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl From<&[$ty]> for Value {
                fn from(v: &[$ty]) -> Self {
                    Value::List(v.iter().copied().map(Value::$variant).collect())
                }
            }
        )*
    };
}

value_from! {
    u16 => Short,
    u32 => Unsigned,
    i8 => SignedByte,
    i16 => SignedShort,
    i32 => Signed,
    f32 => Float,
    f64 => Double,
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Byte(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Undefined(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Undefined(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Ascii(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Ascii(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Bool(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        List(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Time(v)
    }
}

fn mismatch(expected: &'static str, found: &Value) -> TiffError {
    TiffError::FormatError(TiffFormatError::UnexpectedValue(expected, found.to_string()))
}

impl Value {
    /// The elements of a list, or the value itself as a single element.
    pub fn elements(&self) -> &[Value] {
        match self {
            List(values) => values,
            other => std::slice::from_ref(other),
        }
    }

    /// Numeric view of a scalar, rationals are divided out.
    pub fn as_f64(&self) -> Option<f64> {
        codec::real(self)
    }

    pub fn into_u16(self) -> TiffResult<u16> {
        match self {
            Byte(val) => Ok(val.into()),
            Short(val) => Ok(val),
            Unsigned(val) => u16::try_from(val).map_err(|_| mismatch("SHORT", &Unsigned(val))),
            List(ref values) if values.len() == 1 => values[0].clone().into_u16(),
            val => Err(mismatch("SHORT", &val)),
        }
    }

    pub fn into_u32(self) -> TiffResult<u32> {
        match self {
            Byte(val) => Ok(val.into()),
            Short(val) => Ok(val.into()),
            Unsigned(val) => Ok(val),
            List(ref values) if values.len() == 1 => values[0].clone().into_u32(),
            val => Err(mismatch("unsigned integer", &val)),
        }
    }

    pub fn into_u64(self) -> TiffResult<u64> {
        self.into_u32().map(u64::from)
    }

    pub fn into_f64(self) -> TiffResult<f64> {
        match self {
            Ascii(_) | Undefined(_) | DateTime(_) | Date(_) | Time(_) => {
                Err(mismatch("number", &self))
            }
            List(ref values) if values.len() == 1 => values[0].clone().into_f64(),
            List(_) => Err(mismatch("number", &self)),
            val => val.as_f64().ok_or_else(|| mismatch("number", &val)),
        }
    }

    pub fn into_string(self) -> TiffResult<String> {
        match self {
            Ascii(val) => Ok(val),
            val => Err(mismatch("ASCII", &val)),
        }
    }

    pub fn into_bool(self) -> TiffResult<bool> {
        match self {
            Bool(val) => Ok(val),
            val => Err(mismatch("flag", &val)),
        }
    }

    pub fn into_u16_vec(self) -> TiffResult<Vec<u16>> {
        self.elements().iter().cloned().map(Value::into_u16).collect()
    }

    pub fn into_u32_vec(self) -> TiffResult<Vec<u32>> {
        self.elements().iter().cloned().map(Value::into_u32).collect()
    }

    pub fn into_u64_vec(self) -> TiffResult<Vec<u64>> {
        self.elements().iter().cloned().map(Value::into_u64).collect()
    }

    pub fn into_f64_vec(self) -> TiffResult<Vec<f64>> {
        self.elements().iter().cloned().map(Value::into_f64).collect()
    }

    /// The raw bytes of an `UNDEFINED` value or a list of `BYTE`s.
    pub fn into_bytes(self) -> TiffResult<Vec<u8>> {
        match self {
            Undefined(bytes) => Ok(bytes),
            Byte(b) => Ok(vec![b]),
            List(values) => values
                .into_iter()
                .map(|v| match v {
                    Byte(b) => Ok(b),
                    other => Err(mismatch("BYTE", &other)),
                })
                .collect(),
            val => Err(mismatch("bytes", &val)),
        }
    }

    /// The type an untyped value is stored as when no tag metadata suggests one.
    pub(crate) fn natural_type(&self) -> Type {
        match self {
            Byte(_) => Type::BYTE,
            Short(_) => Type::SHORT,
            Unsigned(_) => Type::LONG,
            SignedByte(_) => Type::SBYTE,
            SignedShort(_) => Type::SSHORT,
            Signed(_) => Type::SLONG,
            Float(_) => Type::FLOAT,
            Double(_) => Type::DOUBLE,
            Rational(..) => Type::RATIONAL,
            SRational(..) => Type::SRATIONAL,
            Ascii(_) | DateTime(_) | Date(_) => Type::ASCII,
            Time(_) => Type::RATIONAL,
            Undefined(_) => Type::UNDEFINED,
            Bool(_) => Type::BYTE,
            List(values) => values.first().map_or(Type::UNDEFINED, Value::natural_type),
        }
    }
}

impl Value {
    fn as_integer(&self) -> Option<i64> {
        match *self {
            Byte(v) => Some(v.into()),
            Short(v) => Some(v.into()),
            Unsigned(v) => Some(v.into()),
            SignedByte(v) => Some(v.into()),
            SignedShort(v) => Some(v.into()),
            Signed(v) => Some(v.into()),
            _ => None,
        }
    }
}

/// A single IFD entry: tag, type and the encoded bytes of its value.
///
/// The bytes are kept exactly as they are stored, in the byte order given by
/// [`Entry::byte_order`]. The logical value is derived on access.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    tag: u16,
    family: TagFamily,
    type_: Type,
    count: u32,
    bytes: Vec<u8>,
    byte_order: ByteOrder,
}

impl Entry {
    /// Create an entry with metadata of the standard tag tables.
    ///
    /// A missing type is chosen from the types the tag accepts, a missing value is replaced by
    /// the tag's default.
    pub fn new(
        family: TagFamily,
        tag: u16,
        type_: Option<Type>,
        value: Option<Value>,
    ) -> TiffResult<Self> {
        Self::with_registry(registry::standard(), family, tag, type_, value)
    }

    pub fn with_registry(
        registry: &dyn TagRegistry,
        family: TagFamily,
        tag: u16,
        type_: Option<Type>,
        value: Option<Value>,
    ) -> TiffResult<Self> {
        let info = registry.by_id(family, tag);
        let value = match value {
            Some(value) => value,
            None => info
                .and_then(|info| info.default)
                .map(|default| default.to_value())
                .ok_or(UsageError::NoDefault(tag))?,
        };
        let type_ = type_.unwrap_or_else(|| choose_type(info, &value));

        let mut entry = Entry {
            tag,
            family,
            type_,
            count: 0,
            bytes: Vec::new(),
            byte_order: ByteOrder::native(),
        };
        entry.set_value(&value)?;
        Ok(entry)
    }

    /// An entry as found in a file.
    pub fn from_raw(
        family: TagFamily,
        tag: u16,
        type_: Type,
        count: u32,
        bytes: Vec<u8>,
        byte_order: ByteOrder,
    ) -> Self {
        Entry {
            tag,
            family,
            type_,
            count,
            bytes,
            byte_order,
        }
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }

    pub fn family(&self) -> TagFamily {
        self.family
    }

    pub fn field_type(&self) -> Type {
        self.type_
    }

    /// Number of elements, rationals count as one element.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The logical value.
    pub fn value(&self) -> Value {
        codec::decode(
            self.type_,
            self.count,
            &self.bytes,
            self.byte_order,
            self.family,
            self.tag,
        )
    }

    /// Replace the value, keeping tag and type.
    pub fn set_value(&mut self, value: &Value) -> TiffResult<()> {
        let (count, bytes) =
            codec::encode(self.type_, value, self.family, self.tag, self.byte_order)?;
        if u32::try_from(bytes.len()).is_err() {
            return Err(EncodingError::TooManyElements(bytes.len()).into());
        }
        self.count = count;
        self.bytes = bytes;
        Ok(())
    }

    /// Values of at most four bytes are stored in the entry itself.
    pub fn is_inline(&self) -> bool {
        self.bytes.len() <= 4
    }

    /// Size of the value outside of the entry table, zero when inline.
    pub fn byte_length(&self) -> usize {
        if self.is_inline() {
            0
        } else {
            self.bytes.len()
        }
    }

    /// Convert the stored bytes to another byte order.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        if byte_order == self.byte_order {
            return;
        }

        let charset = Codec::for_tag(self.family, self.tag) == Codec::CharsetText;
        if charset && self.bytes.starts_with(b"UNICODE\0") {
            self.byte_order
                .convert(Type::SHORT, &mut self.bytes[8..], byte_order);
        } else {
            self.byte_order.convert(self.type_, &mut self.bytes, byte_order);
        }
        self.byte_order = byte_order;
    }

    /// Registry metadata of this entry.
    pub fn info<'r>(&self, registry: &'r dyn TagRegistry) -> Option<&'r TagInfo> {
        registry.by_id(self.family, self.tag)
    }

    /// Meaning of an enumerated value, such as `Rotate 90 CW` for an `Orientation` of 6.
    pub fn meaning(&self, registry: &dyn TagRegistry) -> Option<&'static str> {
        let name = self.info(registry)?.name;
        let code = self.value().elements().first()?.as_integer()?;
        registry.meaning(name, u16::try_from(code).ok()?)
    }

    /// The four byte value field of an inline entry, padded with zeros.
    pub(crate) fn inline_field(&self) -> [u8; 4] {
        let mut field = [0; 4];
        let len = self.bytes.len().min(4);
        field[..len].copy_from_slice(&self.bytes[..len]);
        field
    }
}

/// The first accepted type, or the smallest accepted integer type that holds every element.
fn choose_type(info: Option<&TagInfo>, value: &Value) -> Type {
    let types = match info {
        Some(info) if !info.types.is_empty() => info.types,
        _ => return value.natural_type(),
    };
    let first = types[0];

    let integers: Option<Vec<i64>> = value.elements().iter().map(Value::as_integer).collect();
    let Some(integers) = integers.filter(|i| !i.is_empty()) else {
        return first;
    };

    let mut accepted: Vec<Type> = types.iter().copied().filter(|t| t.is_integer()).collect();
    accepted.sort_by_key(|t| t.byte_len());
    accepted
        .iter()
        .copied()
        .find(|t| integers.iter().all(|&i| fits(*t, i)))
        .or_else(|| accepted.last().copied())
        .unwrap_or(first)
}

fn fits(ty: Type, i: i64) -> bool {
    let (min, max) = match ty {
        Type::BYTE => (0, u8::MAX.into()),
        Type::SHORT => (0, u16::MAX.into()),
        Type::LONG => (0, u32::MAX.into()),
        Type::SBYTE => (i8::MIN.into(), i8::MAX.into()),
        Type::SSHORT => (i16::MIN.into(), i16::MAX.into()),
        Type::SLONG => (i32::MIN.into(), i32::MAX.into()),
        _ => return false,
    };
    (min..=max).contains(&i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::STANDARD_TAGS;

    #[test]
    fn inline_boundary() {
        let abc = Entry::new(TagFamily::Tiff, 271, None, Some("abc".into())).unwrap();
        assert_eq!(abc.field_type(), Type::ASCII);
        assert_eq!(abc.count(), 4);
        assert!(abc.is_inline());
        assert_eq!(abc.byte_length(), 0);

        let abcd = Entry::new(TagFamily::Tiff, 271, None, Some("abcd".into())).unwrap();
        assert!(!abcd.is_inline());
        assert_eq!(abcd.byte_length(), 5);

        let one = Entry::new(TagFamily::Tiff, 273, Some(Type::LONG), Some(Unsigned(8))).unwrap();
        assert!(one.is_inline());

        let two = Entry::new(
            TagFamily::Tiff,
            273,
            Some(Type::LONG),
            Some(List(vec![Unsigned(8), Unsigned(16)])),
        )
        .unwrap();
        assert!(!two.is_inline());
        assert_eq!(two.byte_length(), 8);
    }

    #[test]
    fn smallest_integer_type() {
        let narrow = Entry::new(TagFamily::Tiff, 256, None, Some(Unsigned(200))).unwrap();
        assert_eq!(narrow.field_type(), Type::SHORT);

        let wide = Entry::new(TagFamily::Tiff, 256, None, Some(Unsigned(70_000))).unwrap();
        assert_eq!(wide.field_type(), Type::LONG);
        assert_eq!(wide.value(), Unsigned(70_000));
    }

    #[test]
    fn registry_defaults() {
        let entry = Entry::new(TagFamily::Tiff, 282, None, None).unwrap();
        assert_eq!(entry.value(), Rational(72, 1));

        let err = Entry::new(TagFamily::Tiff, 271, None, None).unwrap_err();
        assert!(matches!(err, TiffError::UsageError(UsageError::NoDefault(271))));
    }

    #[test]
    fn unknown_tags_infer_type() {
        let entry = Entry::new(TagFamily::Tiff, 65000, None, Some(Double(0.5))).unwrap();
        assert_eq!(entry.field_type(), Type::DOUBLE);
        assert_eq!(entry.value(), Double(0.5));
    }

    #[test]
    fn byte_order_conversion() {
        let mut entry = Entry::from_raw(
            TagFamily::Tiff,
            256,
            Type::LONG,
            1,
            vec![1, 0, 0, 0],
            ByteOrder::LittleEndian,
        );
        entry.set_byte_order(ByteOrder::BigEndian);
        assert_eq!(entry.bytes(), &[0, 0, 0, 1]);
        assert_eq!(entry.value(), Unsigned(1));
    }

    #[test]
    fn meanings() {
        let entry = Entry::new(TagFamily::Tiff, 274, None, Some(Short(6))).unwrap();
        assert_eq!(entry.meaning(&STANDARD_TAGS), Some("Rotate 90 CW"));
        assert_eq!(entry.info(&STANDARD_TAGS).map(|i| i.name), Some("Orientation"));
    }

    #[test]
    fn value_conversions() {
        assert_eq!(List(vec![Short(1), Unsigned(2)]).into_u32_vec().unwrap(), vec![1, 2]);
        assert_eq!(Rational(1, 4).into_f64().unwrap(), 0.25);
        assert!(Ascii("x".into()).into_u32().is_err());
        assert_eq!(Value::from("x").into_string().unwrap(), "x");
    }
}
