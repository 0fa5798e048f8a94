//! Conversion between logical values and the byte representation of IFD entries.
//!
//! Every entry type has a generic rule. A few tags override it with richer semantics, see
//! [`Codec::for_tag`].

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{EncodingError, TiffError, TiffResult};
use crate::ifd::Value;
use crate::rational::{self, MAX_DENOMINATOR};
use crate::tags::{ByteOrder, TagFamily, Type};

use crate::ifd::Value::{
    Ascii, Bool, Byte, Date, DateTime, Double, Float, List, Rational, SRational, Short, Signed,
    SignedByte, SignedShort, Time, Undefined, Unsigned,
};

pub(crate) const DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y:%m:%d";

/// Tolerance for carrying seconds into minutes and minutes into degrees.
const SEXAGESIMAL_EPSILON: f64 = 1e-6;

const ASCII_CHARSET: &[u8; 8] = b"ASCII\0\0\0";
const UNICODE_CHARSET: &[u8; 8] = b"UNICODE\0";

#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i128),
    Real(f64),
}

/// Numeric view of a scalar, rationals are divided out.
pub(crate) fn real(value: &Value) -> Option<f64> {
    number(value).ok().map(as_real)
}

fn number(value: &Value) -> TiffResult<Number> {
    Ok(match *value {
        Byte(v) => Number::Int(v.into()),
        Short(v) => Number::Int(v.into()),
        Unsigned(v) => Number::Int(v.into()),
        SignedByte(v) => Number::Int(v.into()),
        SignedShort(v) => Number::Int(v.into()),
        Signed(v) => Number::Int(v.into()),
        Float(v) => Number::Real(v.into()),
        Double(v) => Number::Real(v),
        Rational(n, d) => Number::Real(f64::from(n) / f64::from(d.max(1))),
        SRational(n, d) => Number::Real(f64::from(n) / f64::from(if d == 0 { 1 } else { d })),
        Bool(b) => Number::Int(b.into()),
        Ascii(ref text) => {
            let text = text.trim().trim_end_matches('\0');
            if let Ok(i) = text.parse::<i128>() {
                Number::Int(i)
            } else if let Ok(r) = text.parse::<f64>() {
                Number::Real(r)
            } else {
                return Err(EncodingError::InvalidNumber(text.to_owned()).into());
            }
        }
        ref other => {
            return Err(
                EncodingError::IncompatibleValue(Type::DOUBLE, other.to_string()).into(),
            )
        }
    })
}

fn clamp_int(n: Number, min: i128, max: i128) -> i128 {
    match n {
        Number::Int(i) => i.clamp(min, max),
        // Truncate towards zero, `as` saturates and maps NaN to zero.
        Number::Real(r) => (r.trunc() as i128).clamp(min, max),
    }
}

fn as_real(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Real(r) => r,
    }
}

/// Writes elements in a fixed byte order.
struct Sink {
    bytes: Vec<u8>,
    byte_order: ByteOrder,
}

macro_rules! put_fn {
    ($name:ident, $type:ty, $write:ident) => {
        fn $name(&mut self, n: $type) {
            let mut buf = [0u8; std::mem::size_of::<$type>()];
            match self.byte_order {
                ByteOrder::LittleEndian => LittleEndian::$write(&mut buf, n),
                ByteOrder::BigEndian => BigEndian::$write(&mut buf, n),
            }
            self.bytes.extend_from_slice(&buf);
        }
    };
}

impl Sink {
    fn new(byte_order: ByteOrder) -> Self {
        Sink {
            bytes: Vec::new(),
            byte_order,
        }
    }

    put_fn!(put_u16, u16, write_u16);
    put_fn!(put_i16, i16, write_i16);
    put_fn!(put_u32, u32, write_u32);
    put_fn!(put_i32, i32, write_i32);
    put_fn!(put_f32, f32, write_f32);
    put_fn!(put_f64, f64, write_f64);
}

/// Reads elements in a fixed byte order.
struct Source<'a> {
    bytes: &'a [u8],
    byte_order: ByteOrder,
}

macro_rules! get_fn {
    ($name:ident, $type:ty, $read:ident) => {
        fn $name(&self, chunk: &[u8]) -> $type {
            match self.byte_order {
                ByteOrder::LittleEndian => LittleEndian::$read(chunk),
                ByteOrder::BigEndian => BigEndian::$read(chunk),
            }
        }
    };
}

impl Source<'_> {
    get_fn!(get_u16, u16, read_u16);
    get_fn!(get_i16, i16, read_i16);
    get_fn!(get_u32, u32, read_u32);
    get_fn!(get_i32, i32, read_i32);
    get_fn!(get_f32, f32, read_f32);
    get_fn!(get_f64, f64, read_f64);

    fn chunks<T>(&self, width: usize, f: impl Fn(&Self, &[u8]) -> T) -> Vec<T> {
        self.bytes.chunks_exact(width).map(|c| f(self, c)).collect()
    }
}

/// Tag specific replacement of the generic type rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Generic,
    /// `YYYY:MM:DD HH:MM:SS` text.
    DateTime,
    /// `YYYY:MM:DD` text.
    Date,
    /// Hours, minutes and seconds as three rationals.
    Time,
    /// Degrees, minutes and seconds as three rationals.
    GpsAngle,
    /// One letter for the positive and one for the negative hemisphere.
    GpsRef { positive: u8, negative: u8 },
    /// A single byte interpreted as boolean.
    Flag,
    /// UTF-16LE text stored as bytes (Windows `XP*` tags).
    WindowsString,
    /// Text prefixed with an 8 byte character code.
    CharsetText,
}

impl Codec {
    /// The dispatch table of tag overrides.
    pub fn for_tag(family: TagFamily, tag: u16) -> Codec {
        match (family, tag) {
            (TagFamily::Tiff, 306) | (TagFamily::Exif, 36867 | 36868) => Codec::DateTime,
            (TagFamily::Tiff, 40091..=40095) => Codec::WindowsString,
            (TagFamily::Exif, 37510) | (TagFamily::Gps, 27 | 28) => Codec::CharsetText,
            (TagFamily::Gps, 1 | 19) => Codec::GpsRef {
                positive: b'N',
                negative: b'S',
            },
            (TagFamily::Gps, 3 | 21) => Codec::GpsRef {
                positive: b'E',
                negative: b'W',
            },
            (TagFamily::Gps, 2 | 4 | 20 | 22) => Codec::GpsAngle,
            (TagFamily::Gps, 5) => Codec::Flag,
            (TagFamily::Gps, 7) => Codec::Time,
            (TagFamily::Gps, 29) => Codec::Date,
            _ => Codec::Generic,
        }
    }

    /// The entry type this codec applies to. Entries of other types use the generic rules.
    fn applies_to(self, ty: Type) -> bool {
        match self {
            Codec::Generic => true,
            Codec::DateTime | Codec::Date | Codec::GpsRef { .. } => ty == Type::ASCII,
            Codec::Time | Codec::GpsAngle => ty == Type::RATIONAL,
            Codec::Flag | Codec::WindowsString => ty == Type::BYTE,
            Codec::CharsetText => ty == Type::UNDEFINED,
        }
    }

    /// Encode a logical value into `(count, bytes)` for an entry of type `ty`.
    pub fn encode(self, ty: Type, value: &Value, bo: ByteOrder) -> TiffResult<(u32, Vec<u8>)> {
        if !self.applies_to(ty) {
            return encode_generic(ty, value, bo);
        }

        match (self, value) {
            (Codec::DateTime, DateTime(dt)) => Ok(ascii(&dt.format(DATE_TIME_FORMAT).to_string())),
            (Codec::DateTime, Ascii(text)) => {
                let text = text.trim_end_matches('\0');
                let dt = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
                    .map_err(|_| EncodingError::InvalidDateTime(text.to_owned()))?;
                Ok(ascii(&dt.format(DATE_TIME_FORMAT).to_string()))
            }
            (Codec::Date, Date(d)) => Ok(ascii(&d.format(DATE_FORMAT).to_string())),
            (Codec::Date, DateTime(dt)) => Ok(ascii(&dt.date().format(DATE_FORMAT).to_string())),
            (Codec::Date, Ascii(text)) => {
                let text = text.trim_end_matches('\0');
                let d = NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .map_err(|_| EncodingError::InvalidDateTime(text.to_owned()))?;
                Ok(ascii(&d.format(DATE_FORMAT).to_string()))
            }
            (Codec::DateTime | Codec::Date, other) => Err(EncodingError::IncompatibleValue(
                ty,
                other.to_string(),
            )
            .into()),
            (Codec::Time, Time(t)) => {
                let seconds = f64::from(t.second()) + f64::from(t.nanosecond()) / 1e9;
                let hms = [f64::from(t.hour()), f64::from(t.minute()), seconds];
                Ok(encode_reals_unsigned(&hms, bo))
            }
            (Codec::Time, Ascii(text)) => {
                let t = NaiveTime::parse_from_str(text.trim_end_matches('\0'), "%H:%M:%S%.f")
                    .map_err(|_| EncodingError::InvalidDateTime(text.clone()))?;
                Codec::Time.encode(ty, &Time(t), bo)
            }
            (Codec::GpsAngle, List(_)) => encode_generic(ty, value, bo),
            (Codec::GpsAngle, scalar) => {
                let degrees = as_real(number(scalar)?);
                Ok(encode_reals_unsigned(&degrees_to_dms(degrees), bo))
            }
            (Codec::GpsRef { positive, negative }, Bool(b)) => {
                let letter = if *b { positive } else { negative };
                Ok((2, vec![letter, 0]))
            }
            (Codec::Flag, Bool(b)) => Ok((1, vec![u8::from(*b)])),
            (Codec::WindowsString, Ascii(text)) => {
                let mut bytes = Vec::with_capacity(2 * text.len() + 2);
                for unit in text.encode_utf16().chain(std::iter::once(0)) {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                Ok((bytes.len() as u32, bytes))
            }
            (Codec::CharsetText, Ascii(text)) => {
                let mut sink = Sink::new(bo);
                if text.is_ascii() {
                    sink.bytes.extend_from_slice(ASCII_CHARSET);
                    sink.bytes.extend_from_slice(text.as_bytes());
                } else {
                    sink.bytes.extend_from_slice(UNICODE_CHARSET);
                    for unit in text.encode_utf16() {
                        sink.put_u16(unit);
                    }
                }
                Ok((sink.bytes.len() as u32, sink.bytes))
            }
            _ => encode_generic(ty, value, bo),
        }
    }

    /// Decode the bytes of an entry. Overrides fall back to the generic value when the stored
    /// data does not have the expected shape.
    pub fn decode(self, ty: Type, count: u32, bytes: &[u8], bo: ByteOrder) -> Value {
        let generic = decode_generic(ty, count, bytes, bo);
        if !self.applies_to(ty) {
            return generic;
        }

        let decoded = match (self, &generic) {
            (Codec::DateTime, Ascii(text)) => {
                NaiveDateTime::parse_from_str(text.trim_end_matches('\0'), DATE_TIME_FORMAT)
                    .ok()
                    .map(DateTime)
            }
            (Codec::Date, Ascii(text)) => {
                NaiveDate::parse_from_str(text.trim_end_matches('\0'), DATE_FORMAT)
                    .ok()
                    .map(Date)
            }
            (Codec::Time, List(values)) => match three_reals(values) {
                Some([h, m, s]) => {
                    let s = s.max(0.0);
                    let whole = s.trunc();
                    let nanos = ((s - whole) * 1e9).round() as u32;
                    NaiveTime::from_hms_nano_opt(h as u32, m as u32, whole as u32, nanos)
                        .map(Time)
                }
                None => None,
            },
            (Codec::GpsAngle, List(values)) => {
                three_reals(values).map(|[d, m, s]| Double(d + (m + s / 60.0) / 60.0))
            }
            (Codec::GpsRef { positive, negative }, Ascii(text)) => {
                match text.trim_end_matches('\0').as_bytes() {
                    [l] if *l == positive => Some(Bool(true)),
                    [l] if *l == negative => Some(Bool(false)),
                    _ => None,
                }
            }
            (Codec::Flag, Byte(b)) => Some(Bool(*b != 0)),
            (Codec::WindowsString, _) => {
                let units = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]));
                let text: String = char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .filter(|c| *c != '\0')
                    .collect();
                Some(Ascii(text))
            }
            (Codec::CharsetText, _) if bytes.len() >= 8 => {
                let (charset, text) = bytes.split_at(8);
                if charset == UNICODE_CHARSET {
                    let source = Source {
                        bytes: text,
                        byte_order: bo,
                    };
                    let units = source.chunks(2, Source::get_u16);
                    Some(Ascii(
                        char::decode_utf16(units)
                            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                            .filter(|c| *c != '\0')
                            .collect(),
                    ))
                } else {
                    Some(Ascii(
                        String::from_utf8_lossy(text)
                            .trim_end_matches('\0')
                            .to_owned(),
                    ))
                }
            }
            _ => None,
        };

        match decoded {
            Some(value) => value,
            None => {
                log::debug!("{self:?} does not apply to stored value {generic}, kept as is");
                generic
            }
        }
    }
}

/// Encode `value` as the bytes of an entry `tag` of `family`, stored as `ty`.
pub fn encode(
    ty: Type,
    value: &Value,
    family: TagFamily,
    tag: u16,
    byte_order: ByteOrder,
) -> TiffResult<(u32, Vec<u8>)> {
    let (count, bytes) = Codec::for_tag(family, tag).encode(ty, value, byte_order)?;
    log::trace!("encoded {family} {tag} as {count} x {ty:?}");
    Ok((count, bytes))
}

/// Decode the stored bytes of an entry `tag` of `family`.
pub fn decode(
    ty: Type,
    count: u32,
    bytes: &[u8],
    byte_order: ByteOrder,
    family: TagFamily,
    tag: u16,
) -> Value {
    Codec::for_tag(family, tag).decode(ty, count, bytes, byte_order)
}

fn three_reals(values: &[Value]) -> Option<[f64; 3]> {
    match values {
        [a, b, c] => Some([a.as_f64()?, b.as_f64()?, c.as_f64()?]),
        _ => None,
    }
}

fn ascii(text: &str) -> (u32, Vec<u8>) {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    (bytes.len() as u32, bytes)
}

/// Split an angle into degrees, minutes and seconds, carrying rounded up units.
pub(crate) fn degrees_to_dms(value: f64) -> [f64; 3] {
    let value = value.abs();
    let mut degrees = value.trunc();
    let minutes = (value - degrees) * 60.0;
    let mut whole_minutes = minutes.trunc();
    let mut seconds = (minutes - whole_minutes) * 60.0;

    if seconds >= 60.0 - SEXAGESIMAL_EPSILON {
        seconds = 0.0;
        whole_minutes += 1.0;
    }
    if whole_minutes >= 60.0 - SEXAGESIMAL_EPSILON {
        whole_minutes = 0.0;
        degrees += 1.0;
    }

    [degrees, whole_minutes, seconds]
}

fn encode_reals_unsigned(values: &[f64], bo: ByteOrder) -> (u32, Vec<u8>) {
    let mut sink = Sink::new(bo);
    for &v in values {
        let (n, d) = unsigned_fraction(v);
        sink.put_u32(n);
        sink.put_u32(d);
    }
    (values.len() as u32, sink.bytes)
}

fn unsigned_fraction(v: f64) -> (u32, u32) {
    if !(v > 0.0) {
        return (0, 1);
    }
    if v >= f64::from(u32::MAX) {
        return (u32::MAX, 1);
    }
    let max_den = (f64::from(u32::MAX) / v.max(1.0)).min(f64::from(MAX_DENOMINATOR)) as u32;
    let (n, d) = rational::approximate(v, max_den.max(1));
    (n.clamp(0, i64::from(u32::MAX)) as u32, d)
}

fn signed_fraction(v: f64) -> (i32, i32) {
    if !v.is_finite() {
        return (0, 1);
    }
    let limit = f64::from(i32::MAX);
    if v.abs() >= limit {
        return (if v > 0.0 { i32::MAX } else { i32::MIN + 1 }, 1);
    }
    let max_den = (limit / v.abs().max(1.0)).min(f64::from(MAX_DENOMINATOR)) as u32;
    let (n, d) = rational::approximate(v, max_den.max(1));
    let n = n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    // `d` is bounded by `MAX_DENOMINATOR`.
    (n, d as i32)
}

fn encode_generic(ty: Type, value: &Value, bo: ByteOrder) -> TiffResult<(u32, Vec<u8>)> {
    let incompatible = || -> TiffError {
        EncodingError::IncompatibleValue(ty, value.to_string()).into()
    };

    match (ty, value) {
        (Type::ASCII, Ascii(text)) => {
            let mut bytes = text.as_bytes().to_vec();
            if bytes.last() != Some(&0) {
                bytes.push(0);
            }
            return Ok((bytes.len() as u32, bytes));
        }
        (Type::ASCII, Undefined(raw)) => {
            let mut bytes = raw.clone();
            if bytes.last() != Some(&0) {
                bytes.push(0);
            }
            return Ok((bytes.len() as u32, bytes));
        }
        (Type::ASCII, DateTime(dt)) => return Ok(ascii(&dt.format(DATE_TIME_FORMAT).to_string())),
        (Type::ASCII, Date(d)) => return Ok(ascii(&d.format(DATE_FORMAT).to_string())),
        (Type::ASCII, _) => return Err(incompatible()),
        (Type::UNDEFINED | Type::BYTE | Type::SBYTE, Undefined(raw)) => {
            return Ok((raw.len() as u32, raw.clone()))
        }
        (Type::UNDEFINED, Ascii(text)) => {
            return Ok((text.len() as u32, text.as_bytes().to_vec()))
        }
        _ => {}
    }

    let elements = value.elements();
    let mut sink = Sink::new(bo);

    if ty.is_rational() {
        let numbers = elements.iter().map(number).collect::<TiffResult<Vec<_>>>()?;
        let all_integers = numbers.iter().all(|n| matches!(n, Number::Int(_)));

        if all_integers && !elements.iter().any(|e| matches!(e, Rational(..) | SRational(..))) {
            // A flat list of numerators and denominators.
            let mut ints: Vec<i128> = numbers
                .iter()
                .map(|n| match *n {
                    Number::Int(i) => i,
                    Number::Real(_) => 0,
                })
                .collect();
            if ints.len() % 2 == 1 {
                ints.push(1);
            }
            for i in ints {
                if ty == Type::RATIONAL {
                    sink.put_u32(i.clamp(0, u32::MAX.into()) as u32);
                } else {
                    sink.put_i32(i.clamp(i32::MIN.into(), i32::MAX.into()) as i32);
                }
            }
            let count = sink.bytes.len() / 8;
            return Ok((count as u32, sink.bytes));
        }

        for (element, n) in elements.iter().zip(numbers) {
            match (ty, element) {
                (Type::RATIONAL, Rational(num, den)) => {
                    sink.put_u32(*num);
                    sink.put_u32(*den);
                }
                (Type::SRATIONAL, SRational(num, den)) => {
                    sink.put_i32(*num);
                    sink.put_i32(*den);
                }
                (Type::RATIONAL, _) => {
                    let (num, den) = unsigned_fraction(as_real(n));
                    sink.put_u32(num);
                    sink.put_u32(den);
                }
                _ => {
                    let (num, den) = signed_fraction(as_real(n));
                    sink.put_i32(num);
                    sink.put_i32(den);
                }
            }
        }
        return Ok((elements.len() as u32, sink.bytes));
    }

    for element in elements {
        let n = number(element)?;
        match ty {
            Type::BYTE | Type::UNDEFINED => sink.bytes.push(clamp_int(n, 0, 0xff) as u8),
            Type::SBYTE => sink
                .bytes
                .push(clamp_int(n, i8::MIN.into(), i8::MAX.into()) as i8 as u8),
            Type::SHORT => sink.put_u16(clamp_int(n, 0, u16::MAX.into()) as u16),
            Type::SSHORT => sink.put_i16(clamp_int(n, i16::MIN.into(), i16::MAX.into()) as i16),
            Type::LONG => sink.put_u32(clamp_int(n, 0, u32::MAX.into()) as u32),
            Type::SLONG => sink.put_i32(clamp_int(n, i32::MIN.into(), i32::MAX.into()) as i32),
            Type::FLOAT => sink.put_f32(as_real(n) as f32),
            Type::DOUBLE => sink.put_f64(as_real(n)),
            Type::ASCII | Type::RATIONAL | Type::SRATIONAL => return Err(incompatible()),
        }
    }

    Ok((elements.len() as u32, sink.bytes))
}

fn decode_generic(ty: Type, count: u32, bytes: &[u8], bo: ByteOrder) -> Value {
    let source = Source {
        bytes,
        byte_order: bo,
    };

    let values: Vec<Value> = match ty {
        Type::ASCII => {
            let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
            return Ascii(String::from_utf8_lossy(text).into_owned());
        }
        Type::UNDEFINED => return Undefined(bytes.to_vec()),
        Type::BYTE => bytes.iter().copied().map(Byte).collect(),
        Type::SBYTE => bytes.iter().map(|b| SignedByte(*b as i8)).collect(),
        Type::SHORT => source.chunks(2, |s, c| Short(s.get_u16(c))),
        Type::SSHORT => source.chunks(2, |s, c| SignedShort(s.get_i16(c))),
        Type::LONG => source.chunks(4, |s, c| Unsigned(s.get_u32(c))),
        Type::SLONG => source.chunks(4, |s, c| Signed(s.get_i32(c))),
        Type::FLOAT => source.chunks(4, |s, c| Float(s.get_f32(c))),
        Type::DOUBLE => source.chunks(8, |s, c| Double(s.get_f64(c))),
        Type::RATIONAL => source.chunks(8, |s, c| Rational(s.get_u32(&c[..4]), s.get_u32(&c[4..]))),
        Type::SRATIONAL => {
            source.chunks(8, |s, c| SRational(s.get_i32(&c[..4]), s.get_i32(&c[4..])))
        }
    };

    if values.len() != count as usize {
        log::debug!("{} elements of {ty:?} present, {count} declared", values.len());
    }

    if values.len() == 1 {
        values.into_iter().next().unwrap_or(List(Vec::new()))
    } else {
        List(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LE: ByteOrder = ByteOrder::LittleEndian;
    const BE: ByteOrder = ByteOrder::BigEndian;

    fn roundtrip(codec: Codec, ty: Type, value: Value) -> Value {
        let (count, bytes) = codec.encode(ty, &value, BE).unwrap();
        codec.decode(ty, count, &bytes, BE)
    }

    #[test]
    fn integers_clamp() {
        let (count, bytes) = Codec::Generic.encode(Type::BYTE, &Signed(300), LE).unwrap();
        assert_eq!((count, bytes), (1, vec![0xff]));

        let (_, bytes) = Codec::Generic.encode(Type::SHORT, &Signed(-5), LE).unwrap();
        assert_eq!(bytes, vec![0, 0]);

        let (_, bytes) = Codec::Generic.encode(Type::SSHORT, &Double(1e9), BE).unwrap();
        assert_eq!(bytes, vec![0x7f, 0xff]);

        let (_, bytes) = Codec::Generic.encode(Type::SBYTE, &Signed(-1000), LE).unwrap();
        assert_eq!(bytes, vec![0x80]);
    }

    #[test]
    fn numeric_text() {
        let (_, bytes) = Codec::Generic
            .encode(Type::LONG, &Ascii("1024".into()), BE)
            .unwrap();
        assert_eq!(bytes, vec![0, 0, 4, 0]);

        let err = Codec::Generic
            .encode(Type::LONG, &Ascii("wide".into()), BE)
            .unwrap_err();
        assert!(matches!(
            err,
            TiffError::EncodingError(EncodingError::InvalidNumber(_))
        ));
    }

    #[test]
    fn ascii_terminator() {
        let (count, bytes) = Codec::Generic
            .encode(Type::ASCII, &Ascii("abc".into()), LE)
            .unwrap();
        assert_eq!((count, bytes.as_slice()), (4, &b"abc\0"[..]));

        let (count, _) = Codec::Generic
            .encode(Type::ASCII, &Ascii("abc\0".into()), LE)
            .unwrap();
        assert_eq!(count, 4);

        assert_eq!(
            Codec::Generic.decode(Type::ASCII, 5, b"abc\0\0", LE),
            Ascii("abc\0".into())
        );
    }

    #[test]
    fn rational_from_real() {
        let value = roundtrip(Codec::Generic, Type::RATIONAL, Double(0.75));
        assert_eq!(value, Rational(3, 4));

        let value = roundtrip(Codec::Generic, Type::SRATIONAL, Double(-2.5));
        assert_eq!(value, SRational(-5, 2));
    }

    #[test]
    fn rational_flat_pairs_are_padded() {
        let list = List(vec![Unsigned(1), Unsigned(2), Unsigned(3)]);
        let value = roundtrip(Codec::Generic, Type::RATIONAL, list);
        assert_eq!(value, List(vec![Rational(1, 2), Rational(3, 1)]));

        assert_eq!(
            roundtrip(Codec::Generic, Type::RATIONAL, Unsigned(72)),
            Rational(72, 1)
        );
    }

    #[test]
    fn rational_precision() {
        let x = 52.370216;
        let value = roundtrip(Codec::Generic, Type::RATIONAL, Double(x));
        let back = value.as_f64().unwrap();
        assert!(((back - x) / x).abs() <= 1e-7);
    }

    #[test]
    fn date_time() {
        let value = roundtrip(
            Codec::DateTime,
            Type::ASCII,
            Ascii("2015:03:17 09:43:17".into()),
        );
        let expected = NaiveDate::from_ymd_opt(2015, 3, 17)
            .and_then(|d| d.and_hms_opt(9, 43, 17))
            .unwrap();
        assert_eq!(value, DateTime(expected));

        let err = Codec::DateTime
            .encode(Type::ASCII, &Ascii("17/03/2015".into()), LE)
            .unwrap_err();
        assert!(matches!(
            err,
            TiffError::EncodingError(EncodingError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn date_time_decoding_is_lenient() {
        let value = Codec::DateTime.decode(Type::ASCII, 20, b"    :  :     :  :  \0", LE);
        assert_eq!(value, Ascii("    :  :     :  :  ".into()));
    }

    #[test]
    fn gps_angle() {
        for x in [52.370216, 4.899431, 0.0, 89.5] {
            let back = roundtrip(Codec::GpsAngle, Type::RATIONAL, Double(x))
                .as_f64()
                .unwrap();
            assert!((back - x).abs() < 1e-4, "{x} came back as {back}");
        }
    }

    #[test]
    fn gps_angle_carry() {
        let dms = degrees_to_dms(52.999_999_999_9);
        assert_eq!(dms, [53.0, 0.0, 0.0]);

        let back = roundtrip(Codec::GpsAngle, Type::RATIONAL, Double(52.999999999))
            .as_f64()
            .unwrap();
        assert!((back - 52.999999999).abs() < 1e-4);

        let dms = degrees_to_dms(10.0 + 59.0 / 60.0 + 59.999_999_9 / 3600.0);
        assert_eq!(dms, [11.0, 0.0, 0.0]);
    }

    #[test]
    fn gps_reference() {
        let north = Codec::GpsRef {
            positive: b'N',
            negative: b'S',
        };
        let (count, bytes) = north.encode(Type::ASCII, &Bool(false), LE).unwrap();
        assert_eq!((count, bytes), (2, b"S\0".to_vec()));
        assert_eq!(north.decode(Type::ASCII, 2, b"N\0", LE), Bool(true));
        assert_eq!(north.decode(Type::ASCII, 2, b"X\0", LE), Ascii("X".into()));
    }

    #[test]
    fn windows_strings() {
        let (count, bytes) = Codec::WindowsString
            .encode(Type::BYTE, &Ascii("Hi".into()), BE)
            .unwrap();
        assert_eq!(count, 6);
        assert_eq!(bytes, vec![b'H', 0, b'i', 0, 0, 0]);
        assert_eq!(
            Codec::WindowsString.decode(Type::BYTE, count, &bytes, BE),
            Ascii("Hi".into())
        );
    }

    #[test]
    fn user_comment() {
        let value = roundtrip(Codec::CharsetText, Type::UNDEFINED, Ascii("hello".into()));
        assert_eq!(value, Ascii("hello".into()));

        let value = roundtrip(Codec::CharsetText, Type::UNDEFINED, Ascii("héllo".into()));
        assert_eq!(value, Ascii("héllo".into()));

        let (count, bytes) = Codec::CharsetText
            .encode(Type::UNDEFINED, &Ascii("x".into()), LE)
            .unwrap();
        assert_eq!(count, 9);
        assert_eq!(&bytes[..8], ASCII_CHARSET);
    }

    #[test]
    fn gps_time_stamp() {
        let t = NaiveTime::from_hms_opt(14, 5, 30).unwrap();
        assert_eq!(roundtrip(Codec::Time, Type::RATIONAL, Time(t)), Time(t));
    }

    #[test]
    fn undefined_passthrough() {
        let raw = vec![0, 2, 3, 0];
        assert_eq!(
            roundtrip(Codec::Generic, Type::UNDEFINED, Undefined(raw.clone())),
            Undefined(raw)
        );
    }

    #[test]
    fn byte_order_matters() {
        let (_, le) = Codec::Generic.encode(Type::LONG, &Unsigned(1), LE).unwrap();
        let (_, be) = Codec::Generic.encode(Type::LONG, &Unsigned(1), BE).unwrap();
        assert_eq!(le, vec![1, 0, 0, 0]);
        assert_eq!(be, vec![0, 0, 0, 1]);
        assert_eq!(Codec::Generic.decode(Type::LONG, 1, &le, LE), Unsigned(1));
    }
}
