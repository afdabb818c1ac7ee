//! Scalar value codec.
//!
//! Converts single values between their textual form, their fixed-width
//! binary form in either byte order, and the canonical storage form kept
//! in decoded row buffers ([`crate::util::Endian::STORAGE`]). Both body encodings go
//! through this module, so a decoded document holds the same bytes
//! whether it was read from ASCII, big endian or little endian input.

use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::header::token::radix_digits;
use crate::util::{Error, Result, ScalarType};

/// Byte order of row buffers; must agree with `Endian::STORAGE`.
type Storage = LittleEndian;

/// A single decoded scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
}

impl Value {
    /// Scalar type of this value.
    pub const fn ty(&self) -> ScalarType {
        match self {
            Self::Int8(_) => ScalarType::Int8,
            Self::Int16(_) => ScalarType::Int16,
            Self::Int32(_) => ScalarType::Int32,
            Self::Uint8(_) => ScalarType::Uint8,
            Self::Uint16(_) => ScalarType::Uint16,
            Self::Uint32(_) => ScalarType::Uint32,
            Self::Float32(_) => ScalarType::Float32,
            Self::Float64(_) => ScalarType::Float64,
        }
    }

    /// Widen to `f64`. Lossless for every scalar type.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int8(v) => v as f64,
            Self::Int16(v) => v as f64,
            Self::Int32(v) => v as f64,
            Self::Uint8(v) => v as f64,
            Self::Uint16(v) => v as f64,
            Self::Uint32(v) => v as f64,
            Self::Float32(v) => v as f64,
            Self::Float64(v) => v,
        }
    }

    /// Convert to `f32`, rounding wide integers and doubles.
    pub fn as_f32(&self) -> f32 {
        match *self {
            Self::Float32(v) => v,
            other => other.as_f64() as f32,
        }
    }

    /// Interpret as a list length. `None` for negative or fractional values.
    pub fn as_count(&self) -> Option<usize> {
        match *self {
            Self::Int8(v) => usize::try_from(v).ok(),
            Self::Int16(v) => usize::try_from(v).ok(),
            Self::Int32(v) => usize::try_from(v).ok(),
            Self::Uint8(v) => Some(v as usize),
            Self::Uint16(v) => Some(v as usize),
            Self::Uint32(v) => usize::try_from(v).ok(),
            Self::Float32(_) | Self::Float64(_) => None,
        }
    }

    /// Read one value of `ty` from a binary stream in byte order `B`.
    pub fn read<B: ByteOrder, R: Read + ?Sized>(reader: &mut R, ty: ScalarType) -> io::Result<Self> {
        Ok(match ty {
            ScalarType::Int8 => Self::Int8(reader.read_i8()?),
            ScalarType::Int16 => Self::Int16(reader.read_i16::<B>()?),
            ScalarType::Int32 => Self::Int32(reader.read_i32::<B>()?),
            ScalarType::Uint8 => Self::Uint8(reader.read_u8()?),
            ScalarType::Uint16 => Self::Uint16(reader.read_u16::<B>()?),
            ScalarType::Uint32 => Self::Uint32(reader.read_u32::<B>()?),
            ScalarType::Float32 => Self::Float32(reader.read_f32::<B>()?),
            ScalarType::Float64 => Self::Float64(reader.read_f64::<B>()?),
        })
    }

    /// Write this value to a binary stream in byte order `B`.
    pub fn write<B: ByteOrder, W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        match *self {
            Self::Int8(v) => writer.write_i8(v),
            Self::Int16(v) => writer.write_i16::<B>(v),
            Self::Int32(v) => writer.write_i32::<B>(v),
            Self::Uint8(v) => writer.write_u8(v),
            Self::Uint16(v) => writer.write_u16::<B>(v),
            Self::Uint32(v) => writer.write_u32::<B>(v),
            Self::Float32(v) => writer.write_f32::<B>(v),
            Self::Float64(v) => writer.write_f64::<B>(v),
        }
    }

    /// Decode a value from canonical storage bytes.
    ///
    /// Returns `None` if `bytes` is shorter than the type's width.
    pub fn from_storage(bytes: &[u8], ty: ScalarType) -> Option<Self> {
        if bytes.len() < ty.num_bytes() {
            return None;
        }
        Some(match ty {
            ScalarType::Int8 => Self::Int8(bytes[0] as i8),
            ScalarType::Int16 => Self::Int16(Storage::read_i16(bytes)),
            ScalarType::Int32 => Self::Int32(Storage::read_i32(bytes)),
            ScalarType::Uint8 => Self::Uint8(bytes[0]),
            ScalarType::Uint16 => Self::Uint16(Storage::read_u16(bytes)),
            ScalarType::Uint32 => Self::Uint32(Storage::read_u32(bytes)),
            ScalarType::Float32 => Self::Float32(Storage::read_f32(bytes)),
            ScalarType::Float64 => Self::Float64(Storage::read_f64(bytes)),
        })
    }

    /// Append the canonical storage bytes of this value.
    pub fn to_storage(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + self.ty().num_bytes(), 0);
        let dst = &mut out[start..];
        match *self {
            Self::Int8(v) => dst[0] = v as u8,
            Self::Int16(v) => Storage::write_i16(dst, v),
            Self::Int32(v) => Storage::write_i32(dst, v),
            Self::Uint8(v) => dst[0] = v,
            Self::Uint16(v) => Storage::write_u16(dst, v),
            Self::Uint32(v) => Storage::write_u32(dst, v),
            Self::Float32(v) => Storage::write_f32(dst, v),
            Self::Float64(v) => Storage::write_f64(dst, v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
        }
    }
}

// ============================================================================
// Text
// ============================================================================

/// Parse one textual token as a value of `ty`.
///
/// Integers accept a sign and `0x`, `0o`, `0b` or leading-zero octal
/// prefixes. Out-of-range input is an error for every type, including
/// floats that would overflow to infinity.
pub fn decode_text(token: &str, ty: ScalarType) -> Result<Value> {
    if ty.is_float() {
        return decode_float(token, ty);
    }
    let n = parse_integer(token).map_err(|reason| Error::invalid_value(token, ty, reason))?;
    let value = match ty {
        ScalarType::Int8 => i8::try_from(n).map(Value::Int8),
        ScalarType::Int16 => i16::try_from(n).map(Value::Int16),
        ScalarType::Int32 => i32::try_from(n).map(Value::Int32),
        ScalarType::Uint8 => u8::try_from(n).map(Value::Uint8),
        ScalarType::Uint16 => u16::try_from(n).map(Value::Uint16),
        ScalarType::Uint32 => u32::try_from(n).map(Value::Uint32),
        ScalarType::Float32 | ScalarType::Float64 => return decode_float(token, ty),
    };
    value.map_err(|_| Error::invalid_value(token, ty, "value out of range"))
}

/// Format a value the way an ASCII body writes it.
pub fn encode_text(value: &Value) -> String {
    value.to_string()
}

/// Parse a base-aware integer literal into an `i64`.
pub(crate) fn parse_integer(token: &str) -> std::result::Result<i64, String> {
    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    if body.is_empty() || body.starts_with(|c: char| c == '+' || c == '-') {
        return Err("invalid integer literal".to_string());
    }

    let (digits, radix) = match radix_digits(body) {
        Some(split) => split,
        None if body.len() > 1 && body.starts_with('0') => (&body[1..], 8),
        None => (body, 10),
    };

    let magnitude = i64::from_str_radix(digits, radix).map_err(|e| e.to_string())?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn decode_float(token: &str, ty: ScalarType) -> Result<Value> {
    let explicit_inf = token.to_ascii_lowercase().contains("inf");
    let value = match ty {
        ScalarType::Float32 => {
            let v: f32 = token.parse().map_err(|e| Error::invalid_value(token, ty, e))?;
            if v.is_infinite() && !explicit_inf {
                return Err(Error::invalid_value(token, ty, "value out of range"));
            }
            Value::Float32(v)
        }
        _ => {
            let v: f64 = token.parse().map_err(|e| Error::invalid_value(token, ty, e))?;
            if v.is_infinite() && !explicit_inf {
                return Err(Error::invalid_value(token, ty, "value out of range"));
            }
            Value::Float64(v)
        }
    };
    Ok(value)
}

// ============================================================================
// Binary
// ============================================================================

/// Read exactly one value of `ty` in byte order `B` and append its
/// canonical storage bytes to `out`.
pub fn decode_binary<B: ByteOrder, R: Read + ?Sized>(
    reader: &mut R,
    ty: ScalarType,
    out: &mut Vec<u8>,
) -> io::Result<()> {
    Value::read::<B, R>(reader, ty)?.to_storage(out);
    Ok(())
}

/// Write one value in byte order `B`.
pub fn encode_binary<B: ByteOrder, W: Write + ?Sized>(writer: &mut W, value: &Value) -> io::Result<()> {
    value.write::<B, W>(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::BigEndian;
    use std::io::Cursor;

    fn sample_values() -> Vec<Value> {
        vec![
            Value::Int8(-7),
            Value::Int16(-12345),
            Value::Int32(i32::MIN),
            Value::Uint8(255),
            Value::Uint16(40000),
            Value::Uint32(u32::MAX),
            Value::Float32(-1.5),
            Value::Float64(6.02e23),
        ]
    }

    #[test]
    fn test_decode_text_integers() {
        assert_eq!(decode_text("42", ScalarType::Int32).unwrap(), Value::Int32(42));
        assert_eq!(decode_text("-128", ScalarType::Int8).unwrap(), Value::Int8(-128));
        assert_eq!(decode_text("+7", ScalarType::Uint8).unwrap(), Value::Uint8(7));
        assert_eq!(decode_text("0x1F", ScalarType::Uint16).unwrap(), Value::Uint16(31));
        assert_eq!(decode_text("017", ScalarType::Int16).unwrap(), Value::Int16(15));
        assert_eq!(decode_text("0", ScalarType::Uint32).unwrap(), Value::Uint32(0));
    }

    #[test]
    fn test_decode_text_range_errors() {
        assert!(matches!(
            decode_text("256", ScalarType::Uint8),
            Err(Error::InvalidValue { .. })
        ));
        assert!(decode_text("-1", ScalarType::Uint32).is_err());
        assert!(decode_text("40000", ScalarType::Int16).is_err());
        assert!(decode_text("1e40", ScalarType::Float32).is_err());
    }

    #[test]
    fn test_decode_text_rejects_garbage() {
        assert!(decode_text("abc", ScalarType::Int32).is_err());
        assert!(decode_text("1.5", ScalarType::Int32).is_err());
        assert!(decode_text("", ScalarType::Float32).is_err());
        assert!(decode_text("-", ScalarType::Int8).is_err());
    }

    #[test]
    fn test_decode_text_floats() {
        assert_eq!(decode_text("1.0", ScalarType::Float32).unwrap(), Value::Float32(1.0));
        assert_eq!(decode_text("-2.5e-3", ScalarType::Float64).unwrap(), Value::Float64(-2.5e-3));
        assert_eq!(decode_text(".5", ScalarType::Float32).unwrap(), Value::Float32(0.5));
        let inf = decode_text("-inf", ScalarType::Float32).unwrap();
        assert_eq!(inf, Value::Float32(f32::NEG_INFINITY));
        match decode_text("nan", ScalarType::Float64).unwrap() {
            Value::Float64(v) => assert!(v.is_nan()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_binary_both_orders() {
        for value in sample_values() {
            let mut le = Vec::new();
            encode_binary::<LittleEndian, _>(&mut le, &value).unwrap();
            let mut be = Vec::new();
            encode_binary::<BigEndian, _>(&mut be, &value).unwrap();
            assert_eq!(le.len(), value.ty().num_bytes());

            let mut from_le = Vec::new();
            decode_binary::<LittleEndian, _>(&mut Cursor::new(&le), value.ty(), &mut from_le).unwrap();
            let mut from_be = Vec::new();
            decode_binary::<BigEndian, _>(&mut Cursor::new(&be), value.ty(), &mut from_be).unwrap();

            // Both orders land on the same canonical bytes.
            assert_eq!(from_le, from_be);
            assert_eq!(Value::from_storage(&from_le, value.ty()), Some(value));
        }
    }

    #[test]
    fn test_text_and_binary_agree() {
        let text = decode_text("3.0", ScalarType::Float32).unwrap();
        let mut from_text = Vec::new();
        text.to_storage(&mut from_text);

        let be = 3.0f32.to_be_bytes();
        let mut from_binary = Vec::new();
        decode_binary::<BigEndian, _>(&mut Cursor::new(&be[..]), ScalarType::Float32, &mut from_binary)
            .unwrap();
        assert_eq!(from_text, from_binary);
        assert_eq!(from_text, 3.0f32.to_le_bytes());
    }

    #[test]
    fn test_decode_binary_short_read() {
        let mut out = Vec::new();
        let err = decode_binary::<LittleEndian, _>(&mut Cursor::new(&[1u8, 2][..]), ScalarType::Int32, &mut out)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_as_count() {
        assert_eq!(Value::Uint8(3).as_count(), Some(3));
        assert_eq!(Value::Int32(-1).as_count(), None);
        assert_eq!(Value::Float32(2.0).as_count(), None);
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text(&Value::Int16(-4)), "-4");
        assert_eq!(encode_text(&Value::Float32(1.5)), "1.5");
        let back = decode_text(&encode_text(&Value::Float64(0.1)), ScalarType::Float64).unwrap();
        assert_eq!(back, Value::Float64(0.1));
    }
}
