//! Primitive types of the wire format.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::any::{Any, TypeId};

use crate::value::Value;

/// A base type, as named in a definition record.
///
/// The discriminant is the byte written to the wire.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    Enum = 0x00,
    Sint8 = 0x01,
    Uint8 = 0x02,
    Sint16 = 0x83,
    Uint16 = 0x84,
    Sint32 = 0x85,
    Uint32 = 0x86,
    String = 0x07,
    Float32 = 0x88,
    Float64 = 0x89,
    Uint8z = 0x0A,
    Uint16z = 0x8B,
    Uint32z = 0x8C,
    Byte = 0x0D,
    Sint64 = 0x8E,
    Uint64 = 0x8F,
    Uint64z = 0x90,
}

const ALL: [BaseType; 17] = [
    BaseType::Enum,
    BaseType::Sint8,
    BaseType::Uint8,
    BaseType::Sint16,
    BaseType::Uint16,
    BaseType::Sint32,
    BaseType::Uint32,
    BaseType::String,
    BaseType::Float32,
    BaseType::Float64,
    BaseType::Uint8z,
    BaseType::Uint16z,
    BaseType::Uint32z,
    BaseType::Byte,
    BaseType::Sint64,
    BaseType::Uint64,
    BaseType::Uint64z,
];

impl TryFrom<u8> for BaseType {
    type Error = u8;

    /// Resolve a wire byte, falling back to matching on the base type number
    /// (the low five bits) when the endian flag is unexpected.
    fn try_from(b: u8) -> Result<Self, u8> {
        ALL.iter()
            .find(|t| **t as u8 == b)
            .or_else(|| ALL.iter().find(|t| t.number() == b & 0x1F))
            .copied()
            .ok_or(b)
    }
}

impl BaseType {
    /// All base types, in order of base type number.
    pub fn all() -> &'static [BaseType] {
        &ALL
    }

    /// The base type number, without the endian flag.
    pub const fn number(self) -> u8 {
        self as u8 & 0x1F
    }

    /// Whether multi-byte elements of this type depend on architecture.
    pub const fn is_endian_sensitive(self) -> bool {
        self as u8 & 0x80 != 0
    }

    /// Width in bytes of a single element.
    pub const fn size(self) -> usize {
        match self {
            Self::Enum | Self::Sint8 | Self::Uint8 | Self::Uint8z | Self::Byte | Self::String => 1,
            Self::Sint16 | Self::Uint16 | Self::Uint16z => 2,
            Self::Sint32 | Self::Uint32 | Self::Uint32z | Self::Float32 => 4,
            Self::Float64 | Self::Sint64 | Self::Uint64 | Self::Uint64z => 8,
        }
    }

    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Sint8 | Self::Sint16 | Self::Sint32 | Self::Sint64 | Self::Float32 | Self::Float64
        )
    }

    pub const fn is_integer(self) -> bool {
        !self.is_string() && !self.is_float()
    }

    /// The marker value representing 'no value' for this type.
    pub fn invalid_value(self) -> Value {
        match self {
            Self::Enum | Self::Uint8 | Self::Byte => Value::U8(u8::MAX),
            Self::Uint8z => Value::U8(0),
            Self::Sint8 => Value::I8(i8::MAX),
            Self::Uint16 => Value::U16(u16::MAX),
            Self::Uint16z => Value::U16(0),
            Self::Sint16 => Value::I16(i16::MAX),
            Self::Uint32 => Value::U32(u32::MAX),
            Self::Uint32z => Value::U32(0),
            Self::Sint32 => Value::I32(i32::MAX),
            Self::Uint64 => Value::U64(u64::MAX),
            Self::Uint64z => Value::U64(0),
            Self::Sint64 => Value::I64(i64::MAX),
            Self::Float32 => Value::F32(f32::from_bits(u32::MAX)),
            Self::Float64 => Value::F64(f64::from_bits(u64::MAX)),
            Self::String => Value::String(String::new()),
        }
    }

    /// Bounds of the storage integer, including the invalid marker.
    fn storage_bounds(self) -> (i128, i128) {
        match self {
            Self::Enum | Self::Uint8 | Self::Uint8z | Self::Byte => (0, u8::MAX.into()),
            Self::Sint8 => (i8::MIN.into(), i8::MAX.into()),
            Self::Uint16 | Self::Uint16z => (0, u16::MAX.into()),
            Self::Sint16 => (i16::MIN.into(), i16::MAX.into()),
            Self::Uint32 | Self::Uint32z => (0, u32::MAX.into()),
            Self::Sint32 => (i32::MIN.into(), i32::MAX.into()),
            Self::Uint64 | Self::Uint64z => (0, u64::MAX.into()),
            Self::Sint64 => (i64::MIN.into(), i64::MAX.into()),
            Self::Float32 | Self::Float64 | Self::String => (0, 0),
        }
    }

    /// Bounds of valid values, excluding the invalid marker.
    fn valid_bounds(self) -> (i128, i128) {
        let (min, max) = self.storage_bounds();
        match self {
            Self::Uint8z | Self::Uint16z | Self::Uint32z | Self::Uint64z => (min + 1, max),
            _ => (min, max - 1),
        }
    }

    /// Whether a value lies within the valid range of this type.
    ///
    /// Strings are valid when their encoded length, leaving room for a
    /// terminator, is between 1 and 254 bytes.
    pub fn is_valid(self, value: &Value) -> bool {
        match self {
            Self::String => value.as_str().is_some_and(|s| (1..=254).contains(&s.len())),
            Self::Float32 => value
                .as_f64()
                .is_some_and(|x| x.is_finite() && x <= f32::MAX as f64 && x >= f32::MIN as f64),
            Self::Float64 => value.as_f64().is_some_and(f64::is_finite),
            _ => {
                if let Value::Bytes(b) = value {
                    return self == Self::Byte && b.iter().any(|x| *x != u8::MAX);
                }

                let (min, max) = self.valid_bounds();
                integer_of(value, min, max).is_some()
            }
        }
    }

    pub fn is_invalid(self, value: &Value) -> bool {
        !self.is_valid(value)
    }

    /// Coerce a value into the storage variant of this type.
    ///
    /// Values which cannot be represented (out of range, NaN, infinite) become
    /// the invalid marker. Anything assigned to a string is stringified.
    pub fn correct_range_and_type(self, value: &Value) -> Value {
        match self {
            Self::String => Value::String(match value {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            }),
            Self::Float32 => match value.as_f64() {
                Some(x) if x.is_finite() && x <= f32::MAX as f64 && x >= f32::MIN as f64 => {
                    Value::F32(x as f32)
                }
                _ => self.invalid_value(),
            },
            Self::Float64 => match value.as_f64() {
                Some(x) if x.is_finite() => Value::F64(x),
                _ => self.invalid_value(),
            },
            _ => {
                let (min, max) = self.storage_bounds();
                match integer_of(value, min, max) {
                    Some(x) => self.from_integer(x),
                    None => self.invalid_value(),
                }
            }
        }
    }

    /// Build the storage variant from an integer known to be in bounds.
    fn from_integer(self, x: i128) -> Value {
        match self {
            Self::Enum | Self::Uint8 | Self::Uint8z | Self::Byte => Value::U8(x as u8),
            Self::Sint8 => Value::I8(x as i8),
            Self::Uint16 | Self::Uint16z => Value::U16(x as u16),
            Self::Sint16 => Value::I16(x as i16),
            Self::Uint32 | Self::Uint32z => Value::U32(x as u32),
            Self::Sint32 => Value::I32(x as i32),
            Self::Uint64 | Self::Uint64z => Value::U64(x as u64),
            Self::Sint64 => Value::I64(x as i64),
            Self::Float32 => Value::F32(x as f32),
            Self::Float64 => Value::F64(x as f64),
            Self::String => Value::String(x.to_string()),
        }
    }

    /// The base type best describing a value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::U8(_) => Self::Uint8,
            Value::U16(_) => Self::Uint16,
            Value::U32(_) => Self::Uint32,
            Value::U64(_) => Self::Uint64,
            Value::I8(_) => Self::Sint8,
            Value::I16(_) => Self::Sint16,
            Value::I32(_) => Self::Sint32,
            Value::I64(_) => Self::Sint64,
            Value::F32(_) => Self::Float32,
            Value::F64(_) => Self::Float64,
            Value::String(_) => Self::String,
            Value::Bytes(_) => Self::Byte,
        }
    }

    /// The base type corresponding to a Rust type, if there is one.
    ///
    /// Booleans map to `uint8`. Platform-sized and 128-bit integers have no
    /// counterpart.
    pub fn of<T: Any + ?Sized>() -> Option<Self> {
        let id = TypeId::of::<T>();

        [
            (TypeId::of::<u8>(), Self::Uint8),
            (TypeId::of::<bool>(), Self::Uint8),
            (TypeId::of::<u16>(), Self::Uint16),
            (TypeId::of::<u32>(), Self::Uint32),
            (TypeId::of::<u64>(), Self::Uint64),
            (TypeId::of::<i8>(), Self::Sint8),
            (TypeId::of::<i16>(), Self::Sint16),
            (TypeId::of::<i32>(), Self::Sint32),
            (TypeId::of::<i64>(), Self::Sint64),
            (TypeId::of::<f32>(), Self::Float32),
            (TypeId::of::<f64>(), Self::Float64),
            (TypeId::of::<str>(), Self::String),
            (TypeId::of::<String>(), Self::String),
            (TypeId::of::<[u8]>(), Self::Byte),
            (TypeId::of::<Vec<u8>>(), Self::Byte),
        ]
        .into_iter()
        .find(|(t, _)| *t == id)
        .map(|(_, b)| b)
    }

    /// As [`BaseType::of`], inferring the type from a value.
    pub fn of_val<T: Any + ?Sized>(_: &T) -> Option<Self> {
        Self::of::<T>()
    }

    /// Decode a single element from exactly [`BaseType::size`] bytes.
    ///
    /// Returns `None` if the slice has the wrong length. Strings are decoded
    /// by fields, not here.
    pub fn decode(self, r: &[u8], is_little_endian: bool) -> Option<Value> {
        macro_rules! decode_as {
            ($t:ty, $v:ident) => {{
                let bytes = r.try_into().ok()?;
                Value::$v(if is_little_endian {
                    <$t>::from_le_bytes(bytes)
                } else {
                    <$t>::from_be_bytes(bytes)
                })
            }};
        }

        Some(match self {
            Self::Enum | Self::Uint8 | Self::Uint8z | Self::Byte => decode_as!(u8, U8),
            Self::Sint8 => decode_as!(i8, I8),
            Self::Uint16 | Self::Uint16z => decode_as!(u16, U16),
            Self::Sint16 => decode_as!(i16, I16),
            Self::Uint32 | Self::Uint32z => decode_as!(u32, U32),
            Self::Sint32 => decode_as!(i32, I32),
            Self::Uint64 | Self::Uint64z => decode_as!(u64, U64),
            Self::Sint64 => decode_as!(i64, I64),
            Self::Float32 => decode_as!(f32, F32),
            Self::Float64 => decode_as!(f64, F64),
            Self::String => return None,
        })
    }

    /// Encode a single element in little-endian order.
    ///
    /// Strings are written followed by their terminator.
    pub fn encode(self, value: &Value, w: &mut Vec<u8>) {
        let value = self.correct_range_and_type(value);

        match value {
            Value::U8(x) => w.push(x),
            Value::I8(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::U16(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::I16(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::U32(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::I32(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::U64(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::I64(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::F32(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::F64(x) => w.extend_from_slice(&x.to_le_bytes()),
            Value::String(s) => {
                w.extend_from_slice(s.as_bytes());
                w.push(0);
            }
            Value::Bytes(b) => w.extend_from_slice(&b),
        }
    }
}

/// Extract an integer within bounds from a value, truncating floats.
fn integer_of(value: &Value, min: i128, max: i128) -> Option<i128> {
    let x = match value.as_i128() {
        Some(x) => x,
        None => {
            let x = value.as_f64()?;
            // Range check before truncation, so values just below zero do not
            // collapse into an unsigned type.
            if !x.is_finite() || x < min as f64 || x > max as f64 {
                return None;
            }
            x as i128
        }
    };

    (min..=max).contains(&x).then_some(x)
}
