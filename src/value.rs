//! Dynamically typed field values.

use alloc::{string::String, vec::Vec};
use core::fmt;

/// A value held by, or assigned to, a field.
///
/// Fields store their elements in the variant matching their base type. Any
/// variant may be assigned to a field; it is coerced on the way in.
#[derive(Debug, Clone)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),

    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),

    F32(f32),
    F64(f64),

    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// The value as an integer, if it is one.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::U8(x) => x.into(),
            Value::U16(x) => x.into(),
            Value::U32(x) => x.into(),
            Value::U64(x) => x.into(),
            Value::I8(x) => x.into(),
            Value::I16(x) => x.into(),
            Value::I32(x) => x.into(),
            Value::I64(x) => x.into(),
            _ => return None,
        })
    }

    /// The value as a floating point number, if it is numeric (or a string
    /// holding a number).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(x) => Some(*x as f64),
            Value::F64(x) => Some(*x),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bytes(_) => None,
            _ => self.as_i128().map(|x| x as f64),
        }
    }

    /// The value's bit pattern widened to 64 bits, for integers.
    pub fn as_u64_bits(&self) -> Option<u64> {
        Some(match *self {
            Value::U8(x) => x.into(),
            Value::U16(x) => x.into(),
            Value::U32(x) => x.into(),
            Value::U64(x) => x,
            Value::I8(x) => x as u8 as u64,
            Value::I16(x) => x as u16 as u64,
            Value::I32(x) => x as u32 as u64,
            Value::I64(x) => x as u64,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::String(_) | Value::Bytes(_))
    }
}

// Floats compare by bit pattern so that the NaN invalid marker equals itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (U8(a), U8(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F32(a), F32(b)) => a.to_bits() == b.to_bits(),
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(x) => fmt::Display::fmt(x, f),
            Value::U16(x) => fmt::Display::fmt(x, f),
            Value::U32(x) => fmt::Display::fmt(x, f),
            Value::U64(x) => fmt::Display::fmt(x, f),
            Value::I8(x) => fmt::Display::fmt(x, f),
            Value::I16(x) => fmt::Display::fmt(x, f),
            Value::I32(x) => fmt::Display::fmt(x, f),
            Value::I64(x) => fmt::Display::fmt(x, f),
            // Whole numbers keep their fractional part, as in `32.0`.
            Value::F32(x) => fmt::Debug::fmt(x, f),
            Value::F64(x) => fmt::Debug::fmt(x, f),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => {
                for (i, x) in b.iter().enumerate() {
                    if i != 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{x:02X}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(x: $t) -> Self {
                    Value::$v(x)
                }
            }
        )*
    };
}

value_from!(
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    f32 => F32, f64 => F64,
    String => String, Vec<u8> => Bytes,
);

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Value::U8(x as u8)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::String(x.into())
    }
}
