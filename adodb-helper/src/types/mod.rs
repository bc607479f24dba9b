pub mod ad_type;
pub mod decode;

pub use ad_type::AdType;
pub use decode::{decode, DatePart, DecodeError, DecodeFn, FieldData};

use crate::automation::{Handle, SafeArray, Variant};
use crate::TryConvert;
use adodb_common::error::AdodbStdError;
use bytes::Bytes;
use chrono::{DateTime, Local};
use num_bigint::BigInt;
use std::fmt;

/// Native destination of a decoded column and source of a bound argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    TinyInt(i8),
    UTinyInt(u8),
    USmallInt(u16),
    UInt(u32),
    BigInt(BigInt),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Bytes),
    DateTime(DateTime<Local>),
    Object(Handle),
    /// Passed through untouched (`adVariant`).
    Variant(Variant),
    /// Pointer-sized payload of a user-defined field.
    Pointer(usize),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::UTinyInt(v) => write!(f, "{}", v),
            Value::USmallInt(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => {
                f.write_str("0x")?;
                for byte in v.iter() {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Value::Object(v) => write!(f, "<object {}>", v),
            Value::Variant(v) => write!(f, "{}", v),
            Value::Pointer(v) => write!(f, "{:#x}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::DateTime(v)
    }
}

/// Encode a bound argument for the automation layer.
impl TryConvert<Variant> for &Value {
    type Error = AdodbStdError;

    fn try_convert(self) -> Result<Variant, Self::Error> {
        let variant = match self {
            Value::Null => Variant::Null,
            Value::Int(v) => Variant::I8(*v),
            Value::TinyInt(v) => Variant::I1(*v),
            Value::UTinyInt(v) => Variant::UI1(*v),
            Value::USmallInt(v) => Variant::UI2(*v),
            Value::UInt(v) => Variant::UI4(*v),
            Value::BigInt(v) => Variant::I8(i64::try_from(v).map_err(|_| {
                AdodbStdError::TypeConversionError(format!("i64, `{}` is out of range", v))
            })?),
            Value::Float(v) => Variant::R8(*v),
            Value::Bool(v) => Variant::Bool(*v),
            Value::Text(v) => Variant::BStr(v.clone()),
            Value::Bytes(v) => Variant::Array(SafeArray::new(v.clone())),
            Value::DateTime(v) => Variant::Date(decode::local_to_serial(v).ok_or_else(|| {
                AdodbStdError::TypeConversionError(format!("date serial, `{}` is out of range", v))
            })?),
            Value::Object(v) => Variant::Dispatch(*v),
            Value::Variant(v) => v.clone(),
            Value::Pointer(v) => Variant::UI8(u64::try_from(*v)?),
        };
        Ok(variant)
    }
}
