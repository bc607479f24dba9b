use crate::automation::Handle;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// VARIANT type tag.
pub type VarType = u16;

pub const VT_EMPTY: VarType = 0;
pub const VT_NULL: VarType = 1;
pub const VT_I2: VarType = 2;
pub const VT_I4: VarType = 3;
pub const VT_R4: VarType = 4;
pub const VT_R8: VarType = 5;
pub const VT_CY: VarType = 6;
pub const VT_DATE: VarType = 7;
pub const VT_BSTR: VarType = 8;
pub const VT_DISPATCH: VarType = 9;
pub const VT_ERROR: VarType = 10;
pub const VT_BOOL: VarType = 11;
pub const VT_UNKNOWN: VarType = 13;
pub const VT_DECIMAL: VarType = 14;
pub const VT_I1: VarType = 16;
pub const VT_UI1: VarType = 17;
pub const VT_UI2: VarType = 18;
pub const VT_UI4: VarType = 19;
pub const VT_I8: VarType = 20;
pub const VT_UI8: VarType = 21;
pub const VT_ARRAY: VarType = 0x2000;

const VARIANT_TRUE: i64 = 0xFFFF;

/// A tagged value as it crosses the automation boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Empty,
    Null,
    I2(i16),
    I4(i32),
    R4(f32),
    R8(f64),
    /// Fixed point with four implied decimal places.
    Currency(i64),
    /// Day serial: days since 1899-12-30, fraction is the time of day.
    Date(f64),
    BStr(String),
    Dispatch(Handle),
    Error(i32),
    Bool(bool),
    Unknown(Handle),
    /// Unscaled mantissa; the scale travels with the field.
    Decimal(i64),
    I1(i8),
    UI1(u8),
    UI2(u16),
    UI4(u32),
    I8(i64),
    UI8(u64),
    /// `VT_ARRAY | VT_UI1`
    Array(SafeArray),
}

impl Variant {
    pub fn vt(&self) -> VarType {
        match self {
            Variant::Empty => VT_EMPTY,
            Variant::Null => VT_NULL,
            Variant::I2(_) => VT_I2,
            Variant::I4(_) => VT_I4,
            Variant::R4(_) => VT_R4,
            Variant::R8(_) => VT_R8,
            Variant::Currency(_) => VT_CY,
            Variant::Date(_) => VT_DATE,
            Variant::BStr(_) => VT_BSTR,
            Variant::Dispatch(_) => VT_DISPATCH,
            Variant::Error(_) => VT_ERROR,
            Variant::Bool(_) => VT_BOOL,
            Variant::Unknown(_) => VT_UNKNOWN,
            Variant::Decimal(_) => VT_DECIMAL,
            Variant::I1(_) => VT_I1,
            Variant::UI1(_) => VT_UI1,
            Variant::UI2(_) => VT_UI2,
            Variant::UI4(_) => VT_UI4,
            Variant::I8(_) => VT_I8,
            Variant::UI8(_) => VT_UI8,
            Variant::Array(_) => VT_ARRAY | VT_UI1,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    /// The 64-bit payload as the VARIANT union holds it.
    ///
    /// Integers narrower than 64 bits are zero-extended, floating point values
    /// are returned as their IEEE-754 bit pattern and `true` is `VARIANT_TRUE`.
    /// Text and arrays carry no scalar payload and read as zero.
    pub fn raw(&self) -> i64 {
        match self {
            Variant::Empty | Variant::Null | Variant::BStr(_) | Variant::Array(_) => 0,
            Variant::I2(v) => i64::from(*v as u16),
            Variant::I4(v) => i64::from(*v as u32),
            Variant::R4(v) => i64::from(v.to_bits()),
            Variant::R8(v) | Variant::Date(v) => v.to_bits() as i64,
            Variant::Currency(v) | Variant::Decimal(v) | Variant::I8(v) => *v,
            Variant::Dispatch(h) | Variant::Unknown(h) => h.as_raw() as i64,
            Variant::Error(v) => i64::from(*v as u32),
            Variant::Bool(v) => {
                if *v {
                    VARIANT_TRUE
                } else {
                    0
                }
            }
            Variant::I1(v) => i64::from(*v as u8),
            Variant::UI1(v) => i64::from(*v),
            Variant::UI2(v) => i64::from(*v),
            Variant::UI4(v) => i64::from(*v),
            Variant::UI8(v) => *v as i64,
        }
    }

    /// Sign-correct integer view of integral and boolean variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::I2(v) => Some(i64::from(*v)),
            Variant::I4(v) | Variant::Error(v) => Some(i64::from(*v)),
            Variant::I8(v) => Some(*v),
            Variant::I1(v) => Some(i64::from(*v)),
            Variant::UI1(v) => Some(i64::from(*v)),
            Variant::UI2(v) => Some(i64::from(*v)),
            Variant::UI4(v) => Some(i64::from(*v)),
            Variant::UI8(v) => i64::try_from(*v).ok(),
            Variant::Bool(v) => Some(if *v { -1 } else { 0 }),
            _ => None,
        }
    }

    pub fn object(&self) -> Option<Handle> {
        match self {
            Variant::Dispatch(h) | Variant::Unknown(h) => Some(*h),
            _ => None,
        }
    }

    pub fn safe_array(&self) -> Option<&SafeArray> {
        match self {
            Variant::Array(array) => Some(array),
            _ => None,
        }
    }

    /// String coercion: text verbatim, scalars through their display form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Variant::BStr(s) => Some(s.clone()),
            Variant::Dispatch(_) | Variant::Unknown(_) | Variant::Array(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => Ok(()),
            Variant::Null => f.write_str("NULL"),
            Variant::I2(v) => write!(f, "{}", v),
            Variant::I4(v) => write!(f, "{}", v),
            Variant::R4(v) => write!(f, "{}", v),
            Variant::R8(v) | Variant::Date(v) => write!(f, "{}", v),
            Variant::Currency(v) => write!(f, "{}", *v as f64 / 10_000.0),
            Variant::BStr(v) => f.write_str(v),
            Variant::Dispatch(h) | Variant::Unknown(h) => write!(f, "<object {}>", h),
            Variant::Error(v) => write!(f, "Error {:#010X}", v),
            Variant::Bool(v) => f.write_str(if *v { "True" } else { "False" }),
            Variant::Decimal(v) | Variant::I8(v) => write!(f, "{}", v),
            Variant::I1(v) => write!(f, "{}", v),
            Variant::UI1(v) => write!(f, "{}", v),
            Variant::UI2(v) => write!(f, "{}", v),
            Variant::UI4(v) => write!(f, "{}", v),
            Variant::UI8(v) => write!(f, "{}", v),
            Variant::Array(a) => write!(f, "<array of {} bytes>", a.elements()),
        }
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::BStr(v.to_string())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::BStr(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::I4(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Variant::I8(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::R8(v)
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

impl From<Handle> for Variant {
    fn from(v: Handle) -> Self {
        Variant::Dispatch(v)
    }
}

/// One-dimensional byte array with its declared bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeArray {
    data: Bytes,
    elements: u32,
    #[serde(default)]
    lower_bound: i32,
}

impl SafeArray {
    /// Wrap `data`, declaring every byte as an element.
    pub fn new<B: Into<Bytes>>(data: B) -> Self {
        let data = data.into();
        let elements = u32::try_from(data.len()).unwrap_or(u32::MAX);
        Self {
            data,
            elements,
            lower_bound: 0,
        }
    }

    pub fn with_bounds<B: Into<Bytes>>(data: B, elements: u32, lower_bound: i32) -> Self {
        Self {
            data: data.into(),
            elements,
            lower_bound,
        }
    }

    pub fn elements(&self) -> u32 {
        self.elements
    }

    pub fn lower_bound(&self) -> i32 {
        self.lower_bound
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// The first `elements` bytes, or `None` when the payload is shorter
    /// than the declared bound.
    pub fn to_bytes(&self) -> Option<Bytes> {
        let len = usize::try_from(self.elements).ok()?;
        if len > self.data.len() {
            return None;
        }
        Some(self.data.slice(..len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_payload() {
        assert_eq!(Variant::I2(-5).raw(), 0xFFFB);
        assert_eq!(Variant::I4(-1).raw(), 0xFFFF_FFFF);
        assert_eq!(Variant::R4(1.5).raw(), i64::from(1.5f32.to_bits()));
        assert_eq!(Variant::R8(2.25).raw(), 2.25f64.to_bits() as i64);
        assert_eq!(Variant::Bool(true).raw(), 0xFFFF);
        assert_eq!(Variant::Bool(false).raw(), 0);
        assert_eq!(Variant::Currency(123_456).raw(), 123_456);
        assert_eq!(Variant::I1(-1).raw(), 0xFF);
        assert_eq!(Variant::UI8(u64::MAX).raw(), -1);
        assert_eq!(Variant::Dispatch(Handle::from_raw(42)).raw(), 42);
        assert_eq!(Variant::BStr("x".into()).raw(), 0);
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Variant::I2(-5).as_i64(), Some(-5));
        assert_eq!(Variant::UI4(u32::MAX).as_i64(), Some(i64::from(u32::MAX)));
        assert_eq!(Variant::Bool(true).as_i64(), Some(-1));
        assert_eq!(Variant::UI8(u64::MAX).as_i64(), None);
        assert_eq!(Variant::R8(1.0).as_i64(), None);
    }

    #[test]
    fn test_vt_and_views() {
        assert_eq!(Variant::Null.vt(), VT_NULL);
        assert!(Variant::Null.is_null());
        assert!(!Variant::Empty.is_null());
        assert_eq!(Variant::Array(SafeArray::new(vec![1u8])).vt(), 0x2011);

        let h = Handle::from_raw(7);
        assert_eq!(Variant::Unknown(h).object(), Some(h));
        assert_eq!(Variant::I4(7).object(), None);

        assert_eq!(Variant::I4(12).to_text().as_deref(), Some("12"));
        assert_eq!(Variant::Bool(false).to_text().as_deref(), Some("False"));
        assert_eq!(Variant::Dispatch(h).to_text(), None);
    }

    #[test]
    fn test_safe_array_bounds() {
        let array = SafeArray::new(vec![1u8, 2, 3]);
        assert_eq!(array.elements(), 3);
        assert_eq!(array.to_bytes().unwrap().as_ref(), &[1, 2, 3]);

        let shorter = SafeArray::with_bounds(vec![1u8, 2, 3, 4], 2, 0);
        assert_eq!(shorter.to_bytes().unwrap().as_ref(), &[1, 2]);

        let overrun = SafeArray::with_bounds(vec![1u8], 4, 0);
        assert!(overrun.to_bytes().is_none());
    }

    #[test]
    fn test_variant_json() {
        let v = Variant::I4(3);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"I4":3}"#);
        let back: Variant = serde_json::from_str(r#""Null""#).unwrap();
        assert_eq!(back, Variant::Null);
    }
}
