//! Field decoding: `(Type, Value, NumericScale)` to a native [`Value`].
//!
//! Each supported [`AdType`] maps to one pure function over [`FieldData`].
//! Integral and floating point codes reinterpret the raw variant payload the
//! way the automation layer's union stores it, so a field whose `Type` says
//! `adSmallInt` is read as 16 bits regardless of how wide the carrying
//! variant is.

use crate::automation::{VarType, Variant};
use crate::types::{AdType, Value};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use num_bigint::BigInt;
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;
/// 0100-01-01
const MIN_SERIAL_DAYS: f64 = -657_434.0;
/// 9999-12-31
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;
const CURRENCY_SCALE: f64 = 10_000.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unsupported field type code {code}")]
    Unsupported { code: i64 },
    #[error("field type code {code} cannot be read from variant type {vt:#06X}")]
    TypeMismatch { code: i64, vt: VarType },
    #[error("field type must be an integer code, got variant type {vt:#06X}")]
    InvalidTypeCode { vt: VarType },
    #[error("safe array declares {declared} elements but holds {available} bytes")]
    BoundsExceeded { declared: u32, available: usize },
    #[error("date serial {0} is out of range")]
    InvalidDate(f64),
}

/// One field as read from the automation layer.
#[derive(Debug, Clone, Copy)]
pub struct FieldData<'a> {
    pub ad_type: AdType,
    pub value: &'a Variant,
    pub scale: i32,
}

impl FieldData<'_> {
    fn mismatch(&self) -> DecodeError {
        DecodeError::TypeMismatch {
            code: i64::from(self.ad_type.code()),
            vt: self.value.vt(),
        }
    }
}

pub type DecodeFn = fn(&FieldData) -> Result<Value, DecodeError>;

/// Decode a field by its type code.
///
/// A null variant decodes to [`Value::Null`] whatever the code. Codes without
/// a decoder, known or not, fail with [`DecodeError::Unsupported`].
pub fn decode(code: i64, value: &Variant, scale: i32) -> Result<Value, DecodeError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let ad_type = AdType::from_code(code).ok_or(DecodeError::Unsupported { code })?;
    let decoder = ad_type.decoder().ok_or(DecodeError::Unsupported { code })?;
    decoder(&FieldData {
        ad_type,
        value,
        scale,
    })
}

pub(crate) fn empty(_: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Null)
}

pub(crate) fn small_int(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Int(i64::from(field.value.raw() as i16)))
}

pub(crate) fn integer(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Int(i64::from(field.value.raw() as i32)))
}

pub(crate) fn single(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Float(f64::from(f32::from_bits(field.value.raw() as u32))))
}

pub(crate) fn double(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Float(f64::from_bits(field.value.raw() as u64)))
}

pub(crate) fn currency(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Float(field.value.raw() as f64 / CURRENCY_SCALE))
}

pub(crate) fn scaled(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Float(
        field.value.raw() as f64 / 10f64.powi(field.scale),
    ))
}

fn serial(field: &FieldData) -> f64 {
    f64::from_bits(field.value.raw() as u64)
}

pub(crate) fn date_time(field: &FieldData) -> Result<Value, DecodeError> {
    serial_to_local(serial(field), DatePart::DateTime).map(Value::DateTime)
}

pub(crate) fn date_only(field: &FieldData) -> Result<Value, DecodeError> {
    serial_to_local(serial(field), DatePart::Date).map(Value::DateTime)
}

pub(crate) fn time_only(field: &FieldData) -> Result<Value, DecodeError> {
    serial_to_local(serial(field), DatePart::Time).map(Value::DateTime)
}

pub(crate) fn text(field: &FieldData) -> Result<Value, DecodeError> {
    field
        .value
        .to_text()
        .map(Value::Text)
        .ok_or_else(|| field.mismatch())
}

pub(crate) fn object(field: &FieldData) -> Result<Value, DecodeError> {
    field
        .value
        .object()
        .map(Value::Object)
        .ok_or_else(|| field.mismatch())
}

pub(crate) fn boolean(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Bool(field.value.raw() != 0))
}

pub(crate) fn variant(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Variant(field.value.clone()))
}

pub(crate) fn tiny_int(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::TinyInt(field.value.raw() as i8))
}

pub(crate) fn unsigned_tiny_int(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::UTinyInt(field.value.raw() as u8))
}

pub(crate) fn unsigned_small_int(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::USmallInt(field.value.raw() as u16))
}

pub(crate) fn unsigned_int(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::UInt(field.value.raw() as u32))
}

pub(crate) fn big_int(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::BigInt(BigInt::from(field.value.raw())))
}

pub(crate) fn pointer(field: &FieldData) -> Result<Value, DecodeError> {
    Ok(Value::Pointer(field.value.raw() as usize))
}

pub(crate) fn binary(field: &FieldData) -> Result<Value, DecodeError> {
    let array = field.value.safe_array().ok_or_else(|| field.mismatch())?;
    array
        .to_bytes()
        .map(Value::Bytes)
        .ok_or(DecodeError::BoundsExceeded {
            declared: array.elements(),
            available: array.data().len(),
        })
}

/// Which half of a day serial a field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    DateTime,
    /// Time of day dropped.
    Date,
    /// Date fixed to the epoch, 1899-12-30.
    Time,
}

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Decode a day serial into local time.
///
/// The integer part counts days from 1899-12-30, the absolute fractional part
/// is the time of day, rounded to the second. A wall clock time skipped by a
/// DST transition is read as UTC, an ambiguous one as its earlier instant.
pub fn serial_to_local(serial: f64, part: DatePart) -> Result<DateTime<Local>, DecodeError> {
    let days = serial.trunc();
    if !serial.is_finite() || !(MIN_SERIAL_DAYS..=MAX_SERIAL_DAYS).contains(&days) {
        return Err(DecodeError::InvalidDate(serial));
    }
    let seconds = (serial.fract().abs() * SECONDS_PER_DAY as f64).round() as i64;
    let offset = match part {
        DatePart::DateTime => Duration::days(days as i64) + Duration::seconds(seconds),
        DatePart::Date => Duration::days(days as i64),
        DatePart::Time => Duration::seconds(seconds % SECONDS_PER_DAY),
    };
    let naive = epoch()
        .and_then(|epoch| epoch.checked_add_signed(offset))
        .ok_or(DecodeError::InvalidDate(serial))?;
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive)))
}

/// Encode local time as a day serial; `None` outside the representable range.
pub fn local_to_serial(dt: &DateTime<Local>) -> Option<f64> {
    let elapsed = dt.naive_local().signed_duration_since(epoch()?).num_seconds();
    let days = elapsed.div_euclid(SECONDS_PER_DAY);
    let time = elapsed.rem_euclid(SECONDS_PER_DAY) as f64 / SECONDS_PER_DAY as f64;
    let days_f = days as f64;
    if !(MIN_SERIAL_DAYS..=MAX_SERIAL_DAYS).contains(&days_f) {
        return None;
    }
    // before the epoch the time of day counts away from zero
    Some(if days < 0 { days_f - time } else { days_f + time })
}
