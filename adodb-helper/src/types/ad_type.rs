use crate::types::decode::{self, DecodeFn};
use strum::{AsRefStr, Display, EnumString, FromRepr};

/// ADO `DataTypeEnum`: the `Type` property of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, FromRepr)]
#[repr(i32)]
pub enum AdType {
    #[strum(serialize = "adEmpty")]
    Empty = 0,
    #[strum(serialize = "adSmallInt")]
    SmallInt = 2,
    #[strum(serialize = "adInteger")]
    Integer = 3,
    #[strum(serialize = "adSingle")]
    Single = 4,
    #[strum(serialize = "adDouble")]
    Double = 5,
    #[strum(serialize = "adCurrency")]
    Currency = 6,
    #[strum(serialize = "adDate")]
    Date = 7,
    #[strum(serialize = "adBSTR")]
    BStr = 8,
    #[strum(serialize = "adIDispatch")]
    IDispatch = 9,
    #[strum(serialize = "adError")]
    Error = 10,
    #[strum(serialize = "adBoolean")]
    Boolean = 11,
    #[strum(serialize = "adVariant")]
    Variant = 12,
    #[strum(serialize = "adIUnknown")]
    IUnknown = 13,
    #[strum(serialize = "adDecimal")]
    Decimal = 14,
    #[strum(serialize = "adTinyInt")]
    TinyInt = 16,
    #[strum(serialize = "adUnsignedTinyInt")]
    UnsignedTinyInt = 17,
    #[strum(serialize = "adUnsignedSmallInt")]
    UnsignedSmallInt = 18,
    #[strum(serialize = "adUnsignedInt")]
    UnsignedInt = 19,
    #[strum(serialize = "adBigInt")]
    BigInt = 20,
    #[strum(serialize = "adUnsignedBigInt")]
    UnsignedBigInt = 21,
    #[strum(serialize = "adGUID")]
    Guid = 72,
    #[strum(serialize = "adBinary")]
    Binary = 128,
    #[strum(serialize = "adChar")]
    Char = 129,
    #[strum(serialize = "adWChar")]
    WChar = 130,
    #[strum(serialize = "adNumeric")]
    Numeric = 131,
    #[strum(serialize = "adUserDefined")]
    UserDefined = 132,
    #[strum(serialize = "adDBDate")]
    DbDate = 133,
    #[strum(serialize = "adDBTime")]
    DbTime = 134,
    #[strum(serialize = "adDBTimeStamp")]
    DbTimeStamp = 135,
    #[strum(serialize = "adChapter")]
    Chapter = 136,
    #[strum(serialize = "adVarChar")]
    VarChar = 200,
    #[strum(serialize = "adLongVarChar")]
    LongVarChar = 201,
    #[strum(serialize = "adVarWChar")]
    VarWChar = 202,
    #[strum(serialize = "adLongVarWChar")]
    LongVarWChar = 203,
    #[strum(serialize = "adVarBinary")]
    VarBinary = 204,
    #[strum(serialize = "adLongVarBinary")]
    LongVarBinary = 205,
}

impl AdType {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i64) -> Option<Self> {
        i32::try_from(code).ok().and_then(Self::from_repr)
    }

    /// The decode function for this type, `None` for the codes the adapter
    /// does not decode (`adError`, `adUnsignedBigInt`, `adVarBinary`).
    pub fn decoder(&self) -> Option<DecodeFn> {
        let f: DecodeFn = match self {
            AdType::Empty => decode::empty,
            AdType::SmallInt => decode::small_int,
            AdType::Integer => decode::integer,
            AdType::Single => decode::single,
            AdType::Double => decode::double,
            AdType::Currency => decode::currency,
            AdType::Date | AdType::DbTimeStamp => decode::date_time,
            AdType::DbDate => decode::date_only,
            AdType::DbTime => decode::time_only,
            AdType::BStr
            | AdType::Guid
            | AdType::Char
            | AdType::WChar
            | AdType::Chapter
            | AdType::VarChar
            | AdType::LongVarChar
            | AdType::VarWChar
            | AdType::LongVarWChar => decode::text,
            AdType::IDispatch | AdType::IUnknown => decode::object,
            AdType::Boolean => decode::boolean,
            AdType::Variant => decode::variant,
            AdType::Decimal | AdType::Numeric => decode::scaled,
            AdType::TinyInt => decode::tiny_int,
            AdType::UnsignedTinyInt => decode::unsigned_tiny_int,
            AdType::UnsignedSmallInt => decode::unsigned_small_int,
            AdType::UnsignedInt => decode::unsigned_int,
            AdType::BigInt => decode::big_int,
            AdType::UserDefined => decode::pointer,
            AdType::Binary | AdType::LongVarBinary => decode::binary,
            AdType::Error | AdType::UnsignedBigInt | AdType::VarBinary => return None,
        };
        Some(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_codes_and_names() {
        assert_eq!(AdType::from_code(202), Some(AdType::VarWChar));
        assert_eq!(AdType::VarWChar.to_string(), "adVarWChar");
        assert_eq!(AdType::from_str("adDBTimeStamp").unwrap(), AdType::DbTimeStamp);
        assert_eq!(AdType::Numeric.as_ref(), "adNumeric");
        assert_eq!(AdType::LongVarBinary.code(), 205);
        assert_eq!(AdType::from_code(1), None);
        assert_eq!(AdType::from_code(i64::from(i32::MAX) + 1), None);
    }

    #[test]
    fn test_decoder_coverage() {
        let supported = (0..=255)
            .filter_map(AdType::from_code)
            .filter(|t| t.decoder().is_some())
            .count();
        assert_eq!(supported, 33);

        for gap in [10, 21, 204] {
            let ad_type = AdType::from_code(gap).unwrap();
            assert!(ad_type.decoder().is_none(), "{} should not decode", ad_type);
        }
    }
}
