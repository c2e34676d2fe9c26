//! Column names and enumerated values

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ========== Columns ==========

pub const COLUMN_ID: &str = "id";
pub const COLUMN_ASSET_CLASS: &str = "asset_class";
pub const COLUMN_SYMBOL: &str = "symbol";
pub const COLUMN_EXCHANGE: &str = "exchange";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_DESCRIPTION: &str = "description";
pub const COLUMN_MEMO: &str = "memo";
pub const COLUMN_METAS: &str = "metas";
pub const COLUMN_STATUS: &str = "status";
pub const COLUMN_TIMEFRAMES: &str = "timeframes";
pub const COLUMN_CREATED_AT: &str = "created_at";
pub const COLUMN_UPDATED_AT: &str = "updated_at";
pub const COLUMN_SOFT_DELETED_AT: &str = "soft_deleted_at";

pub const COLUMN_OPEN: &str = "open";
pub const COLUMN_HIGH: &str = "high";
pub const COLUMN_LOW: &str = "low";
pub const COLUMN_CLOSE: &str = "close";
pub const COLUMN_VOLUME: &str = "volume";
pub const COLUMN_TIME: &str = "time";

/// Instrument table columns, in insert order
pub const INSTRUMENT_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_STATUS,
    COLUMN_ASSET_CLASS,
    COLUMN_SYMBOL,
    COLUMN_EXCHANGE,
    COLUMN_NAME,
    COLUMN_DESCRIPTION,
    COLUMN_MEMO,
    COLUMN_METAS,
    COLUMN_TIMEFRAMES,
    COLUMN_CREATED_AT,
    COLUMN_UPDATED_AT,
    COLUMN_SOFT_DELETED_AT,
];

/// Price table columns, in insert order
pub const PRICE_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_OPEN,
    COLUMN_HIGH,
    COLUMN_LOW,
    COLUMN_CLOSE,
    COLUMN_VOLUME,
    COLUMN_TIME,
];

fn parse_enum<T: Copy>(all: &[T], as_str: fn(&T) -> &'static str, kind: &str, s: &str) -> Result<T, StoreError> {
    all.iter()
        .copied()
        .find(|v| as_str(v).eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| StoreError::Validation(format!("unknown {}: {:?}", kind, s)))
}

// ========== Asset Class ==========

/// Class of a tradable asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetClass {
    Bond,
    Commodity,
    Crypto,
    Currency,
    Derivative,
    Forex,
    Etf,
    Future,
    Index,
    Option,
    Reit,
    Stock,
    Unknown,
}

impl AssetClass {
    pub const ALL: [AssetClass; 13] = [
        AssetClass::Bond,
        AssetClass::Commodity,
        AssetClass::Crypto,
        AssetClass::Currency,
        AssetClass::Derivative,
        AssetClass::Forex,
        AssetClass::Etf,
        AssetClass::Future,
        AssetClass::Index,
        AssetClass::Option,
        AssetClass::Reit,
        AssetClass::Stock,
        AssetClass::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Bond => "BOND",
            AssetClass::Commodity => "COMMODITY",
            AssetClass::Crypto => "CRYPTO",
            AssetClass::Currency => "CURRENCY",
            AssetClass::Derivative => "DERIVATIVE",
            AssetClass::Forex => "FOREX",
            AssetClass::Etf => "ETF",
            AssetClass::Future => "FUTURE",
            AssetClass::Index => "INDEX",
            AssetClass::Option => "OPTION",
            AssetClass::Reit => "REIT",
            AssetClass::Stock => "STOCK",
            AssetClass::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for AssetClass {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_enum(&Self::ALL, Self::as_str, "asset class", s)
    }
}

// ========== Instrument Status ==========

/// Lifecycle status of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentStatus {
    Draft,
    Active,
    Inactive,
    Disabled,
}

impl InstrumentStatus {
    pub const ALL: [InstrumentStatus; 4] = [
        InstrumentStatus::Draft,
        InstrumentStatus::Active,
        InstrumentStatus::Inactive,
        InstrumentStatus::Disabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentStatus::Draft => "draft",
            InstrumentStatus::Active => "active",
            InstrumentStatus::Inactive => "inactive",
            InstrumentStatus::Disabled => "disabled",
        }
    }
}

impl FromStr for InstrumentStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_enum(&Self::ALL, Self::as_str, "instrument status", s)
    }
}

// ========== Timeframe ==========

/// Sampling interval of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    OneHour,
    #[serde(rename = "4hour")]
    FourHours,
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "1year")]
    OneYear,
}

impl Timeframe {
    pub const ALL: [Timeframe; 10] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1min",
            Timeframe::FiveMinutes => "5min",
            Timeframe::FifteenMinutes => "15min",
            Timeframe::ThirtyMinutes => "30min",
            Timeframe::OneHour => "1hour",
            Timeframe::FourHours => "4hour",
            Timeframe::OneDay => "1day",
            Timeframe::OneWeek => "1week",
            Timeframe::OneMonth => "1month",
            Timeframe::OneYear => "1year",
        }
    }
}

impl FromStr for Timeframe {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_enum(&Self::ALL, Self::as_str, "timeframe", s)
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl From<$t> for String {
                fn from(value: $t) -> Self {
                    value.as_str().to_string()
                }
            }
        )*
    };
}

display_as_str!(AssetClass, InstrumentStatus, Timeframe);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_class_parse() {
        assert_eq!("STOCK".parse::<AssetClass>().unwrap(), AssetClass::Stock);
        assert_eq!("etf".parse::<AssetClass>().unwrap(), AssetClass::Etf);
        assert!("SPACESHIP".parse::<AssetClass>().is_err());
        assert!("".parse::<AssetClass>().is_err());
    }

    #[test]
    fn test_timeframe_display_round_trip() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
        assert_eq!(Timeframe::FourHours.to_string(), "4hour");
        assert!("2min".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_status_serde_matches_display() {
        let json = serde_json::to_string(&InstrumentStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
        let json = serde_json::to_string(&Timeframe::OneWeek).unwrap();
        assert_eq!(json, "\"1week\"");
    }

    #[test]
    fn test_column_sets_start_with_id() {
        assert_eq!(INSTRUMENT_COLUMNS[0], COLUMN_ID);
        assert_eq!(PRICE_COLUMNS[0], COLUMN_ID);
        assert_eq!(INSTRUMENT_COLUMNS.len(), 13);
        assert_eq!(PRICE_COLUMNS.len(), 7);
    }
}
