//! Instrument record

use super::{column, generate_id, parse_column, DirtyColumns, Record, Row};
use super::constants::*;
use crate::error::{Result, StoreError};
use crate::tz;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static metadata for a tradable symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    id: String,
    status: InstrumentStatus,
    asset_class: AssetClass,
    symbol: String,
    exchange: String,
    name: String,
    description: String,
    memo: String,
    metas: BTreeMap<String, String>,
    timeframes: Vec<Timeframe>,
    created_at: String,
    updated_at: String,
    soft_deleted_at: String,
    #[serde(skip)]
    dirty: DirtyColumns,
}

impl Default for Instrument {
    fn default() -> Self {
        Self::new()
    }
}

impl Instrument {
    /// Fresh instrument with a generated id and default values; every column is dirty
    pub fn new() -> Self {
        let now = tz::now_string();
        let mut dirty = DirtyColumns::default();
        dirty.mark_all(INSTRUMENT_COLUMNS);

        Self {
            id: generate_id(),
            status: InstrumentStatus::Draft,
            asset_class: AssetClass::Unknown,
            symbol: String::new(),
            exchange: String::new(),
            name: String::new(),
            description: String::new(),
            memo: String::new(),
            metas: BTreeMap::new(),
            timeframes: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            soft_deleted_at: tz::MAX_DATETIME.to_string(),
            dirty,
        }
    }

    // ========== Accessors ==========

    pub fn status(&self) -> InstrumentStatus {
        self.status
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn timeframes(&self) -> &[Timeframe] {
        &self.timeframes
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn soft_deleted_at(&self) -> &str {
        &self.soft_deleted_at
    }

    pub fn created_at_utc(&self) -> Result<DateTime<Utc>> {
        tz::parse_ts_to_utc(&self.created_at)
    }

    pub fn updated_at_utc(&self) -> Result<DateTime<Utc>> {
        tz::parse_ts_to_utc(&self.updated_at)
    }

    pub fn soft_deleted_at_utc(&self) -> Result<DateTime<Utc>> {
        tz::parse_ts_to_utc(&self.soft_deleted_at)
    }

    /// True once the soft-deletion timestamp has passed
    pub fn is_soft_deleted(&self) -> bool {
        self.soft_deleted_at_utc()
            .map(|at| at <= Utc::now())
            .unwrap_or(false)
    }

    // ========== Setters ==========

    pub fn set_status(&mut self, status: InstrumentStatus) -> &mut Self {
        self.status = status;
        self.dirty.mark(COLUMN_STATUS);
        self
    }

    pub fn set_asset_class(&mut self, asset_class: AssetClass) -> &mut Self {
        self.asset_class = asset_class;
        self.dirty.mark(COLUMN_ASSET_CLASS);
        self
    }

    pub fn set_symbol(&mut self, symbol: impl Into<String>) -> &mut Self {
        self.symbol = symbol.into();
        self.dirty.mark(COLUMN_SYMBOL);
        self
    }

    pub fn set_exchange(&mut self, exchange: impl Into<String>) -> &mut Self {
        self.exchange = exchange.into();
        self.dirty.mark(COLUMN_EXCHANGE);
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self.dirty.mark(COLUMN_NAME);
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self.dirty.mark(COLUMN_DESCRIPTION);
        self
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.memo = memo.into();
        self.dirty.mark(COLUMN_MEMO);
        self
    }

    pub fn set_timeframes(&mut self, timeframes: Vec<Timeframe>) -> &mut Self {
        self.timeframes = timeframes;
        self.dirty.mark(COLUMN_TIMEFRAMES);
        self
    }

    pub fn set_created_at(&mut self, created_at: impl Into<String>) -> &mut Self {
        self.created_at = created_at.into();
        self.dirty.mark(COLUMN_CREATED_AT);
        self
    }

    pub fn set_updated_at(&mut self, updated_at: impl Into<String>) -> &mut Self {
        self.updated_at = updated_at.into();
        self.dirty.mark(COLUMN_UPDATED_AT);
        self
    }

    pub fn set_soft_deleted_at(&mut self, soft_deleted_at: impl Into<String>) -> &mut Self {
        self.soft_deleted_at = soft_deleted_at.into();
        self.dirty.mark(COLUMN_SOFT_DELETED_AT);
        self
    }

    /// Record a soft deletion already persisted by the store
    pub(crate) fn mark_soft_deleted_at(&mut self, soft_deleted_at: String) {
        self.soft_deleted_at = soft_deleted_at;
    }

    // ========== Metas ==========

    pub fn metas(&self) -> &BTreeMap<String, String> {
        &self.metas
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metas.get(key).map(String::as_str)
    }

    pub fn set_metas(&mut self, metas: BTreeMap<String, String>) -> &mut Self {
        self.metas = metas;
        self.dirty.mark(COLUMN_METAS);
        self
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.metas.insert(key.into(), value.into());
        self.dirty.mark(COLUMN_METAS);
        self
    }

    pub fn delete_meta(&mut self, key: &str) -> &mut Self {
        if self.metas.remove(key).is_some() {
            self.dirty.mark(COLUMN_METAS);
        }
        self
    }

    fn timeframes_text(&self) -> String {
        self.timeframes
            .iter()
            .map(Timeframe::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Record for Instrument {
    fn id(&self) -> &str {
        &self.id
    }

    fn data(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (COLUMN_ID, self.id.clone()),
            (COLUMN_STATUS, self.status.to_string()),
            (COLUMN_ASSET_CLASS, self.asset_class.to_string()),
            (COLUMN_SYMBOL, self.symbol.clone()),
            (COLUMN_EXCHANGE, self.exchange.clone()),
            (COLUMN_NAME, self.name.clone()),
            (COLUMN_DESCRIPTION, self.description.clone()),
            (COLUMN_MEMO, self.memo.clone()),
            (COLUMN_METAS, serde_json::to_string(&self.metas)?),
            (COLUMN_TIMEFRAMES, self.timeframes_text()),
            (COLUMN_CREATED_AT, self.created_at.clone()),
            (COLUMN_UPDATED_AT, self.updated_at.clone()),
            (COLUMN_SOFT_DELETED_AT, self.soft_deleted_at.clone()),
        ])
    }

    fn dirty_columns(&self) -> &DirtyColumns {
        &self.dirty
    }

    fn mark_as_not_dirty(&mut self) {
        self.dirty.clear();
    }

    fn from_row(row: &Row) -> Result<Self> {
        let metas = match column(row, COLUMN_METAS) {
            "" => BTreeMap::new(),
            json => serde_json::from_str(json)?,
        };

        let timeframes = column(row, COLUMN_TIMEFRAMES)
            .split(',')
            .map(str::trim)
            .filter(|tf| !tf.is_empty())
            .map(|tf| {
                tf.parse::<Timeframe>().map_err(|_| {
                    StoreError::InvalidData(format!("unknown timeframe {:?}", tf))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let soft_deleted_at = match column(row, COLUMN_SOFT_DELETED_AT) {
            "" => tz::MAX_DATETIME.to_string(),
            value => value.to_string(),
        };

        Ok(Self {
            id: column(row, COLUMN_ID).to_string(),
            status: parse_column(row, COLUMN_STATUS, InstrumentStatus::Draft)?,
            asset_class: parse_column(row, COLUMN_ASSET_CLASS, AssetClass::Unknown)?,
            symbol: column(row, COLUMN_SYMBOL).to_string(),
            exchange: column(row, COLUMN_EXCHANGE).to_string(),
            name: column(row, COLUMN_NAME).to_string(),
            description: column(row, COLUMN_DESCRIPTION).to_string(),
            memo: column(row, COLUMN_MEMO).to_string(),
            metas,
            timeframes,
            created_at: column(row, COLUMN_CREATED_AT).to_string(),
            updated_at: column(row, COLUMN_UPDATED_AT).to_string(),
            soft_deleted_at,
            dirty: DirtyColumns::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_instrument_defaults() {
        let instrument = Instrument::new();

        assert_eq!(instrument.id().len(), 32);
        assert_eq!(instrument.status(), InstrumentStatus::Draft);
        assert_eq!(instrument.asset_class(), AssetClass::Unknown);
        assert_eq!(instrument.symbol(), "");
        assert!(instrument.metas().is_empty());
        assert!(instrument.timeframes().is_empty());
        assert_eq!(instrument.soft_deleted_at(), tz::MAX_DATETIME);
        assert!(!instrument.is_soft_deleted());
        assert_eq!(instrument.created_at().len(), "2020-01-01 00:00:00".len());
        assert!(instrument.is_dirty());
        assert_eq!(instrument.data_changed().unwrap().len(), INSTRUMENT_COLUMNS.len());
    }

    #[test]
    fn test_setters_mark_dirty() {
        let mut instrument = Instrument::new();
        instrument.mark_as_not_dirty();
        assert!(!instrument.is_dirty());

        instrument.set_symbol("AAPL").set_exchange("NASDAQ");
        let changed = instrument.data_changed().unwrap();
        assert_eq!(
            changed,
            vec![
                (COLUMN_SYMBOL, "AAPL".to_string()),
                (COLUMN_EXCHANGE, "NASDAQ".to_string()),
            ]
        );
    }

    #[test]
    fn test_metas() {
        let mut instrument = Instrument::new();
        instrument.mark_as_not_dirty();

        instrument.set_meta("sector", "tech").set_meta("lot", "100");
        assert_eq!(instrument.meta("sector"), Some("tech"));
        assert!(instrument.dirty_columns().contains(COLUMN_METAS));

        instrument.mark_as_not_dirty();
        instrument.delete_meta("missing");
        assert!(!instrument.is_dirty());

        instrument.delete_meta("lot");
        assert_eq!(instrument.meta("lot"), None);
        assert!(instrument.is_dirty());

        let data = instrument.data().unwrap();
        let metas = data.iter().find(|(c, _)| *c == COLUMN_METAS).unwrap();
        assert_eq!(metas.1, r#"{"sector":"tech"}"#);
    }

    #[test]
    fn test_from_row_round_trip() {
        let mut instrument = Instrument::new();
        instrument
            .set_symbol("MSFT")
            .set_exchange("NASDAQ")
            .set_asset_class(AssetClass::Stock)
            .set_status(InstrumentStatus::Active)
            .set_timeframes(vec![Timeframe::OneMinute, Timeframe::OneDay, Timeframe::OneMinute])
            .set_meta("isin", "US5949181045");

        let row: Row = instrument
            .data()
            .unwrap()
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .collect();

        let loaded = Instrument::from_row(&row).unwrap();
        assert!(!loaded.is_dirty());
        assert_eq!(loaded.id(), instrument.id());
        assert_eq!(loaded.asset_class(), AssetClass::Stock);
        assert_eq!(loaded.status(), InstrumentStatus::Active);
        // duplicates are kept
        assert_eq!(loaded.timeframes().len(), 3);
        assert_eq!(loaded.meta("isin"), Some("US5949181045"));
    }

    #[test]
    fn test_from_row_rejects_unknown_timeframe() {
        let mut row = Row::new();
        row.insert(COLUMN_ID.into(), "abc".into());
        row.insert(COLUMN_TIMEFRAMES.into(), "1min,7min".into());
        assert!(Instrument::from_row(&row).is_err());
    }

    #[test]
    fn test_partial_projection_uses_defaults() {
        let mut row = Row::new();
        row.insert(COLUMN_ID.into(), "abc".into());
        row.insert(COLUMN_SYMBOL.into(), "AAPL".into());

        let loaded = Instrument::from_row(&row).unwrap();
        assert_eq!(loaded.symbol(), "AAPL");
        assert_eq!(loaded.asset_class(), AssetClass::Unknown);
        assert_eq!(loaded.soft_deleted_at(), tz::MAX_DATETIME);
    }
}
