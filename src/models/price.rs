//! Price bar record

use super::{column, generate_id, DirtyColumns, Record, Row};
use super::constants::*;
use crate::error::{Result, StoreError};
use crate::tz;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar; values are kept as text and parsed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    id: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
    time: String,
    #[serde(skip)]
    dirty: DirtyColumns,
}

impl Default for Price {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(column: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| StoreError::InvalidData(format!("{} is not numeric: {:?}", column, value)))
}

impl Price {
    /// Fresh bar with a generated id, zero values and the current time; every column is dirty
    pub fn new() -> Self {
        let mut dirty = DirtyColumns::default();
        dirty.mark_all(PRICE_COLUMNS);

        Self {
            id: generate_id(),
            open: "0".to_string(),
            high: "0".to_string(),
            low: "0".to_string(),
            close: "0".to_string(),
            volume: "0".to_string(),
            time: tz::now_string(),
            dirty,
        }
    }

    // ========== Accessors ==========

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn volume(&self) -> &str {
        &self.volume
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn open_f64(&self) -> Result<f64> {
        parse_number(COLUMN_OPEN, &self.open)
    }

    pub fn high_f64(&self) -> Result<f64> {
        parse_number(COLUMN_HIGH, &self.high)
    }

    pub fn low_f64(&self) -> Result<f64> {
        parse_number(COLUMN_LOW, &self.low)
    }

    pub fn close_f64(&self) -> Result<f64> {
        parse_number(COLUMN_CLOSE, &self.close)
    }

    pub fn volume_f64(&self) -> Result<f64> {
        parse_number(COLUMN_VOLUME, &self.volume)
    }

    pub fn time_utc(&self) -> Result<DateTime<Utc>> {
        tz::parse_ts_to_utc(&self.time)
    }

    /// Bar time as ISO-8601 UTC, e.g. `2020-01-01T00:00:00Z`
    pub fn time_iso8601(&self) -> Result<String> {
        self.time_utc().map(|dt| tz::to_iso8601_zulu(&dt))
    }

    // ========== Setters ==========

    pub fn set_open(&mut self, open: impl ToString) -> &mut Self {
        self.open = open.to_string();
        self.dirty.mark(COLUMN_OPEN);
        self
    }

    pub fn set_high(&mut self, high: impl ToString) -> &mut Self {
        self.high = high.to_string();
        self.dirty.mark(COLUMN_HIGH);
        self
    }

    pub fn set_low(&mut self, low: impl ToString) -> &mut Self {
        self.low = low.to_string();
        self.dirty.mark(COLUMN_LOW);
        self
    }

    pub fn set_close(&mut self, close: impl ToString) -> &mut Self {
        self.close = close.to_string();
        self.dirty.mark(COLUMN_CLOSE);
        self
    }

    pub fn set_volume(&mut self, volume: impl ToString) -> &mut Self {
        self.volume = volume.to_string();
        self.dirty.mark(COLUMN_VOLUME);
        self
    }

    /// Set the bar time. Parseable input is normalized to UTC right away;
    /// anything else is kept verbatim and rejected when the bar is written.
    pub fn set_time(&mut self, time: impl AsRef<str>) -> &mut Self {
        let raw = time.as_ref();
        self.time = tz::normalize(raw).unwrap_or_else(|_| raw.trim().to_string());
        self.dirty.mark(COLUMN_TIME);
        self
    }

    pub fn set_time_utc(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.time = tz::format_utc(&time);
        self.dirty.mark(COLUMN_TIME);
        self
    }

    /// Set the bar time from exchange wall-clock time in an IANA zone
    pub fn set_local_time(&mut self, time: NaiveDateTime, tz_name: &str) -> Result<&mut Self> {
        let utc = tz::from_local_naive(time, tz_name)?;
        Ok(self.set_time_utc(utc))
    }

    /// Re-normalize the time column to UTC, failing on unparseable input
    pub(crate) fn normalize_time(&mut self) -> Result<()> {
        let normalized = tz::normalize(&self.time)
            .map_err(|_| StoreError::Validation(format!("price time is invalid: {:?}", self.time)))?;
        if normalized != self.time {
            self.time = normalized;
            self.dirty.mark(COLUMN_TIME);
        }
        Ok(())
    }
}

impl Record for Price {
    fn id(&self) -> &str {
        &self.id
    }

    fn data(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (COLUMN_ID, self.id.clone()),
            (COLUMN_OPEN, self.open.clone()),
            (COLUMN_HIGH, self.high.clone()),
            (COLUMN_LOW, self.low.clone()),
            (COLUMN_CLOSE, self.close.clone()),
            (COLUMN_VOLUME, self.volume.clone()),
            (COLUMN_TIME, self.time.clone()),
        ])
    }

    fn dirty_columns(&self) -> &DirtyColumns {
        &self.dirty
    }

    fn mark_as_not_dirty(&mut self) {
        self.dirty.clear();
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, COLUMN_ID).to_string(),
            open: column(row, COLUMN_OPEN).to_string(),
            high: column(row, COLUMN_HIGH).to_string(),
            low: column(row, COLUMN_LOW).to_string(),
            close: column(row, COLUMN_CLOSE).to_string(),
            volume: column(row, COLUMN_VOLUME).to_string(),
            time: column(row, COLUMN_TIME).to_string(),
            dirty: DirtyColumns::default(),
        })
    }
}
