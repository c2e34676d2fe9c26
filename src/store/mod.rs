//! Instrument and price store
//!
//! `Store` turns query objects into statements scoped to the right table and
//! runs them through a [`Database`]. Instruments live in one table; prices are
//! routed to one table per (symbol, exchange, timeframe) series.

mod instrument;
mod migrations;
mod price;
pub mod routing;

pub use routing::price_table_name;

use crate::config::StoreOptions;
use crate::db::Database;
use crate::error::{Result, StoreError};
use crate::logging::{SqlLogger, TracingSqlLogger};
use crate::models::{Record, Row};
use crate::query::statement::{render_delete, render_insert, render_update};
use crate::query::{SelectStatement, Statement};
use std::sync::Arc;

/// Value reported in place of a count when counting failed
pub const COUNT_ERROR_SENTINEL: i64 = -1;

/// Collapse a count result into a plain integer, `-1` standing for failure
pub trait CountResultExt {
    fn or_sentinel(self) -> i64;
}

impl CountResultExt for Result<i64> {
    fn or_sentinel(self) -> i64 {
        self.unwrap_or(COUNT_ERROR_SENTINEL)
    }
}

/// Data-access layer for instruments and their price series
pub struct Store {
    db: Arc<dyn Database>,
    instrument_table_name: String,
    price_table_name_prefix: String,
    use_multiple_exchanges: bool,
    sql_logger: Option<Arc<dyn SqlLogger>>,
}

/// Assembles a [`Store`] from a database handle, options and an optional SQL logger
#[derive(Default)]
pub struct StoreBuilder {
    db: Option<Arc<dyn Database>>,
    options: StoreOptions,
    sql_logger: Option<Arc<dyn SqlLogger>>,
}

impl StoreBuilder {
    pub fn database(mut self, db: Arc<dyn Database>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Logger used when `debug_enabled` is set; defaults to [`TracingSqlLogger`]
    pub fn sql_logger(mut self, logger: Arc<dyn SqlLogger>) -> Self {
        self.sql_logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<Store> {
        let db = self
            .db
            .ok_or_else(|| StoreError::Config("database handle is required".into()))?;
        self.options.validate()?;

        let sql_logger = if self.options.debug_enabled {
            Some(
                self.sql_logger
                    .unwrap_or_else(|| Arc::new(TracingSqlLogger) as Arc<dyn SqlLogger>),
            )
        } else {
            None
        };

        let store = Store {
            db,
            instrument_table_name: self.options.instrument_table_name,
            price_table_name_prefix: self.options.price_table_name_prefix,
            use_multiple_exchanges: self.options.use_multiple_exchanges,
            sql_logger,
        };

        tracing::info!(
            "Store ready (dialect={}, instrument table={}, price prefix={})",
            store.db.dialect(),
            store.instrument_table_name,
            store.price_table_name_prefix
        );

        if self.options.automigrate_enabled {
            store.auto_migrate_instruments()?;
        }

        Ok(store)
    }
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Shorthand for `Store::builder().database(db).options(options).build()`
    pub fn new(db: Arc<dyn Database>, options: StoreOptions) -> Result<Self> {
        Self::builder().database(db).options(options).build()
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    pub fn use_multiple_exchanges(&self) -> bool {
        self.use_multiple_exchanges
    }

    // ========== Statement plumbing ==========

    fn log_sql(&self, operation: &str, statement: &Statement) {
        if let Some(logger) = &self.sql_logger {
            logger.log_sql(operation, statement);
        }
    }

    fn execute(&self, operation: &str, statement: &Statement) -> Result<usize> {
        self.log_sql(operation, statement);
        self.db.execute(statement)
    }

    fn select(&self, operation: &str, select: &SelectStatement) -> Result<Vec<Row>> {
        let statement = select.render(self.db.dialect());
        self.log_sql(operation, &statement);
        let rows = self.db.select_to_maps(&statement)?;
        tracing::debug!("{} returned {} rows from {}", operation, rows.len(), select.table);
        Ok(rows)
    }

    fn select_records<R: Record>(&self, operation: &str, select: &SelectStatement) -> Result<Vec<R>> {
        self.select(operation, select)?
            .iter()
            .map(R::from_row)
            .collect()
    }

    fn select_count(&self, operation: &str, select: &SelectStatement) -> Result<i64> {
        let rows = self.select(operation, select)?;
        let value = rows
            .first()
            .and_then(|row| row.get("count"))
            .ok_or_else(|| StoreError::InvalidData("count query returned no rows".into()))?;

        value
            .parse::<i64>()
            .map_err(|_| StoreError::InvalidData(format!("count is not an integer: {:?}", value)))
    }

    fn insert_record<R: Record>(&self, operation: &str, table: &str, record: &mut R) -> Result<()> {
        let statement = render_insert(self.db.dialect(), table, record.data()?);
        self.execute(operation, &statement)?;
        record.mark_as_not_dirty();
        Ok(())
    }

    /// Send the dirty columns (never `id`) of `record`; no-op when nothing changed
    fn update_record<R: Record>(&self, operation: &str, table: &str, record: &mut R) -> Result<()> {
        let changed: Vec<(&'static str, String)> = record
            .data_changed()?
            .into_iter()
            .filter(|(column, _)| *column != "id")
            .collect();

        if changed.is_empty() {
            record.mark_as_not_dirty();
            return Ok(());
        }

        let statement = render_update(self.db.dialect(), table, changed, record.id());
        self.execute(operation, &statement)?;
        record.mark_as_not_dirty();
        Ok(())
    }

    fn delete_by_id_in(&self, operation: &str, table: &str, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(StoreError::Validation("id is required".into()));
        }
        let statement = render_delete(self.db.dialect(), table, id);
        let affected = self.execute(operation, &statement)?;
        tracing::debug!("{} removed {} rows from {}", operation, affected, table);
        Ok(())
    }
}
