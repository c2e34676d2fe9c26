//! Table creation for instruments and routed price tables

use super::Store;
use crate::error::Result;
use crate::models::Record;
use crate::query::{Dialect, InstrumentQuery, Statement};
use std::collections::BTreeSet;

fn index_statement(dialect: Dialect, table: &str, column: &str) -> Statement {
    Statement::raw(format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        dialect.quote(&format!("idx_{}_{}", table, column)),
        dialect.quote(table),
        dialect.quote(column)
    ))
}

/// Instrument table plus its lookup indexes
pub(crate) fn instrument_table_statements(dialect: Dialect, table: &str) -> Vec<Statement> {
    let q = |c: &str| dialect.quote(c);
    let create = Statement::raw(format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
    {id} VARCHAR(40) NOT NULL PRIMARY KEY,
    {status} VARCHAR(20) NOT NULL,
    {asset_class} VARCHAR(20) NOT NULL,
    {symbol} VARCHAR(40) NOT NULL,
    {exchange} VARCHAR(40) NOT NULL,
    {name} VARCHAR(255) NOT NULL,
    {description} TEXT NOT NULL,
    {memo} TEXT NOT NULL,
    {metas} TEXT NOT NULL,
    {timeframes} TEXT NOT NULL,
    {created_at} VARCHAR(30) NOT NULL,
    {updated_at} VARCHAR(30) NOT NULL,
    {soft_deleted_at} VARCHAR(30) NOT NULL
)"#,
        table = q(table),
        id = q("id"),
        status = q("status"),
        asset_class = q("asset_class"),
        symbol = q("symbol"),
        exchange = q("exchange"),
        name = q("name"),
        description = q("description"),
        memo = q("memo"),
        metas = q("metas"),
        timeframes = q("timeframes"),
        created_at = q("created_at"),
        updated_at = q("updated_at"),
        soft_deleted_at = q("soft_deleted_at"),
    ));

    let mut statements = vec![create];
    for column in ["symbol", "exchange", "asset_class", "soft_deleted_at"] {
        statements.push(index_statement(dialect, table, column));
    }
    statements
}

/// One routed price table plus its time index
pub(crate) fn price_table_statements(dialect: Dialect, table: &str) -> Vec<Statement> {
    let q = |c: &str| dialect.quote(c);
    let create = Statement::raw(format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
    {id} VARCHAR(40) NOT NULL PRIMARY KEY,
    {open} DECIMAL(20,8) NOT NULL,
    {high} DECIMAL(20,8) NOT NULL,
    {low} DECIMAL(20,8) NOT NULL,
    {close} DECIMAL(20,8) NOT NULL,
    {volume} BIGINT NOT NULL,
    {time} {datetime} NOT NULL
)"#,
        table = q(table),
        id = q("id"),
        open = q("open"),
        high = q("high"),
        low = q("low"),
        close = q("close"),
        volume = q("volume"),
        time = q("time"),
        datetime = dialect.datetime_type(),
    ));

    vec![create, index_statement(dialect, table, "time")]
}

impl Store {
    /// Create the instrument table, then one price table per instrument timeframe
    pub fn auto_migrate(&self) -> Result<usize> {
        self.auto_migrate_instruments()?;
        self.auto_migrate_prices()
    }

    /// Create the instrument table and its indexes if absent
    pub fn auto_migrate_instruments(&self) -> Result<()> {
        let statements = instrument_table_statements(self.db.dialect(), &self.instrument_table_name);
        for statement in &statements {
            self.execute("auto_migrate_instruments", statement)?;
        }

        tracing::info!("Instrument table ready: {}", self.instrument_table_name);
        Ok(())
    }

    /// Create the price table of every (instrument, timeframe) pair if absent.
    ///
    /// Returns the number of distinct tables ensured. Instruments whose symbol
    /// or exchange cannot be routed are skipped with a warning. The first failed
    /// create statement aborts the run; tables created before it are left in place.
    pub fn auto_migrate_prices(&self) -> Result<usize> {
        let instruments = self.instrument_list(&InstrumentQuery::new())?;
        let mut seen = BTreeSet::new();

        for instrument in &instruments {
            for timeframe in instrument.timeframes() {
                let table = match self.price_table_name(
                    instrument.symbol(),
                    instrument.exchange(),
                    timeframe.as_str(),
                ) {
                    Ok(table) => table,
                    Err(e) if e.is_validation() => {
                        tracing::warn!(
                            "Skipping price tables of instrument {}: {}",
                            instrument.id(),
                            e
                        );
                        break;
                    }
                    Err(e) => return Err(e),
                };
                if seen.insert(table.clone()) {
                    self.create_price_table(&table)?;
                }
            }
        }

        tracing::info!(
            "Price tables ready: {} tables for {} instruments",
            seen.len(),
            instruments.len()
        );
        Ok(seen.len())
    }

    /// Create the price table of one series if absent; returns its name
    pub fn auto_migrate_price_table(&self, symbol: &str, exchange: &str, timeframe: &str) -> Result<String> {
        let table = self.price_table_name(symbol, exchange, timeframe)?;
        self.create_price_table(&table)?;
        Ok(table)
    }

    fn create_price_table(&self, table: &str) -> Result<()> {
        for statement in &price_table_statements(self.db.dialect(), table) {
            self.execute("auto_migrate_prices", statement)?;
        }
        tracing::debug!("Price table ready: {}", table);
        Ok(())
    }
}
