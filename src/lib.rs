//! Trading Store - instrument and OHLCV price persistence
//!
//! Instruments live in a single table. Price bars are routed to one table per
//! (symbol, exchange, timeframe) series, created on demand by the migration
//! helpers. Queries are typed builders compiled into parameterized SQL.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod store;
pub mod tz;

pub use config::StoreOptions;
pub use db::{Database, SqliteDb, SqlitePoolDb};
pub use error::{Result, StoreError};
pub use models::{AssetClass, Instrument, InstrumentStatus, Price, Record, Timeframe};
pub use query::{InstrumentQuery, PriceQuery};
pub use store::{price_table_name, CountResultExt, Store, StoreBuilder, COUNT_ERROR_SENTINEL};
