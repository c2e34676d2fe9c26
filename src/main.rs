//! trading-store: prepare the instrument and price tables of a SQLite database
//!
//! Usage: trading-store <database-path> [options.json]

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trading_store::{logging, InstrumentQuery, SqliteDb, Store, StoreOptions};

fn main() -> anyhow::Result<()> {
    logging::init_tracing("trading_store=info");

    let mut args = std::env::args().skip(1);
    let db_path = PathBuf::from(
        args.next()
            .context("usage: trading-store <database-path> [options.json]")?,
    );

    let options = match args.next() {
        Some(path) => StoreOptions::from_json_file(Path::new(&path))
            .with_context(|| format!("failed to load options from {}", path))?,
        None => StoreOptions::default(),
    };

    let db = SqliteDb::new(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let store = Store::new(Arc::new(db), options)?;

    let tables = store.auto_migrate()?;
    let instruments = store.instrument_count(&InstrumentQuery::new())?;

    tracing::info!(
        "Migration complete: {} instruments, {} price tables",
        instruments,
        tables
    );
    Ok(())
}
