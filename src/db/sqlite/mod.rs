//! SQLite implementations of the database boundary

pub mod connection;
mod pool;
pub(crate) mod rows;

pub use pool::SqlitePoolDb;

use crate::db::Database;
use crate::error::Result;
use crate::models::Row;
use crate::query::{Dialect, Statement};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper around a single connection
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open (or create) the database file at `path`
    pub fn new(path: &Path) -> Result<Self> {
        let conn = connection::create_connection(path)?;
        tracing::info!("Opened SQLite database at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Private in-memory database, mostly for tests and scratch work
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Database for SqliteDb {
    fn execute(&self, statement: &Statement) -> Result<usize> {
        let conn = self.conn.lock();
        rows::execute(&conn, statement)
    }

    fn select_to_maps(&self, statement: &Statement) -> Result<Vec<Row>> {
        let conn = self.conn.lock();
        rows::select_to_maps(&conn, statement)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}
