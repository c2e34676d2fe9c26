//! Pooled SQLite handle

use super::connection::create_connection;
use super::rows;
use crate::db::Database;
use crate::error::Result;
use crate::models::Row;
use crate::query::{Dialect, Statement};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

/// SQLite database shared through an r2d2 connection pool
pub struct SqlitePoolDb {
    pool: Pool<SqliteConnectionManager>,
}

impl SqlitePoolDb {
    /// Open a pool of up to `max_size` connections to the database file at `path`
    pub fn new(path: &Path, max_size: u32) -> Result<Self> {
        // Switch the file to WAL once, before pooled connections exist
        drop(create_connection(path)?);

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA synchronous=NORMAL;")
        });
        let pool = Pool::builder().max_size(max_size).build(manager)?;

        tracing::info!("Opened SQLite pool at {} (max {} connections)", path.display(), max_size);
        Ok(Self { pool })
    }
}

impl Database for SqlitePoolDb {
    fn execute(&self, statement: &Statement) -> Result<usize> {
        let conn = self.pool.get()?;
        rows::execute(&conn, statement)
    }

    fn select_to_maps(&self, statement: &Statement) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::select_to_maps(&conn, statement)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pool_shares_one_file() {
        let dir = tempdir().unwrap();
        let db = SqlitePoolDb::new(&dir.path().join("pool.db"), 4).unwrap();

        db.execute(&Statement::raw("CREATE TABLE t (id TEXT PRIMARY KEY)"))
            .unwrap();
        db.execute(&Statement::raw("INSERT INTO t (id) VALUES ('x')"))
            .unwrap();

        let rows = db.select_to_maps(&Statement::raw("SELECT id FROM t")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(db.dialect(), Dialect::Sqlite);
    }
}
