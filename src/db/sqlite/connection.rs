//! SQLite connection utilities

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

/// PRAGMAs applied to every file-backed connection
pub(crate) const FILE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;";

/// Open a file-backed SQLite connection with WAL enabled
pub fn create_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    // WAL lets readers proceed while a writer holds the database
    conn.execute_batch(FILE_PRAGMAS)?;

    Ok(conn)
}

/// Open a private in-memory database
pub fn open_in_memory() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_connection_enables_wal() {
        let dir = tempdir().unwrap();
        let conn = create_connection(&dir.path().join("store.db")).unwrap();

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
