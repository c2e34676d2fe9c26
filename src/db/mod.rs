//! Database boundary
//!
//! The store talks to storage only through [`Database`]: execute a statement,
//! select rows as text maps, and report the SQL dialect used for rendering.

pub mod sqlite;

use crate::error::Result;
use crate::models::Row;
use crate::query::{Dialect, Statement};

pub use sqlite::{SqliteDb, SqlitePoolDb};

/// Storage handle used by the store
pub trait Database: Send + Sync {
    /// Run a statement that returns no rows; yields the affected row count
    fn execute(&self, statement: &Statement) -> Result<usize>;

    /// Run a query and materialize every row as column name to text value
    fn select_to_maps(&self, statement: &Statement) -> Result<Vec<Row>>;

    fn dialect(&self) -> Dialect;
}
