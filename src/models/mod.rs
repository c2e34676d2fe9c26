//! Record models stored by the data-access layer

mod constants;
mod instrument;
mod price;

pub use constants::*;
pub use instrument::Instrument;
pub use price::Price;

use crate::error::{Result, StoreError};
use std::collections::{BTreeSet, HashMap};

/// A row as returned by the database boundary: column name to text value
pub type Row = HashMap<String, String>;

/// Set of columns changed since the record was loaded or last saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyColumns(BTreeSet<&'static str>);

impl DirtyColumns {
    pub fn mark(&mut self, column: &'static str) {
        self.0.insert(column);
    }

    pub fn mark_all(&mut self, columns: &[&'static str]) {
        self.0.extend(columns.iter().copied());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains(column)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }
}

/// Behaviour shared by every persisted record kind.
///
/// Values cross the storage boundary as text. `data()` yields every column in
/// declaration order; `data_changed()` only the dirty ones.
pub trait Record: Sized {
    fn id(&self) -> &str;

    /// Every column with its text value
    fn data(&self) -> Result<Vec<(&'static str, String)>>;

    fn dirty_columns(&self) -> &DirtyColumns;

    fn mark_as_not_dirty(&mut self);

    /// Rehydrate from a stored row; the result is not dirty
    fn from_row(row: &Row) -> Result<Self>;

    fn is_dirty(&self) -> bool {
        !self.dirty_columns().is_empty()
    }

    /// Only the columns mutated since the last load or save
    fn data_changed(&self) -> Result<Vec<(&'static str, String)>> {
        let dirty = self.dirty_columns();
        Ok(self
            .data()?
            .into_iter()
            .filter(|(column, _)| dirty.contains(column))
            .collect())
    }
}

/// Generate a new record identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Text value of a column, empty when the row does not carry it
pub(crate) fn column<'a>(row: &'a Row, name: &str) -> &'a str {
    row.get(name).map(String::as_str).unwrap_or("")
}

/// Parse a non-empty column with `FromStr`, falling back to `default` when absent
pub(crate) fn parse_column<T>(row: &Row, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    let value = column(row, name);
    if value.is_empty() {
        return Ok(default);
    }
    value
        .parse()
        .map_err(|_| StoreError::InvalidData(format!("column {} holds {:?}", name, value)))
}
