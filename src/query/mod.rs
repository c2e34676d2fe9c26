//! Query objects and SQL compilation
//!
//! Every query field is tri-state: `None` means "not specified" and adds no
//! predicate, `Some(value)` means "explicitly set" and is validated even when
//! the value is empty.

use crate::error::{Result, StoreError};
use std::fmt;
use std::str::FromStr;

/// Generates `set_<field>`, `<field>` and `is_<field>_set` for a text filter
macro_rules! text_field {
    ($field:ident, $setter:ident, $is_set:ident) => {
        pub fn $setter(mut self, value: impl Into<String>) -> Self {
            self.$field = Some(value.into());
            self
        }

        pub fn $field(&self) -> &str {
            self.$field.as_deref().unwrap_or("")
        }

        pub fn $is_set(&self) -> bool {
            self.$field.is_some()
        }
    };
}

/// Same as `text_field!` for list-valued fields
macro_rules! list_field {
    ($field:ident, $setter:ident, $is_set:ident) => {
        pub fn $setter<I, S>(mut self, values: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.$field = Some(values.into_iter().map(Into::into).collect());
            self
        }

        pub fn $field(&self) -> &[String] {
            self.$field.as_deref().unwrap_or(&[])
        }

        pub fn $is_set(&self) -> bool {
            self.$field.is_some()
        }
    };
}

/// Same as `text_field!` for copyable scalar fields
macro_rules! scalar_field {
    ($field:ident: $ty:ty, $setter:ident, $is_set:ident) => {
        pub fn $setter(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }

        pub fn $field(&self) -> $ty {
            self.$field.unwrap_or_default()
        }

        pub fn $is_set(&self) -> bool {
            self.$field.is_some()
        }
    };
}

mod instrument_query;
mod price_query;
pub mod statement;

pub use instrument_query::InstrumentQuery;
pub use price_query::PriceQuery;
pub use statement::{Dialect, SelectStatement, SqlValue, Statement};

/// Whether a query lists rows or counts them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    List,
    Count,
}

/// Sort order; descending unless stated otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(StoreError::Validation(format!(
                "order direction must be asc or desc, got {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ========== Validation helpers ==========

fn invalid(message: String) -> StoreError {
    StoreError::Validation(message)
}

/// A set text filter must not be empty
fn check_not_empty(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(invalid(format!("{} cannot be empty", field))),
        _ => Ok(()),
    }
}

/// A set list must be non-empty and hold no empty entries
fn check_list(field: &str, values: Option<&[String]>) -> Result<()> {
    match values {
        Some([]) => Err(invalid(format!("{} cannot be empty", field))),
        Some(values) if values.iter().any(|v| v.trim().is_empty()) => {
            Err(invalid(format!("{} cannot contain empty values", field)))
        }
        _ => Ok(()),
    }
}

/// A set identifier must be one of the table's columns
fn check_column(field: &str, value: Option<&str>, vocabulary: &[&str]) -> Result<()> {
    check_not_empty(field, value)?;
    match value {
        Some(v) if !vocabulary.contains(&v) => {
            Err(invalid(format!("{} refers to unknown column {:?}", field, v)))
        }
        _ => Ok(()),
    }
}

fn check_columns(values: Option<&[String]>, vocabulary: &[&str]) -> Result<()> {
    check_list("columns", values)?;
    for column in values.unwrap_or(&[]) {
        check_column("columns", Some(column.as_str()), vocabulary)?;
    }
    Ok(())
}

fn check_pagination(limit: Option<i64>, offset: Option<i64>) -> Result<()> {
    if let Some(limit) = limit {
        if limit <= 0 {
            return Err(invalid(format!("limit must be positive, got {}", limit)));
        }
    }
    if let Some(offset) = offset {
        if offset < 0 {
            return Err(invalid(format!("offset cannot be negative, got {}", offset)));
        }
    }
    Ok(())
}

fn check_direction(value: Option<&str>) -> Result<()> {
    check_not_empty("order_direction", value)?;
    if let Some(v) = value {
        v.parse::<SortDirection>()?;
    }
    Ok(())
}

/// A set enumerated filter must parse as `T`
fn check_parses<T: FromStr>(field: &str, value: Option<&str>) -> Result<()> {
    check_not_empty(field, value)?;
    match value {
        Some(v) if v.parse::<T>().is_err() => {
            Err(invalid(format!("{} has unknown value {:?}", field, v)))
        }
        _ => Ok(()),
    }
}
