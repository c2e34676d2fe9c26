//! Store configuration

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_INSTRUMENT_TABLE_NAME: &str = "instrument";
pub const DEFAULT_PRICE_TABLE_NAME_PREFIX: &str = "price_";

/// Options fixed at store construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub instrument_table_name: String,
    pub price_table_name_prefix: String,
    /// Include the exchange in price table names
    pub use_multiple_exchanges: bool,
    /// Create the instrument table while constructing the store
    pub automigrate_enabled: bool,
    /// Send every statement to the SQL logger before it runs
    pub debug_enabled: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            instrument_table_name: DEFAULT_INSTRUMENT_TABLE_NAME.to_string(),
            price_table_name_prefix: DEFAULT_PRICE_TABLE_NAME_PREFIX.to_string(),
            use_multiple_exchanges: true,
            automigrate_enabled: false,
            debug_enabled: false,
        }
    }
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::Config(format!("{} is required", field)));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::Config(format!(
            "{} may only contain letters, digits and underscores: {:?}",
            field, value
        )));
    }
    Ok(())
}

impl StoreOptions {
    /// Load options from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: StoreOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        check_identifier("instrument_table_name", &self.instrument_table_name)?;
        check_identifier("price_table_name_prefix", &self.price_table_name_prefix)?;
        Ok(())
    }
}
