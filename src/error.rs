//! Store error types

use serde::Serialize;
use thiserror::Error;

/// Store-wide error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::Pool(_) => "POOL_ERROR",
            StoreError::Serialization(_) => "SERIALIZATION_ERROR",
            StoreError::Validation(_) => "VALIDATION_ERROR",
            StoreError::InvalidData(_) => "INVALID_DATA",
            StoreError::Config(_) => "CONFIG_ERROR",
            StoreError::Io(_) => "IO_ERROR",
        }
    }

    /// True for errors raised before any SQL reached the database
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

/// Serializable error payload for callers that report errors as JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&StoreError> for ErrorResponse {
    fn from(err: &StoreError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
