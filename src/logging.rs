//! Tracing setup and the SQL logging side channel

use crate::query::Statement;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Receives every statement before it runs when debug logging is enabled
pub trait SqlLogger: Send + Sync {
    fn log_sql(&self, operation: &str, statement: &Statement);
}

/// Emits statements as `tracing` debug events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSqlLogger;

impl SqlLogger for TracingSqlLogger {
    fn log_sql(&self, operation: &str, statement: &Statement) {
        let params: Vec<String> = statement.params.iter().map(|p| p.to_string()).collect();
        tracing::debug!(
            operation,
            sql = %statement.sql,
            params = %params.join(", "),
            "executing statement"
        );
    }
}

/// Install a global fmt subscriber filtered by `RUST_LOG`, or `default_filter` when unset.
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
