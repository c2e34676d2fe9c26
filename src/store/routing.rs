//! Price table routing

use super::Store;
use crate::error::{Result, StoreError};

/// Lower-case a name segment and replace anything outside `[a-z0-9_]` with `_`
fn sanitize_segment(segment: &str) -> String {
    segment
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Segments after the symbol must stay one `_`-free token so a table name
/// splits back into exactly one (symbol, exchange, timeframe)
fn check_single_segment(field: &str, value: &str) -> Result<()> {
    if sanitize_segment(value).contains('_') {
        return Err(StoreError::Validation(format!(
            "{} may only contain letters and digits: {:?}",
            field, value
        )));
    }
    Ok(())
}

/// Physical table holding the bars of one (symbol, exchange, timeframe) series.
///
/// `price_table_name("price_", "AAPL", "NASDAQ", "1min", true)` is
/// `price_aapl_nasdaq_1min`; without multiple exchanges the exchange segment
/// is left out (`price_aapl_1min`).
///
/// Names are only unambiguous when the exchange and timeframe segments hold no
/// `_`, which [`Store::price_table_name`] enforces. Symbols that differ only in
/// case or punctuation still share a table: `BRK.B` and `BRK-B` both route to
/// `price_brk_b_...`.
pub fn price_table_name(
    prefix: &str,
    symbol: &str,
    exchange: &str,
    timeframe: &str,
    use_multiple_exchanges: bool,
) -> String {
    let mut segments = vec![sanitize_segment(symbol)];
    if use_multiple_exchanges {
        segments.push(sanitize_segment(exchange));
    }
    segments.push(sanitize_segment(timeframe));

    format!("{}{}", prefix, segments.join("_"))
}

impl Store {
    /// Resolve the price table for a series with this store's configuration
    pub fn price_table_name(&self, symbol: &str, exchange: &str, timeframe: &str) -> Result<String> {
        if symbol.trim().is_empty() {
            return Err(StoreError::Validation("symbol is required".into()));
        }
        if self.use_multiple_exchanges && exchange.trim().is_empty() {
            return Err(StoreError::Validation("exchange is required".into()));
        }
        if timeframe.trim().is_empty() {
            return Err(StoreError::Validation("timeframe is required".into()));
        }
        if self.use_multiple_exchanges {
            check_single_segment("exchange", exchange)?;
        }
        check_single_segment("timeframe", timeframe)?;

        Ok(price_table_name(
            &self.price_table_name_prefix,
            symbol,
            exchange,
            timeframe,
            self.use_multiple_exchanges,
        ))
    }

    pub fn instrument_table_name(&self) -> &str {
        &self.instrument_table_name
    }
}
