//! Price CRUD against routed per-series tables

use super::Store;
use crate::error::{Result, StoreError};
use crate::models::{Price, Record, COLUMN_TIME};
use crate::query::{PriceQuery, QueryMode};

impl Store {
    /// Insert every column of `price` into its series table.
    ///
    /// The bar time is re-normalized to UTC first; an unparseable time is rejected.
    pub fn price_create(&self, symbol: &str, exchange: &str, timeframe: &str, price: &mut Price) -> Result<()> {
        let table = self.price_table_name(symbol, exchange, timeframe)?;
        price.normalize_time()?;
        self.insert_record("price_create", &table, price)
    }

    pub fn price_count(&self, symbol: &str, exchange: &str, timeframe: &str, query: &PriceQuery) -> Result<i64> {
        let table = self.price_table_name(symbol, exchange, timeframe)?;
        let select = query.to_select(&table, QueryMode::Count)?;
        self.select_count("price_count", &select).map_err(|e| {
            tracing::warn!("Price count on {} failed: {}", table, e);
            e
        })
    }

    pub fn price_exists(&self, symbol: &str, exchange: &str, timeframe: &str, query: &PriceQuery) -> Result<bool> {
        Ok(self.price_count(symbol, exchange, timeframe, query)? > 0)
    }

    /// Look up one bar; `Ok(None)` when no row matches
    pub fn price_find_by_id(&self, symbol: &str, exchange: &str, timeframe: &str, id: &str) -> Result<Option<Price>> {
        if id.trim().is_empty() {
            return Err(StoreError::Validation("price id is required".into()));
        }

        let query = PriceQuery::new().set_id(id).set_limit(1);
        Ok(self
            .price_list(symbol, exchange, timeframe, &query)?
            .into_iter()
            .next())
    }

    pub fn price_list(&self, symbol: &str, exchange: &str, timeframe: &str, query: &PriceQuery) -> Result<Vec<Price>> {
        let table = self.price_table_name(symbol, exchange, timeframe)?;
        let select = query.to_select(&table, QueryMode::List)?;
        self.select_records("price_list", &select)
    }

    /// Write only the changed columns of `price`; no-op when nothing changed.
    ///
    /// A changed bar time is re-normalized to UTC; an unparseable one is rejected.
    pub fn price_update(&self, symbol: &str, exchange: &str, timeframe: &str, price: &mut Price) -> Result<()> {
        let table = self.price_table_name(symbol, exchange, timeframe)?;
        if price.dirty_columns().contains(COLUMN_TIME) {
            price.normalize_time()?;
        }
        self.update_record("price_update", &table, price)
    }

    pub fn price_delete(&self, symbol: &str, exchange: &str, timeframe: &str, price: &Price) -> Result<()> {
        self.price_delete_by_id(symbol, exchange, timeframe, price.id())
    }

    pub fn price_delete_by_id(&self, symbol: &str, exchange: &str, timeframe: &str, id: &str) -> Result<()> {
        let table = self.price_table_name(symbol, exchange, timeframe)?;
        self.delete_by_id_in("price_delete", &table, id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::StoreOptions;
    use crate::models::{AssetClass, Instrument, Timeframe};
    use crate::query::Statement;
    use crate::store::CountResultExt;

    fn table_names(store: &Store) -> Vec<String> {
        let rows = store
            .database()
            .select_to_maps(&Statement::raw(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            ))
            .unwrap();
        rows.into_iter().map(|mut row| row.remove("name").unwrap()).collect()
    }

    fn test_price() -> Price {
        let mut price = Price::new();
        price
            .set_open("20.12")
            .set_high("22.23")
            .set_low("18.34")
            .set_close("19.45")
            .set_volume("1000")
            .set_time("2020-01-01 00:00:00");
        price
    }

    fn store_with_price_tables() -> Store {
        let store = migrated_store();
        seed_instrument(&store, "AAPL");
        seed_instrument(&store, "MSFT");
        store.auto_migrate_prices().unwrap();
        store
    }

    #[test]
    fn test_auto_migrate_prices_creates_table_per_timeframe() {
        let store = store_with_price_tables();

        let tables = table_names(&store);
        assert!(tables.contains(&"price_aapl_nasdaq_1min".to_string()));
        assert!(tables.contains(&"price_msft_nasdaq_1day".to_string()));
        assert_eq!(tables.iter().filter(|t| t.starts_with("price_")).count(), 14);

        // second run is harmless
        assert_eq!(store.auto_migrate_prices().unwrap(), 14);
    }

    #[test]
    fn test_auto_migrate_prices_skips_unroutable_instruments() {
        let store = migrated_store();
        seed_instrument(&store, "AAPL");

        let mut no_exchange = Instrument::new();
        no_exchange
            .set_symbol("BTCUSD")
            .set_asset_class(AssetClass::Crypto)
            .set_timeframes(vec![Timeframe::OneDay]);
        store.instrument_create(&mut no_exchange).unwrap();

        assert_eq!(store.auto_migrate_prices().unwrap(), 7);
        let tables = table_names(&store);
        assert!(tables.contains(&"price_aapl_nasdaq_1min".to_string()));
        assert!(!tables.iter().any(|t| t.starts_with("price_btcusd")));
    }

    #[test]
    fn test_auto_migrate_prices_without_instruments() {
        let store = migrated_store();
        assert_eq!(store.auto_migrate_prices().unwrap(), 0);
        assert!(table_names(&store).iter().all(|t| !t.starts_with("price_")));
    }

    #[test]
    fn test_duplicate_timeframes_are_idempotent() {
        let store = migrated_store();
        let mut instrument = crate::models::Instrument::new();
        instrument
            .set_symbol("EURUSD")
            .set_exchange("FX")
            .set_timeframes(vec![
                crate::models::Timeframe::OneHour,
                crate::models::Timeframe::OneHour,
            ]);
        store.instrument_create(&mut instrument).unwrap();

        assert_eq!(store.auto_migrate().unwrap(), 1);
    }

    #[test]
    fn test_price_round_trip() {
        let store = store_with_price_tables();
        let mut price = test_price();
        store.price_create("AAPL", "NASDAQ", "1min", &mut price).unwrap();
        assert!(!price.is_dirty());

        let found = store
            .price_find_by_id("AAPL", "NASDAQ", "1min", price.id())
            .unwrap()
            .unwrap();
        assert!(found.open().starts_with("20.12"));
        assert!(found.high().starts_with("22.23"));
        assert!(found.low().starts_with("18.34"));
        assert!(found.close().starts_with("19.45"));
        assert_eq!(found.volume(), "1000");
        assert_eq!(found.time(), "2020-01-01 00:00:00");
        assert!(!found.is_dirty());
    }

    #[test]
    fn test_routing_ignores_case() {
        let store = store_with_price_tables();
        let mut price = test_price();
        store.price_create("AAPL", "NASDAQ", "1min", &mut price).unwrap();

        let found = store.price_find_by_id("aapl", "nasdaq", "1MIN", price.id()).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn test_create_normalizes_time() {
        let store = store_with_price_tables();
        let mut price = test_price();
        price.set_time("2020-01-01T09:30:00+05:30");
        store.price_create("AAPL", "NASDAQ", "1min", &mut price).unwrap();

        let found = store
            .price_find_by_id("AAPL", "NASDAQ", "1min", price.id())
            .unwrap()
            .unwrap();
        assert_eq!(found.time(), "2020-01-01 04:00:00");

        let mut bad = test_price();
        bad.set_time("someday");
        assert!(store
            .price_create("AAPL", "NASDAQ", "1min", &mut bad)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_partial_update() {
        let store = store_with_price_tables();
        let mut price = test_price();
        store.price_create("AAPL", "NASDAQ", "1min", &mut price).unwrap();

        let mut loaded = store
            .price_find_by_id("AAPL", "NASDAQ", "1min", price.id())
            .unwrap()
            .unwrap();
        loaded.set_high("23.00");
        store.price_update("AAPL", "NASDAQ", "1min", &mut loaded).unwrap();
        assert!(!loaded.is_dirty());

        let reloaded = store
            .price_find_by_id("AAPL", "NASDAQ", "1min", price.id())
            .unwrap()
            .unwrap();
        assert!(reloaded.high().starts_with("23"));
        assert!(reloaded.open().starts_with("20.12"));
        assert!(reloaded.low().starts_with("18.34"));
        assert!(reloaded.close().starts_with("19.45"));
        assert_eq!(reloaded.volume(), "1000");

        // nothing changed: succeeds without a write
        store.price_update("AAPL", "NASDAQ", "1min", &mut loaded).unwrap();
    }

    #[test]
    fn test_update_rejects_invalid_time() {
        let store = store_with_price_tables();
        let mut price = test_price();
        store.price_create("AAPL", "NASDAQ", "1min", &mut price).unwrap();

        price.set_time("someday");
        assert!(store
            .price_update("AAPL", "NASDAQ", "1min", &mut price)
            .unwrap_err()
            .is_validation());

        let stored = store
            .price_find_by_id("AAPL", "NASDAQ", "1min", price.id())
            .unwrap()
            .unwrap();
        assert_eq!(stored.time(), "2020-01-01 00:00:00");
        assert_eq!(
            store
                .price_count("AAPL", "NASDAQ", "1min", &PriceQuery::new().set_time_gte("2000-01-01"))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_update_normalizes_time() {
        let store = store_with_price_tables();
        let mut price = test_price();
        store.price_create("AAPL", "NASDAQ", "1min", &mut price).unwrap();

        price.set_time("2020-01-02T10:00:00+02:00");
        store.price_update("AAPL", "NASDAQ", "1min", &mut price).unwrap();

        let stored = store
            .price_find_by_id("AAPL", "NASDAQ", "1min", price.id())
            .unwrap()
            .unwrap();
        assert_eq!(stored.time(), "2020-01-02 08:00:00");
    }

    #[test]
    fn test_list_time_range_and_count() {
        let store = store_with_price_tables();
        for day in 1..=5 {
            let mut price = test_price();
            price.set_time(format!("2020-01-0{} 00:00:00", day));
            store.price_create("MSFT", "NASDAQ", "1day", &mut price).unwrap();
        }

        let query = PriceQuery::new()
            .set_time_gte("2020-01-02")
            .set_time_lte("2020-01-04 00:00:00")
            .set_order_by("time")
            .set_order_direction("asc");
        let list = store.price_list("MSFT", "NASDAQ", "1day", &query).unwrap();
        let times: Vec<&str> = list.iter().map(|p| p.time()).collect();
        assert_eq!(
            times,
            ["2020-01-02 00:00:00", "2020-01-03 00:00:00", "2020-01-04 00:00:00"]
        );

        assert_eq!(store.price_count("MSFT", "NASDAQ", "1day", &query).unwrap(), 3);
        assert_eq!(
            store
                .price_count("MSFT", "NASDAQ", "1day", &PriceQuery::new().set_time("2020-01-05"))
                .unwrap(),
            1
        );

        let latest = store
            .price_list(
                "MSFT",
                "NASDAQ",
                "1day",
                &PriceQuery::new().set_order_by("time").set_limit(2),
            )
            .unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].time(), "2020-01-05 00:00:00");
    }

    #[test]
    fn test_count_and_exists() {
        let store = store_with_price_tables();
        let empty = PriceQuery::new();
        assert_eq!(store.price_count("AAPL", "NASDAQ", "5min", &empty).unwrap(), 0);
        assert!(!store.price_exists("AAPL", "NASDAQ", "5min", &empty).unwrap());

        let mut price = test_price();
        store.price_create("AAPL", "NASDAQ", "5min", &mut price).unwrap();
        assert!(store.price_exists("AAPL", "NASDAQ", "5min", &empty).unwrap());

        let malformed = store.price_count("AAPL", "NASDAQ", "5min", &PriceQuery::new().set_time(""));
        assert_eq!(malformed.or_sentinel(), -1);

        // table never migrated
        assert_eq!(
            store
                .price_count("TSLA", "NASDAQ", "1min", &empty)
                .or_sentinel(),
            -1
        );
    }

    #[test]
    fn test_delete() {
        let store = store_with_price_tables();
        let mut first = test_price();
        let mut second = test_price();
        store.price_create("AAPL", "NASDAQ", "1hour", &mut first).unwrap();
        store.price_create("AAPL", "NASDAQ", "1hour", &mut second).unwrap();

        store.price_delete("AAPL", "NASDAQ", "1hour", &first).unwrap();
        store
            .price_delete_by_id("AAPL", "NASDAQ", "1hour", second.id())
            .unwrap();
        assert_eq!(
            store
                .price_count("AAPL", "NASDAQ", "1hour", &PriceQuery::new())
                .unwrap(),
            0
        );
        assert!(store.price_delete_by_id("AAPL", "NASDAQ", "1hour", "").is_err());
    }

    #[test]
    fn test_single_exchange_routing() {
        let mut options = StoreOptions::default();
        options.use_multiple_exchanges = false;
        options.automigrate_enabled = true;
        let store = create_test_store(options);

        let table = store.auto_migrate_price_table("AAPL", "", "1min").unwrap();
        assert_eq!(table, "price_aapl_1min");

        let mut price = test_price();
        store.price_create("AAPL", "", "1min", &mut price).unwrap();
        // the exchange does not take part in routing
        assert_eq!(
            store
                .price_count("AAPL", "NYSE", "1min", &PriceQuery::new())
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_routing_requires_segments() {
        let store = migrated_store();
        assert!(store.price_table_name("", "NASDAQ", "1min").is_err());
        assert!(store.price_table_name("AAPL", "", "1min").is_err());
        assert!(store.price_table_name("AAPL", "NASDAQ", "").is_err());
        assert!(store.price_find_by_id("AAPL", "NASDAQ", "1min", "  ").is_err());

        assert!(store.price_table_name("A", "B_C", "1min").unwrap_err().is_validation());
        assert!(store.price_table_name("A", "B.C", "1min").is_err());
        assert!(store.price_table_name("AAPL", "NASDAQ", "1_min").is_err());
        assert_eq!(
            store.price_table_name("BRK.B", "NYSE", "1day").unwrap(),
            "price_brk_b_nyse_1day"
        );
    }
}
