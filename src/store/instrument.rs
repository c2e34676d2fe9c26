//! Instrument CRUD

use super::Store;
use crate::error::{Result, StoreError};
use crate::models::{Instrument, Record, COLUMN_SOFT_DELETED_AT};
use crate::query::statement::render_update;
use crate::query::{InstrumentQuery, QueryMode};
use crate::tz;

impl Store {
    /// Insert every column of `instrument`, then clear its dirty tracking
    pub fn instrument_create(&self, instrument: &mut Instrument) -> Result<()> {
        self.insert_record("instrument_create", &self.instrument_table_name, instrument)?;
        tracing::info!("Created instrument {} ({})", instrument.symbol(), instrument.id());
        Ok(())
    }

    /// Number of instruments matching `query`; ordering and pagination are ignored
    pub fn instrument_count(&self, query: &InstrumentQuery) -> Result<i64> {
        let select = query.to_select(&self.instrument_table_name, QueryMode::Count)?;
        self.select_count("instrument_count", &select).map_err(|e| {
            tracing::warn!("Instrument count failed: {}", e);
            e
        })
    }

    pub fn instrument_exists(&self, query: &InstrumentQuery) -> Result<bool> {
        Ok(self.instrument_count(query)? > 0)
    }

    /// Look up one instrument; `Ok(None)` when no row matches
    pub fn instrument_find_by_id(&self, id: &str) -> Result<Option<Instrument>> {
        if id.trim().is_empty() {
            return Err(StoreError::Validation("instrument id is required".into()));
        }

        let query = InstrumentQuery::new().set_id(id).set_limit(1);
        Ok(self.instrument_list(&query)?.into_iter().next())
    }

    pub fn instrument_list(&self, query: &InstrumentQuery) -> Result<Vec<Instrument>> {
        let select = query.to_select(&self.instrument_table_name, QueryMode::List)?;
        self.select_records("instrument_list", &select)
    }

    /// Write the changed columns of `instrument`, refreshing `updated_at`.
    ///
    /// Succeeds without touching storage when nothing changed.
    pub fn instrument_update(&self, instrument: &mut Instrument) -> Result<()> {
        if instrument.is_dirty() && !instrument.dirty_columns().contains("updated_at") {
            instrument.set_updated_at(tz::now_string());
        }

        self.update_record("instrument_update", &self.instrument_table_name, instrument)
    }

    pub fn instrument_delete(&self, instrument: &Instrument) -> Result<()> {
        self.instrument_delete_by_id(instrument.id())
    }

    /// Remove the row permanently
    pub fn instrument_delete_by_id(&self, id: &str) -> Result<()> {
        self.delete_by_id_in("instrument_delete", &self.instrument_table_name, id)
    }

    /// Hide `instrument` by stamping its soft-deletion time with now
    pub fn instrument_soft_delete(&self, instrument: &mut Instrument) -> Result<()> {
        let now = self.soft_delete_instrument(instrument.id())?;
        instrument.mark_soft_deleted_at(now);
        Ok(())
    }

    pub fn instrument_soft_delete_by_id(&self, id: &str) -> Result<()> {
        self.soft_delete_instrument(id).map(|_| ())
    }

    fn soft_delete_instrument(&self, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(StoreError::Validation("instrument id is required".into()));
        }

        let now = tz::now_string();
        let statement = render_update(
            self.db.dialect(),
            &self.instrument_table_name,
            vec![(COLUMN_SOFT_DELETED_AT, now.clone())],
            id,
        );
        self.execute("instrument_soft_delete", &statement)?;
        tracing::info!("Soft deleted instrument {}", id);
        Ok(now)
    }
}
