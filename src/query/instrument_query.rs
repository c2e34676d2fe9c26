//! Instrument query object

use super::statement::{CompareOp, Condition, Projection, SelectStatement, SqlValue};
use super::{
    check_column, check_columns, check_direction, check_list, check_not_empty, check_pagination,
    check_parses, QueryMode, SortDirection,
};
use crate::error::Result;
use crate::models::*;
use crate::tz;

/// Filters, ordering and pagination for instrument lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentQuery {
    columns: Option<Vec<String>>,
    count_only: Option<bool>,
    id: Option<String>,
    id_in: Option<Vec<String>>,
    asset_class: Option<String>,
    exchange: Option<String>,
    status: Option<String>,
    symbol: Option<String>,
    symbol_like: Option<String>,
    soft_deleted_excluded: Option<bool>,
    limit: Option<i64>,
    offset: Option<i64>,
    order_by: Option<String>,
    order_direction: Option<String>,
}

impl InstrumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    list_field!(columns, set_columns, is_columns_set);
    scalar_field!(count_only: bool, set_count_only, is_count_only_set);
    text_field!(id, set_id, is_id_set);
    list_field!(id_in, set_id_in, is_id_in_set);
    text_field!(asset_class, set_asset_class, is_asset_class_set);
    text_field!(exchange, set_exchange, is_exchange_set);
    text_field!(status, set_status, is_status_set);
    text_field!(symbol, set_symbol, is_symbol_set);
    text_field!(symbol_like, set_symbol_like, is_symbol_like_set);
    scalar_field!(soft_deleted_excluded: bool, set_soft_deleted_excluded, is_soft_deleted_excluded_set);
    scalar_field!(limit: i64, set_limit, is_limit_set);
    scalar_field!(offset: i64, set_offset, is_offset_set);
    text_field!(order_by, set_order_by, is_order_by_set);
    text_field!(order_direction, set_order_direction, is_order_direction_set);

    /// Check every explicitly set field; unset fields are always valid
    pub fn validate(&self) -> Result<()> {
        check_columns(self.columns.as_deref(), INSTRUMENT_COLUMNS)?;
        check_not_empty("id", self.id.as_deref())?;
        check_list("id_in", self.id_in.as_deref())?;
        check_parses::<AssetClass>("asset_class", self.asset_class.as_deref())?;
        check_not_empty("exchange", self.exchange.as_deref())?;
        check_parses::<InstrumentStatus>("status", self.status.as_deref())?;
        check_not_empty("symbol", self.symbol.as_deref())?;
        check_not_empty("symbol_like", self.symbol_like.as_deref())?;
        check_pagination(self.limit, self.offset)?;
        check_column("order_by", self.order_by.as_deref(), INSTRUMENT_COLUMNS)?;
        check_direction(self.order_direction.as_deref())?;
        Ok(())
    }

    /// Validate and compile into a SELECT against `table`
    pub fn to_select(&self, table: &str, mode: QueryMode) -> Result<SelectStatement> {
        self.validate()?;

        let mut select = SelectStatement::new(table);

        if let Some(id) = &self.id {
            select.conditions.push(Condition::eq(COLUMN_ID, id.as_str()));
        }
        if let Some(ids) = &self.id_in {
            let values = ids.iter().map(|id| SqlValue::from(id.as_str())).collect();
            select.conditions.push(Condition::is_in(COLUMN_ID, values));
        }
        if let Some(asset_class) = &self.asset_class {
            let asset_class: AssetClass = asset_class.parse()?;
            select
                .conditions
                .push(Condition::eq(COLUMN_ASSET_CLASS, asset_class.as_str()));
        }
        if let Some(exchange) = &self.exchange {
            select.conditions.push(Condition::eq(COLUMN_EXCHANGE, exchange.as_str()));
        }
        if let Some(status) = &self.status {
            let status: InstrumentStatus = status.parse()?;
            select.conditions.push(Condition::eq(COLUMN_STATUS, status.as_str()));
        }
        if let Some(symbol) = &self.symbol {
            select.conditions.push(Condition::eq(COLUMN_SYMBOL, symbol.as_str()));
        }
        if let Some(pattern) = &self.symbol_like {
            select.conditions.push(Condition::compare(
                COLUMN_SYMBOL,
                CompareOp::Like,
                format!("%{}%", pattern),
            ));
        }
        if self.soft_deleted_excluded() {
            select.conditions.push(Condition::compare(
                COLUMN_SOFT_DELETED_AT,
                CompareOp::Gt,
                tz::now_string(),
            ));
        }

        if mode == QueryMode::Count || self.count_only() {
            select.projection = Projection::Count;
            select.limit = Some(1);
            return Ok(select);
        }

        if let Some(columns) = &self.columns {
            select.projection = Projection::Columns(columns.clone());
        }
        if let Some(order_by) = &self.order_by {
            let direction = match &self.order_direction {
                Some(direction) => direction.parse()?,
                None => SortDirection::Desc,
            };
            select.order_by = Some((order_by.clone(), direction));
        }
        select.limit = self.limit;
        select.offset = self.offset;

        Ok(select)
    }
}
