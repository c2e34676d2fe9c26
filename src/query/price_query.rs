//! Price query object

use super::statement::{CompareOp, Condition, Projection, SelectStatement, SqlValue};
use super::{
    check_column, check_columns, check_direction, check_list, check_not_empty, check_pagination,
    QueryMode, SortDirection,
};
use crate::error::{Result, StoreError};
use crate::models::*;
use crate::tz;

/// Filters, ordering and pagination for price bars in one routed table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuery {
    columns: Option<Vec<String>>,
    count_only: Option<bool>,
    id: Option<String>,
    id_in: Option<Vec<String>>,
    time: Option<String>,
    time_gte: Option<String>,
    time_lte: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    order_by: Option<String>,
    order_direction: Option<String>,
}

fn check_time(field: &str, value: Option<&str>) -> Result<()> {
    check_not_empty(field, value)?;
    if let Some(v) = value {
        tz::parse_ts_to_utc(v)
            .map_err(|_| StoreError::Validation(format!("{} is not a timestamp: {:?}", field, v)))?;
    }
    Ok(())
}

impl PriceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    list_field!(columns, set_columns, is_columns_set);
    scalar_field!(count_only: bool, set_count_only, is_count_only_set);
    text_field!(id, set_id, is_id_set);
    list_field!(id_in, set_id_in, is_id_in_set);
    text_field!(time, set_time, is_time_set);
    text_field!(time_gte, set_time_gte, is_time_gte_set);
    text_field!(time_lte, set_time_lte, is_time_lte_set);
    scalar_field!(limit: i64, set_limit, is_limit_set);
    scalar_field!(offset: i64, set_offset, is_offset_set);
    text_field!(order_by, set_order_by, is_order_by_set);
    text_field!(order_direction, set_order_direction, is_order_direction_set);

    pub fn validate(&self) -> Result<()> {
        check_columns(self.columns.as_deref(), PRICE_COLUMNS)?;
        check_not_empty("id", self.id.as_deref())?;
        check_list("id_in", self.id_in.as_deref())?;
        check_time("time", self.time.as_deref())?;
        check_time("time_gte", self.time_gte.as_deref())?;
        check_time("time_lte", self.time_lte.as_deref())?;
        check_pagination(self.limit, self.offset)?;
        check_column("order_by", self.order_by.as_deref(), PRICE_COLUMNS)?;
        check_direction(self.order_direction.as_deref())?;
        Ok(())
    }

    /// Validate and compile into a SELECT against `table`.
    ///
    /// Time filters are normalized to the storage format so that they compare
    /// correctly against stored bars.
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
        if let Some(time) = &self.time {
            select.conditions.push(Condition::eq(COLUMN_TIME, tz::normalize(time)?));
        }
        if let Some(lower) = &self.time_gte {
            select.conditions.push(Condition::compare(
                COLUMN_TIME,
                CompareOp::Gte,
                tz::normalize(lower)?,
            ));
        }
        if let Some(upper) = &self.time_lte {
            select.conditions.push(Condition::compare(
                COLUMN_TIME,
                CompareOp::Lte,
                tz::normalize(upper)?,
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
