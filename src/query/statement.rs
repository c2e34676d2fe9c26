//! Abstract SQL statements and their dialect-specific rendering
//!
//! Identifiers are quoted for the active dialect; every value travels as a
//! bind parameter.

use super::SortDirection;
use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;
use std::fmt;

/// SQL dialect reported by the database boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
    MySql,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
        }
    }

    /// Quote a table or column identifier
    pub fn quote(&self, identifier: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", identifier.replace('`', "``")),
            Dialect::Sqlite | Dialect::Postgres => {
                format!("\"{}\"", identifier.replace('"', "\"\""))
            }
        }
    }

    /// Placeholder for the 1-based parameter `index`
    fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    /// Column type for timestamp columns
    pub fn datetime_type(&self) -> &'static str {
        match self {
            Dialect::Postgres => "TIMESTAMP",
            Dialect::Sqlite | Dialect::MySql => "DATETIME",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bind parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Text(s) => s.to_sql(),
            SqlValue::Integer(i) => i.to_sql(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(s) => write!(f, "{:?}", s),
            SqlValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

/// Rendered SQL text plus its bind parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Statement without parameters (DDL)
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn params_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p as &dyn ToSql).collect()
    }
}

/// Collects parameters while numbering placeholders for the dialect
struct Binder {
    dialect: Dialect,
    params: Vec<SqlValue>,
}

impl Binder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        self.dialect.placeholder(self.params.len())
    }

    fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            params: self.params,
        }
    }
}

// ========== Select ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lte,
    Like,
}

impl CompareOp {
    fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

/// One predicate of a WHERE clause; predicates are AND-ed
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: String,
        op: CompareOp,
        value: SqlValue,
    },
    In {
        column: String,
        values: Vec<SqlValue>,
    },
}

impl Condition {
    pub fn eq(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    pub fn compare(column: &str, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Condition::Compare {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn is_in(column: &str, values: Vec<SqlValue>) -> Self {
        Condition::In {
            column: column.to_string(),
            values,
        }
    }

    fn render(&self, binder: &mut Binder) -> String {
        match self {
            Condition::Compare { column, op, value } => format!(
                "{} {} {}",
                binder.dialect.quote(column),
                op.as_sql(),
                binder.bind(value.clone())
            ),
            Condition::In { column, values } => {
                let placeholders: Vec<String> =
                    values.iter().map(|v| binder.bind(v.clone())).collect();
                format!(
                    "{} IN ({})",
                    binder.dialect.quote(column),
                    placeholders.join(", ")
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
    /// `COUNT(*) AS count`
    Count,
}

/// A SELECT against one table
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    pub projection: Projection,
    pub conditions: Vec<Condition>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SelectStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Projection::All,
            conditions: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    pub fn render(&self, dialect: Dialect) -> Statement {
        let mut binder = Binder::new(dialect);

        let projection = match &self.projection {
            Projection::All => "*".to_string(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|c| dialect.quote(c))
                .collect::<Vec<_>>()
                .join(", "),
            Projection::Count => "COUNT(*) AS count".to_string(),
        };

        let mut sql = format!("SELECT {} FROM {}", projection, dialect.quote(&self.table));

        if !self.conditions.is_empty() {
            let conditions: Vec<String> =
                self.conditions.iter().map(|c| c.render(&mut binder)).collect();
            sql.push_str(&format!(" WHERE {}", conditions.join(" AND ")));
        }

        if let Some((column, direction)) = &self.order_by {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                dialect.quote(column),
                direction.as_sql()
            ));
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                sql.push_str(&format!(" LIMIT {}", binder.bind(limit.into())));
                if let Some(offset) = offset {
                    sql.push_str(&format!(" OFFSET {}", binder.bind(offset.into())));
                }
            }
            (None, Some(offset)) => {
                // SQLite and MySQL refuse OFFSET without LIMIT
                match dialect {
                    Dialect::Sqlite => sql.push_str(" LIMIT -1"),
                    Dialect::MySql => sql.push_str(" LIMIT 18446744073709551615"),
                    Dialect::Postgres => {}
                }
                sql.push_str(&format!(" OFFSET {}", binder.bind(offset.into())));
            }
            (None, None) => {}
        }

        binder.finish(sql)
    }
}

// ========== Insert / Update / Delete ==========

/// `INSERT INTO table (columns...) VALUES (...)`
pub fn render_insert(dialect: Dialect, table: &str, values: Vec<(&'static str, String)>) -> Statement {
    let mut binder = Binder::new(dialect);
    let mut columns = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());

    for (column, value) in values {
        columns.push(dialect.quote(column));
        placeholders.push(binder.bind(value.into()));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dialect.quote(table),
        columns.join(", "),
        placeholders.join(", ")
    );
    binder.finish(sql)
}

/// `UPDATE table SET ... WHERE id = ?`
pub fn render_update(
    dialect: Dialect,
    table: &str,
    values: Vec<(&'static str, String)>,
    id: &str,
) -> Statement {
    let mut binder = Binder::new(dialect);
    let assignments: Vec<String> = values
        .into_iter()
        .map(|(column, value)| format!("{} = {}", dialect.quote(column), binder.bind(value.into())))
        .collect();
    let id_placeholder = binder.bind(id.into());

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        dialect.quote(table),
        assignments.join(", "),
        dialect.quote("id"),
        id_placeholder
    );
    binder.finish(sql)
}

/// `DELETE FROM table WHERE id = ?`
pub fn render_delete(dialect: Dialect, table: &str, id: &str) -> Statement {
    let mut binder = Binder::new(dialect);
    let id_placeholder = binder.bind(id.into());
    let sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        dialect.quote(table),
        dialect.quote("id"),
        id_placeholder
    );
    binder.finish(sql)
}
