//! Statement execution and row materialization

use crate::error::Result;
use crate::models::Row;
use crate::query::Statement;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// Execute a statement that returns no rows
pub fn execute(conn: &Connection, statement: &Statement) -> Result<usize> {
    let params_refs = statement.params_refs();
    let affected = conn.execute(&statement.sql, params_refs.as_slice())?;
    Ok(affected)
}

/// Run a query and collect every row as column name to text value
pub fn select_to_maps(conn: &Connection, statement: &Statement) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&statement.sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let params_refs = statement.params_refs();

    let rows = stmt
        .query_map(params_refs.as_slice(), |row| {
            let mut map = Row::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                map.insert(name.clone(), value_to_string(row.get_ref(i)?));
            }
            Ok(map)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlValue;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE bars (id TEXT PRIMARY KEY, close DECIMAL(20,8), volume BIGINT, note TEXT)",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_execute_and_select() {
        let conn = create_test_db();

        let insert = Statement {
            sql: "INSERT INTO bars (id, close, volume, note) VALUES (?, ?, ?, ?)".into(),
            params: vec![
                SqlValue::from("b1"),
                SqlValue::from("19.45"),
                SqlValue::from("1000"),
                SqlValue::from("hello"),
            ],
        };
        assert_eq!(execute(&conn, &insert).unwrap(), 1);

        let rows = select_to_maps(&conn, &Statement::raw("SELECT * FROM bars")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "b1");
        assert_eq!(rows[0]["close"], "19.45");
        assert_eq!(rows[0]["volume"], "1000");
        assert_eq!(rows[0]["note"], "hello");
    }

    #[test]
    fn test_null_becomes_empty_string() {
        let conn = create_test_db();
        conn.execute("INSERT INTO bars (id) VALUES ('b2')", []).unwrap();

        let rows = select_to_maps(&conn, &Statement::raw("SELECT note FROM bars")).unwrap();
        assert_eq!(rows[0]["note"], "");
    }

    #[test]
    fn test_count_alias() {
        let conn = create_test_db();
        let rows =
            select_to_maps(&conn, &Statement::raw("SELECT COUNT(*) AS count FROM bars")).unwrap();
        assert_eq!(rows[0]["count"], "0");
    }
}
