//! Conversion between SQLite rows and [`Record`]s.
//!
//! Columns are read by name into a record, so adding a column to a table
//! never breaks an existing reader.

use cue_core::Record;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Params};
use serde_json::{Number, Value};

use crate::error::Result;

/// Bind a record value as a SQL parameter.
///
/// Booleans become `0`/`1`. Nested arrays and objects never appear in a
/// record, but are stored as JSON text if they do.
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real))
            .unwrap_or(SqlValue::Null),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Blobs have no record form and read as null.
pub fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null | SqlValue::Blob(_) => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        SqlValue::Text(s) => Value::String(s),
    }
}

/// Run a query and read every row as a [`Record`] keyed by column name.
pub fn query_records<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let rows = stmt.query_map(params, |row| {
        let mut record = Record::new();
        for (idx, name) in columns.iter().enumerate() {
            let value: SqlValue = row.get(idx)?;
            record.insert(name.clone(), from_sql(value));
        }
        Ok(record)
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
