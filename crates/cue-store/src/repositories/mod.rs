//! Table bindings for each entity plus the generic statements they share.
//!
//! Repositories are stateless: every function takes `&Connection`, and the
//! caller owns the transaction.

mod interaction;
mod profile;
mod profile_file;
mod research;
mod session;

pub use research::set_appended;
pub use session::{finalize, ListSessionsOptions, SESSION_START_BEFORE};

use cue_core::{Entity, Record};
use rusqlite::{params_from_iter, Connection};

use crate::error::Result;
use crate::row::{query_records, to_sql};

/// An entity with a table of its own.
///
/// Record keys from [`Entity::to_record`] are the table's column names.
pub trait Stored: Entity {
    const TABLE: &'static str;
    /// Column holding the owning entity's id, for filtered listings.
    const OWNER_COLUMN: Option<&'static str>;
    /// `ORDER BY` clause for listings.
    const ORDER_BY: &'static str;
}

pub fn insert<E: Stored>(conn: &Connection, entity: &E) -> Result<()> {
    let record = entity.to_record();
    let columns: Vec<&str> = record.keys().map(String::as_str).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        columns.join(", "),
        placeholders.join(", ")
    );
    let _ = conn.execute(&sql, params_from_iter(record.values().map(to_sql)))?;
    Ok(())
}

/// Overwrite every column of the row with the entity's id. Returns whether a
/// row matched.
pub fn replace<E: Stored>(conn: &Connection, entity: &E) -> Result<bool> {
    let mut record = entity.to_record();
    let _ = record.remove("id");
    let assignments: Vec<String> = record
        .keys()
        .enumerate()
        .map(|(i, col)| format!("{col} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        E::TABLE,
        assignments.join(", "),
        record.len() + 1
    );
    let values = record
        .values()
        .map(to_sql)
        .chain(std::iter::once(rusqlite::types::Value::Text(
            entity.id().to_owned(),
        )));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    Ok(changed > 0)
}

pub fn get<E: Stored>(conn: &Connection, id: &str) -> Result<Option<E>> {
    let record = first_record(conn, &format!("SELECT * FROM {} WHERE id = ?1", E::TABLE), id)?;
    Ok(record.as_ref().map(E::from_record))
}

/// List rows in `ORDER_BY` order, optionally restricted to one owner.
/// A limit of 0 means no limit.
pub fn list<E: Stored>(conn: &Connection, owner: Option<&str>, limit: Option<u32>) -> Result<Vec<E>> {
    let limit_clause = limit
        .filter(|&n| n > 0)
        .map(|n| format!(" LIMIT {n}"))
        .unwrap_or_default();
    let records = match (owner, E::OWNER_COLUMN) {
        (Some(owner), Some(column)) => query_records(
            conn,
            &format!(
                "SELECT * FROM {} WHERE {column} = ?1 ORDER BY {}{limit_clause}",
                E::TABLE,
                E::ORDER_BY
            ),
            [owner],
        )?,
        _ => query_records(
            conn,
            &format!("SELECT * FROM {} ORDER BY {}{limit_clause}", E::TABLE, E::ORDER_BY),
            [],
        )?,
    };
    Ok(records.iter().map(E::from_record).collect())
}

pub fn count(conn: &Connection, table: &str) -> Result<u64> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(u64::try_from(n).unwrap_or_default())
}

fn first_record(conn: &Connection, sql: &str, id: &str) -> Result<Option<Record>> {
    Ok(query_records(conn, sql, [id])?.into_iter().next())
}
