//! Parent/child relationships and what deleting a parent does to children.
//!
//! The store applies these rules itself, inside the deleting transaction,
//! rather than leaning on the engine's `ON DELETE` actions. The schema still
//! declares matching foreign keys so orphan inserts are rejected; a test keeps
//! the two in agreement.

use rusqlite::{Connection, ToSql};
use tracing::debug;

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteStrategy {
    /// Delete the child rows, applying their own relationships first.
    Cascade,
    /// Keep the child rows and clear the referencing column.
    Nullify,
}

#[derive(Clone, Copy, Debug)]
pub struct Relationship {
    pub parent: &'static str,
    pub child: &'static str,
    /// Column on `child` holding the parent's id.
    pub column: &'static str,
    pub strategy: DeleteStrategy,
}

pub const RELATIONSHIPS: &[Relationship] = &[
    Relationship {
        parent: "profiles",
        child: "profile_files",
        column: "profile_id",
        strategy: DeleteStrategy::Cascade,
    },
    Relationship {
        parent: "profiles",
        child: "research_records",
        column: "profile_id",
        strategy: DeleteStrategy::Cascade,
    },
    Relationship {
        parent: "profiles",
        child: "sessions",
        column: "profile_id",
        strategy: DeleteStrategy::Nullify,
    },
    Relationship {
        parent: "sessions",
        child: "session_interactions",
        column: "session_id",
        strategy: DeleteStrategy::Cascade,
    },
];

pub fn children_of(table: &str) -> impl Iterator<Item = &'static Relationship> + '_ {
    RELATIONSHIPS.iter().filter(move |r| r.parent == table)
}

/// Delete the rows of `table` matching `filter`, applying [`RELATIONSHIPS`]
/// to their children first. Returns the number of `table` rows deleted.
///
/// `filter` is a SQL boolean expression over `table`'s columns using numbered
/// parameters (`?1`, ...), so it can be nested into child filters unchanged.
/// Table and column names only ever come from static configuration.
pub fn purge(conn: &Connection, table: &str, filter: &str, params: &[&dyn ToSql]) -> Result<usize> {
    for rel in children_of(table) {
        let child_filter = format!("{} IN (SELECT id FROM {table} WHERE {filter})", rel.column);
        match rel.strategy {
            DeleteStrategy::Cascade => {
                let removed = purge(conn, rel.child, &child_filter, params)?;
                if removed > 0 {
                    debug!(parent = table, child = rel.child, removed, "cascaded delete");
                }
            }
            DeleteStrategy::Nullify => {
                let cleared = conn.execute(
                    &format!(
                        "UPDATE {} SET {col} = NULL WHERE {child_filter}",
                        rel.child,
                        col = rel.column
                    ),
                    params,
                )?;
                if cleared > 0 {
                    debug!(parent = table, child = rel.child, cleared, "nullified references");
                }
            }
        }
    }
    Ok(conn.execute(&format!("DELETE FROM {table} WHERE {filter}"), params)?)
}
