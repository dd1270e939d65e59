//! Schema migration runner.
//!
//! Migrations are embedded at compile time via [`include_str!`] and applied
//! in version order. The whole pending batch runs inside one `IMMEDIATE`
//! transaction: a failing script rolls back every script and tracking row of
//! the batch, leaving the database at its previous version.
//!
//! Shipped migrations are never edited or reordered. New schema changes are
//! appended with the next version number.

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// A single migration with a version number and SQL to execute.
#[derive(Clone, Copy, Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// All migrations in version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: include_str!("v001_initial_schema.sql"),
    },
    Migration {
        version: 2,
        name: "add_indexes",
        sql: include_str!("v002_add_indexes.sql"),
    },
    Migration {
        version: 3,
        name: "add_research",
        sql: include_str!("v003_add_research.sql"),
    },
];

const TRACKING_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    name       TEXT    NOT NULL,
    applied_at TEXT    NOT NULL
);";

/// A row of the tracking table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub applied_at: String,
}

/// Apply every shipped migration newer than the database. Returns how many ran.
pub fn apply_migrations(conn: &Connection) -> Result<u32> {
    apply(conn, MIGRATIONS)
}

/// Apply `migrations` (validated first) in one transaction.
///
/// # Errors
///
/// [`StoreError::Migration`] if the list is misordered or any script fails.
/// Nothing is persisted in either case.
pub fn apply(conn: &Connection, migrations: &[Migration]) -> Result<u32> {
    validate(migrations)?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        StoreError::Migration {
            message: format!("failed to begin migration transaction: {e}"),
        }
    })?;

    tx.execute_batch(TRACKING_TABLE_SQL)
        .map_err(|e| StoreError::Migration {
            message: format!("failed to create schema_migrations table: {e}"),
        })?;
    let current = max_version(&tx)?;
    let mut applied = 0;
    let mut version = current;

    for migration in migrations {
        if migration.version <= current {
            debug!(
                version = migration.version,
                name = migration.name,
                "migration already applied, skipping"
            );
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "applying migration"
        );
        run_one(&tx, migration)?;
        applied += 1;
        version = migration.version;
    }

    tx.commit().map_err(|e| StoreError::Migration {
        message: format!("failed to commit migrations: {e}"),
    })?;

    if applied > 0 {
        info!(applied, version, "migrations complete");
    }
    Ok(applied)
}

/// Highest applied version, or 0 when nothing (not even the tracking table)
/// exists yet.
pub fn current_version(conn: &Connection) -> Result<u32> {
    if !tracking_table_exists(conn)? {
        return Ok(0);
    }
    max_version(conn)
}

/// Latest version defined in code.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Tracking rows in version order. Empty on a fresh database.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<AppliedMigration>> {
    if !tracking_table_exists(conn)? {
        return Ok(Vec::new());
    }
    let mut stmt =
        conn.prepare("SELECT version, name, applied_at FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| {
        Ok(AppliedMigration {
            version: row.get(0)?,
            name: row.get(1)?,
            applied_at: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal
// ─────────────────────────────────────────────────────────────────────────────

fn validate(migrations: &[Migration]) -> Result<()> {
    let mut previous = 0;
    for m in migrations {
        let in_order = if previous == 0 {
            m.version == 1
        } else {
            m.version > previous
        };
        if !in_order {
            return Err(StoreError::Migration {
                message: format!(
                    "migration list out of order: v{} ({}) follows v{previous}",
                    m.version, m.name
                ),
            });
        }
        previous = m.version;
    }
    Ok(())
}

fn tracking_table_exists(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
            [],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn max_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| StoreError::Migration {
        message: format!("failed to read schema_migrations: {e}"),
    })
}

fn run_one(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute_batch(migration.sql)
        .map_err(|e| StoreError::Migration {
            message: format!(
                "migration v{} ({}) failed: {e}",
                migration.version, migration.name
            ),
        })?;

    let _ = conn
        .execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                migration.version,
                migration.name,
                cue_core::time::format_timestamp(&cue_core::time::now()),
            ],
        )
        .map_err(|e| StoreError::Migration {
            message: format!(
                "failed to record v{} in schema_migrations: {e}",
                migration.version
            ),
        })?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn open_memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn fresh_database_is_version_zero() {
        let conn = open_memory();
        assert_eq!(current_version(&conn).unwrap(), 0);
        assert!(applied_migrations(&conn).unwrap().is_empty());
    }

    #[test]
    fn creates_all_tables() {
        let conn = open_memory();
        assert_eq!(apply_migrations(&conn).unwrap(), 3);
        assert_eq!(
            table_names(&conn),
            [
                "profile_files",
                "profiles",
                "research_records",
                "schema_migrations",
                "session_interactions",
                "sessions",
            ]
        );
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn second_run_applies_nothing() {
        let conn = open_memory();
        assert_eq!(apply_migrations(&conn).unwrap(), 3);
        assert_eq!(apply_migrations(&conn).unwrap(), 0);
        assert_eq!(current_version(&conn).unwrap(), 3);
    }

    #[test]
    fn records_names_in_order() {
        let conn = open_memory();
        apply_migrations(&conn).unwrap();
        let names: Vec<_> = applied_migrations(&conn)
            .unwrap()
            .into_iter()
            .map(|m| (m.version, m.name))
            .collect();
        assert_eq!(
            names,
            [
                (1, "initial_schema".to_string()),
                (2, "add_indexes".to_string()),
                (3, "add_research".to_string()),
            ]
        );
    }

    #[test]
    fn applies_only_pending_versions() {
        let conn = open_memory();
        assert_eq!(apply(&conn, &MIGRATIONS[..1]).unwrap(), 1);
        assert_eq!(current_version(&conn).unwrap(), 1);
        assert_eq!(apply_migrations(&conn).unwrap(), 2);
        assert_eq!(current_version(&conn).unwrap(), 3);
    }

    #[test]
    fn failing_script_rolls_back_whole_batch() {
        let conn = open_memory();
        let migrations = [
            Migration {
                version: 1,
                name: "good",
                sql: "CREATE TABLE widgets (id TEXT PRIMARY KEY);",
            },
            Migration {
                version: 2,
                name: "bad",
                sql: "CREATE INDEX idx_missing ON no_such_table(id);",
            },
        ];

        let err = apply(&conn, &migrations).unwrap_err();
        assert_matches!(&err, StoreError::Migration { message } if message.contains("v2 (bad)"));
        assert_eq!(current_version(&conn).unwrap(), 0);
        assert!(!table_names(&conn).contains(&"widgets".to_string()));
    }

    #[test]
    fn misordered_list_is_rejected_before_running() {
        let conn = open_memory();
        let migrations = [
            Migration {
                version: 2,
                name: "second",
                sql: "CREATE TABLE b (id TEXT);",
            },
            Migration {
                version: 1,
                name: "first",
                sql: "CREATE TABLE a (id TEXT);",
            },
        ];
        assert_matches!(apply(&conn, &migrations), Err(StoreError::Migration { .. }));
        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn duplicate_versions_are_rejected() {
        let conn = open_memory();
        let migrations = [
            Migration {
                version: 1,
                name: "a",
                sql: "",
            },
            Migration {
                version: 1,
                name: "b",
                sql: "",
            },
        ];
        assert_matches!(apply(&conn, &migrations), Err(StoreError::Migration { .. }));
    }

    #[test]
    fn shipped_list_is_valid() {
        validate(MIGRATIONS).unwrap();
        assert_eq!(latest_version(), 3);
    }
}
