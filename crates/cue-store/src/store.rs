//! [`StorageManager`]: the only way application code touches the database.
//!
//! Every call checks out one pooled connection and runs as its own unit:
//! writes in a `BEGIN IMMEDIATE` transaction that is committed or rolled back
//! before the call returns, reads on the bare connection. Failures are logged
//! with their cause. Writes surface them as `Err`; reads degrade to `None` or
//! an empty list so one bad query never takes down a listing screen.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use cue_core::{
    Entity, InteractionId, Profile, ProfileFile, ProfileFileId, ProfileId, ResearchId,
    ResearchRecord, Session, SessionId, SessionInteraction,
};
use cue_settings::DatabaseSettings;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{error, info};

use crate::connection::{self, ConnectionConfig, ConnectionPool};
use crate::error::{Result, StoreError};
use crate::migrations;
use crate::relations::purge;
use crate::repositories::{self as repo, ListSessionsOptions, Stored, SESSION_START_BEFORE};

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub connection: ConnectionConfig,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connection: ConnectionConfig::default(),
        }
    }

    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self {
            path: settings.path.clone(),
            connection: ConnectionConfig {
                pool_size: settings.pool_size,
                busy_timeout_ms: settings.busy_timeout_ms,
                connection_timeout: Duration::from_secs(settings.connection_timeout_secs),
            },
        }
    }
}

/// Row counts per table plus the size of the database file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub profiles: u64,
    pub profile_files: u64,
    pub research_records: u64,
    pub sessions: u64,
    pub interactions: u64,
    pub db_size_bytes: u64,
}

/// Handle to one database file. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct StorageManager {
    pool: ConnectionPool,
    path: PathBuf,
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("path", &self.path)
            .field("pool_size", &self.pool.max_size())
            .finish()
    }
}

impl StorageManager {
    /// Create the parent directory, open the pool and bring the schema up to
    /// date. The manager is only returned once migrations have succeeded.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Self::open_inner(config).inspect_err(|e| {
            error!(path = %config.path.display(), error = %e, "failed to open storage");
        })
    }

    fn open_inner(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create {}: {e}", parent.display())))?;
        }

        let pool = connection::new_file(&config.path, &config.connection)?;
        let applied = {
            let conn = pool.get()?;
            migrations::apply_migrations(&conn)?
        };
        info!(
            path = %config.path.display(),
            applied,
            version = migrations::latest_version(),
            "storage ready"
        );
        Ok(Self {
            pool,
            path: config.path.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version of the open database.
    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.pool.get()?;
        migrations::current_version(&conn)
    }

    // ── Profiles ────────────────────────────────────────────────────────

    pub fn create_profile(&self, profile: &Profile) -> Result<()> {
        self.insert("create_profile", profile)
    }

    pub fn get_profile(&self, id: &ProfileId) -> Option<Profile> {
        self.get("get_profile", id.as_str())
    }

    /// Newest first.
    pub fn list_profiles(&self) -> Vec<Profile> {
        self.list("list_profiles", None, None)
    }

    /// Replace every field of the stored profile and bump `updated_at`.
    /// The caller's `updated_at` only moves when a row was written.
    pub fn update_profile(&self, profile: &mut Profile) -> Result<bool> {
        let mut touched = profile.clone();
        touched.touch();
        let updated = self.replace("update_profile", &touched)?;
        if updated {
            profile.updated_at = touched.updated_at;
        }
        Ok(updated)
    }

    /// Delete a profile with its files and research. Sessions that referenced
    /// it are kept and unlinked.
    pub fn delete_profile(&self, id: &ProfileId) -> Result<bool> {
        self.delete_by_id("delete_profile", Profile::TABLE, id.as_str())
    }

    // ── Profile files ───────────────────────────────────────────────────

    pub fn create_profile_file(&self, file: &ProfileFile) -> Result<()> {
        self.insert("create_profile_file", file)
    }

    pub fn get_profile_file(&self, id: &ProfileFileId) -> Option<ProfileFile> {
        self.get("get_profile_file", id.as_str())
    }

    /// Newest upload first.
    pub fn list_profile_files(&self, profile_id: Option<&ProfileId>) -> Vec<ProfileFile> {
        self.list("list_profile_files", profile_id.map(ProfileId::as_str), None)
    }

    pub fn update_profile_file(&self, file: &ProfileFile) -> Result<bool> {
        self.replace("update_profile_file", file)
    }

    pub fn delete_profile_file(&self, id: &ProfileFileId) -> Result<bool> {
        self.delete_by_id("delete_profile_file", ProfileFile::TABLE, id.as_str())
    }

    // ── Research ────────────────────────────────────────────────────────

    pub fn create_research(&self, record: &ResearchRecord) -> Result<()> {
        self.insert("create_research", record)
    }

    pub fn get_research(&self, id: &ResearchId) -> Option<ResearchRecord> {
        self.get("get_research", id.as_str())
    }

    /// Most recently conducted first.
    pub fn list_research(&self, profile_id: Option<&ProfileId>) -> Vec<ResearchRecord> {
        self.list("list_research", profile_id.map(ProfileId::as_str), None)
    }

    pub fn update_research(&self, record: &ResearchRecord) -> Result<bool> {
        self.replace("update_research", record)
    }

    pub fn set_research_appended(&self, id: &ResearchId, appended: bool) -> Result<bool> {
        self.write("set_research_appended", |conn| {
            repo::set_appended(conn, id.as_str(), appended)
        })
    }

    pub fn delete_research(&self, id: &ResearchId) -> Result<bool> {
        self.delete_by_id("delete_research", ResearchRecord::TABLE, id.as_str())
    }

    // ── Sessions ────────────────────────────────────────────────────────

    pub fn create_session(&self, session: &Session) -> Result<()> {
        self.insert("create_session", session)
    }

    pub fn get_session(&self, id: &SessionId) -> Option<Session> {
        self.get("get_session", id.as_str())
    }

    /// Most recently started first.
    pub fn list_sessions(&self, opts: &ListSessionsOptions) -> Vec<Session> {
        self.list(
            "list_sessions",
            opts.profile_id.as_ref().map(ProfileId::as_str),
            opts.limit,
        )
    }

    pub fn update_session(&self, session: &Session) -> Result<bool> {
        self.replace("update_session", session)
    }

    /// End a stored session now. Only `end_time` and `duration_seconds` change.
    pub fn finalize_session(&self, id: &SessionId) -> Result<bool> {
        self.write("finalize_session", |conn| repo::finalize(conn, id.as_str()))
    }

    /// Delete a session and its interactions.
    pub fn delete_session(&self, id: &SessionId) -> Result<bool> {
        self.delete_by_id("delete_session", Session::TABLE, id.as_str())
    }

    // ── Interactions ────────────────────────────────────────────────────

    pub fn create_interaction(&self, interaction: &SessionInteraction) -> Result<()> {
        self.insert("create_interaction", interaction)
    }

    pub fn get_interaction(&self, id: &InteractionId) -> Option<SessionInteraction> {
        self.get("get_interaction", id.as_str())
    }

    /// Oldest first.
    pub fn list_interactions(&self, session_id: Option<&SessionId>) -> Vec<SessionInteraction> {
        self.list("list_interactions", session_id.map(SessionId::as_str), None)
    }

    pub fn update_interaction(&self, interaction: &SessionInteraction) -> Result<bool> {
        self.replace("update_interaction", interaction)
    }

    pub fn delete_interaction(&self, id: &InteractionId) -> Result<bool> {
        self.delete_by_id(
            "delete_interaction",
            SessionInteraction::TABLE,
            id.as_str(),
        )
    }

    // ── Utilities ───────────────────────────────────────────────────────

    /// Row counts and on-disk size. Counts degrade to zero on failure.
    pub fn stats(&self) -> StoreStats {
        let counts = self.read("stats", |conn| {
            Ok(StoreStats {
                profiles: repo::count(conn, Profile::TABLE)?,
                profile_files: repo::count(conn, ProfileFile::TABLE)?,
                research_records: repo::count(conn, ResearchRecord::TABLE)?,
                sessions: repo::count(conn, Session::TABLE)?,
                interactions: repo::count(conn, SessionInteraction::TABLE)?,
                db_size_bytes: 0,
            })
        });
        StoreStats {
            db_size_bytes: self.file_size(),
            ..counts.unwrap_or_default()
        }
    }

    /// Main database file plus its write-ahead log.
    fn file_size(&self) -> u64 {
        let mut wal = self.path.clone().into_os_string();
        wal.push("-wal");
        [self.path.as_os_str(), wal.as_os_str()]
            .into_iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum()
    }

    /// Delete sessions that started more than `days` days ago, with their
    /// interactions. Returns how many sessions were removed.
    pub fn cleanup_old_sessions(&self, days: u32) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let cutoff = cue_core::time::format_timestamp(&cutoff);
        let removed = self.write("cleanup_old_sessions", |conn| {
            purge(conn, Session::TABLE, SESSION_START_BEFORE, &[&cutoff])
        })?;
        info!(days, removed, "old sessions cleaned up");
        Ok(removed)
    }

    // ── Internal ────────────────────────────────────────────────────────

    /// Run `f` in an immediate transaction on a pooled connection.
    fn write<T>(&self, op: &'static str, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let result = self.in_transaction(f);
        if let Err(e) = &result {
            error!(op, error = %e, "storage write failed");
        }
        result
    }

    fn in_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.pool.get()?;
        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn read<T>(&self, op: &'static str, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let result = self.pool.get().map_err(StoreError::from).and_then(|conn| f(&conn));
        if let Err(e) = &result {
            error!(op, error = %e, "storage read failed");
        }
        result
    }

    fn insert<E: Stored>(&self, op: &'static str, entity: &E) -> Result<()> {
        self.write(op, |conn| repo::insert(conn, entity))?;
        info!(op, id = entity.id(), "created");
        Ok(())
    }

    fn replace<E: Stored>(&self, op: &'static str, entity: &E) -> Result<bool> {
        self.write(op, |conn| repo::replace(conn, entity))
    }

    fn get<E: Stored>(&self, op: &'static str, id: &str) -> Option<E> {
        self.read(op, |conn| repo::get(conn, id)).ok().flatten()
    }

    fn list<E: Stored>(&self, op: &'static str, owner: Option<&str>, limit: Option<u32>) -> Vec<E> {
        self.read(op, |conn| repo::list(conn, owner, limit))
            .unwrap_or_default()
    }

    fn delete_by_id(&self, op: &'static str, table: &'static str, id: &str) -> Result<bool> {
        let removed = self.write(op, |conn| purge(conn, table, "id = ?1", &[&id]))?;
        if removed > 0 {
            info!(op, id, "deleted");
        }
        Ok(removed > 0)
    }
}
