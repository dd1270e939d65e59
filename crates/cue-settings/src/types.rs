//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`: missing
//! fields in the JSON file take their compiled default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "personalContext": "Backend engineer, 5 years",
///   "database": { "busyTimeoutMs": 5000 },
///   "data": { "autoDeleteSessionsDays": 30 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CueSettings {
    /// Free text about the user, placed after the universal prompt.
    pub personal_context: String,
    /// Replacement for the bundled universal prompt. Blank uses the bundled one.
    pub universal_system_prompt: String,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub data: DataSettings,
}

impl CueSettings {
    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue(
                "database.path must not be empty".into(),
            ));
        }
        if self.database.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "database.poolSize must be at least 1".into(),
            ));
        }
        if self.data.auto_delete_sessions_days == Some(0) {
            return Err(SettingsError::InvalidValue(
                "data.autoDeleteSessionsDays must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file. Parent directories are created on open.
    pub path: PathBuf,
    /// Upper bound on waiting for a pooled connection.
    pub connection_timeout_secs: u64,
    /// SQLite `busy_timeout`: how long a write waits on a locked database.
    pub busy_timeout_ms: u64,
    pub pool_size: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: crate::loader::settings_dir().join("database.db"),
            connection_timeout_secs: 30,
            busy_timeout_ms: 30_000,
            pool_size: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSettings {
    /// Sessions that started more than this many days ago are removed by the
    /// retention pass. `None` keeps everything.
    pub auto_delete_sessions_days: Option<u32>,
}
