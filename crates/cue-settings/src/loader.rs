//! Settings loading with deep merge and environment variable overrides.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::CueSettings;

/// `~/.cue`, the directory holding settings and the default database.
pub fn settings_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".cue")
}

pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<CueSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON, or values rejected by
/// [`CueSettings::validate`], are errors.
pub fn load_settings_from_path(path: &Path) -> Result<CueSettings> {
    let defaults = serde_json::to_value(CueSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: CueSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Write settings as pretty JSON, creating the parent directory.
pub fn save_settings_to_path(settings: &CueSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    debug!(?path, "settings saved");
    Ok(())
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `CUE_*` environment variable overrides.
///
/// Invalid values are ignored with a warning and the file/default value
/// stays in place.
pub fn apply_env_overrides(settings: &mut CueSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

fn apply_overrides_from(settings: &mut CueSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    if let Some(v) = env.string("CUE_DB_PATH") {
        settings.database.path = PathBuf::from(v);
    }
    if let Some(v) = env.u64("CUE_DB_POOL_SIZE", 1, 64) {
        // bounded above, the cast cannot truncate
        settings.database.pool_size = v as u32;
    }
    if let Some(v) = env.u64("CUE_DB_TIMEOUT_SECS", 1, 3600) {
        settings.database.connection_timeout_secs = v;
    }
    if let Some(v) = env.string("CUE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("CUE_LOG_JSON") {
        settings.logging.json = v;
    }
    if let Some(v) = env.u64("CUE_AUTO_DELETE_SESSIONS_DAYS", 1, 36_500) {
        settings.data.auto_delete_sessions_days = Some(v as u32);
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid integer env var, ignoring");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"database": {"poolSize": 8, "busyTimeoutMs": 30000}});
        let source = serde_json::json!({"database": {"poolSize": 2}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["database"]["poolSize"], 2);
        assert_eq!(merged["database"]["busyTimeoutMs"], 30000);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4, 5]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4, 5]));
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── load / save ─────────────────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings.database.pool_size, 8);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"personalContext": "Staff engineer", "data": {"autoDeleteSessionsDays": 30}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.personal_context, "Staff engineer");
        assert_eq!(settings.data.auto_delete_sessions_days, Some(30));
        assert_eq!(settings.database.connection_timeout_secs, 30);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();
        assert_matches!(load_settings_from_path(&path), Err(SettingsError::Json(_)));
    }

    #[test]
    fn load_rejects_zero_pool_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": {"poolSize": 0}}"#).unwrap();
        assert_matches!(
            load_settings_from_path(&path),
            Err(SettingsError::InvalidValue(_))
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = CueSettings::default();
        settings.personal_context = "Prefers concise answers".into();
        settings.database.path = dir.path().join("cue.db");

        save_settings_to_path(&settings, &path).unwrap();
        let loaded = load_settings_from_path(&path).unwrap();
        assert_eq!(loaded.personal_context, settings.personal_context);
        assert_eq!(loaded.database.path, settings.database.path);
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn env_overrides_apply() {
        let mut s = CueSettings::default();
        apply_overrides_from(
            &mut s,
            env(&[
                ("CUE_DB_PATH", "/var/lib/cue/db.sqlite"),
                ("CUE_DB_POOL_SIZE", "4"),
                ("CUE_DB_TIMEOUT_SECS", "5"),
                ("CUE_LOG_LEVEL", "debug"),
                ("CUE_LOG_JSON", "yes"),
                ("CUE_AUTO_DELETE_SESSIONS_DAYS", "14"),
            ]),
        );
        assert_eq!(s.database.path, PathBuf::from("/var/lib/cue/db.sqlite"));
        assert_eq!(s.database.pool_size, 4);
        assert_eq!(s.database.connection_timeout_secs, 5);
        assert_eq!(s.logging.level, "debug");
        assert!(s.logging.json);
        assert_eq!(s.data.auto_delete_sessions_days, Some(14));
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut s = CueSettings::default();
        apply_overrides_from(
            &mut s,
            env(&[
                ("CUE_DB_POOL_SIZE", "0"),
                ("CUE_DB_TIMEOUT_SECS", "soon"),
                ("CUE_LOG_JSON", "maybe"),
                ("CUE_DB_PATH", ""),
            ]),
        );
        assert_eq!(s, CueSettings::default());
    }

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nope"), None);
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("64", 1, 64), Some(64));
        assert_eq!(parse_u64_range("65", 1, 64), None);
        assert_eq!(parse_u64_range("-1", 1, 64), None);
    }
}
