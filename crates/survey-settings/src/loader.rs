//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SurveySettings::default()`]
//! 2. If `~/.survey/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::SurveySettings;

/// Resolve the path to the settings file (`~/.survey/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".survey").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SurveySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<SurveySettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Defaults merged with the file at `path`, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<SurveySettings> {
    let defaults = serde_json::to_value(SurveySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
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

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (falling back to file/default).
pub fn apply_env_overrides(settings: &mut SurveySettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary lookup. Split out so the parsing rules
/// are testable without touching the process environment.
pub fn apply_overrides(settings: &mut SurveySettings, lookup: impl Fn(&str) -> Option<String>) {
    let read_string = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let read_u64 = |name: &str, min: u64, max: u64| {
        let val = lookup(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    };
    let read_bool = |name: &str| {
        let val = lookup(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    };

    // ── Gateway ─────────────────────────────────────────────────────
    if let Some(v) = read_string("SURVEY_ENDPOINT_URL") {
        settings.gateway.endpoint_url = v;
    }
    if let Some(v) = read_u64("SURVEY_CONNECT_TIMEOUT_MS", 100, 600_000) {
        settings.gateway.connect_timeout_ms = v;
    }

    // ── Export ──────────────────────────────────────────────────────
    if let Some(v) = read_string("SURVEY_OUTPUT_DIR") {
        settings.export.output_dir = v;
    }

    // ── Display / notifications / logging ───────────────────────────
    if let Some(v) = read_string("SURVEY_UTC_OFFSET") {
        settings.display.utc_offset = Some(v);
    }
    if let Some(v) = read_u64("SURVEY_NOTIFICATION_RESET_MS", 0, 3_600_000) {
        settings.notification.reset_after_ms = v;
    }
    if let Some(v) = read_string("SURVEY_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_bool("SURVEY_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "gateway": {"endpointUrl": "https://a.test", "connectTimeoutMs": 1000}
        });
        let source = serde_json::json!({
            "gateway": {"endpointUrl": "https://b.test"}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["gateway"]["endpointUrl"], "https://b.test");
        assert_eq!(merged["gateway"]["connectTimeoutMs"], 1000);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"a": null});
        assert_eq!(deep_merge(target, source)["a"], 1);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"a": [1, 2, 3]});
        let source = serde_json::json!({"a": [4]});
        assert_eq!(deep_merge(target, source)["a"], serde_json::json!([4]));
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_file_layer(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, SurveySettings::default());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"export": {"outputDir": "/srv/exports"}, "notification": {"resetAfterMs": 250}}"#,
        )
        .unwrap();
        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.export.output_dir, "/srv/exports");
        assert_eq!(settings.export.sheet_name, "SurveyData");
        assert_eq!(settings.notification.reset_after_ms, 250);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_file_layer(&path).unwrap_err();
        assert!(matches!(&err, SettingsError::Parse { path: p, .. } if *p == path));
    }

    #[test]
    fn wrongly_typed_value_is_a_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"gateway": {"connectTimeoutMs": "soon"}}"#).unwrap();
        assert!(matches!(load_file_layer(&path), Err(SettingsError::Shape(_))));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory exists but cannot be read as a file
        let err = load_file_layer(dir.path()).unwrap_err();
        assert_eq!(err.error_kind(), "read");
    }

    // ── overrides ───────────────────────────────────────────────────

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn overrides_apply() {
        let mut settings = SurveySettings::default();
        apply_overrides(
            &mut settings,
            lookup(&[
                ("SURVEY_ENDPOINT_URL", "https://mirror.test/exec"),
                ("SURVEY_CONNECT_TIMEOUT_MS", "2500"),
                ("SURVEY_UTC_OFFSET", "+05:30"),
                ("SURVEY_LOG_JSON", "yes"),
            ]),
        );
        assert_eq!(settings.gateway.endpoint_url, "https://mirror.test/exec");
        assert_eq!(settings.gateway.connect_timeout_ms, 2500);
        assert_eq!(settings.display.utc_offset.as_deref(), Some("+05:30"));
        assert!(settings.logging.json);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut settings = SurveySettings::default();
        apply_overrides(
            &mut settings,
            lookup(&[
                ("SURVEY_CONNECT_TIMEOUT_MS", "soon"),
                ("SURVEY_NOTIFICATION_RESET_MS", "99999999999"),
                ("SURVEY_OUTPUT_DIR", "   "),
                ("SURVEY_LOG_JSON", "maybe"),
            ]),
        );
        assert_eq!(settings, SurveySettings::default());
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for v in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "No", "off"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_u64_bounds() {
        assert_eq!(parse_u64_range("500", 100, 1000), Some(500));
        assert_eq!(parse_u64_range("99", 100, 1000), None);
        assert_eq!(parse_u64_range("1001", 100, 1000), None);
        assert_eq!(parse_u64_range("-1", 0, 10), None);
    }
}
