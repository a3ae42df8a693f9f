//! In-memory key/value store of JSON settings.
//!
//! Values arriving as raw text are kept as JSON when they look like an
//! object or array and as a JSON string otherwise.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

/// A setting as it appears in a seed file or an upsert request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInput {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    entries: BTreeMap<String, Setting>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.entries.get(key)
    }

    pub fn fallback(&self, key: &str, fallback: Value) -> Value {
        self.get(key).map(|s| s.value.clone()).unwrap_or(fallback)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or overwrites a setting.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &Setting {
        let key = key.into();
        debug!(key = %key, "setting updated");
        let setting = Setting {
            key: key.clone(),
            value,
            updated_at: Utc::now(),
        };
        self.entries.insert(key.clone(), setting);
        &self.entries[&key]
    }

    pub fn set_multiple(&mut self, settings: impl IntoIterator<Item = SettingInput>) {
        for setting in settings {
            self.set(setting.key, setting.value);
        }
    }

    /// All settings ordered by key.
    pub fn all(&self) -> Vec<Setting> {
        self.entries.values().cloned().collect()
    }
}

/// Parses raw setting text: object/array text becomes JSON, anything else
/// (including text that only looks like JSON) is stored as a string.
pub fn raw_to_value(raw: &str) -> Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

/// Reads a JSON array of `{key, value}` settings.
pub fn load_seed_file(path: &Path) -> Result<Vec<SettingInput>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;
    let seeds: Vec<SettingInput> = serde_json::from_str(&text)
        .with_context(|| format!("Seed file '{}' is not a JSON settings array", path.display()))?;
    info!(count = seeds.len(), path = %path.display(), "Loaded seed settings");
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    // ── store ───────────────────────────────────────────────────────────────

    #[test]
    fn test_set_then_get() {
        let mut store = SettingsStore::new();
        store.set("contest", json!("nwerc"));
        assert!(store.has("contest"));
        assert_eq!(store.get("contest").unwrap().value, json!("nwerc"));
        assert_eq!(store.fallback("contest", json!("other")), json!("nwerc"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = SettingsStore::new();
        store.set("k", json!(1));
        store.set("k", json!({"a": 2}));
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.get("k").unwrap().value, json!({"a": 2}));
    }

    #[test]
    fn test_fallback_for_missing_key() {
        let store = SettingsStore::new();
        assert!(!store.has("missing"));
        assert_eq!(store.fallback("missing", json!("fb")), json!("fb"));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_set_multiple_and_all_sorted() {
        let mut store = SettingsStore::new();
        store.set_multiple(vec![
            SettingInput {
                key: "b".into(),
                value: json!(2),
            },
            SettingInput {
                key: "a".into(),
                value: json!(1),
            },
        ]);
        let keys: Vec<String> = store.all().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    // ── raw values ──────────────────────────────────────────────────────────

    #[test]
    fn test_raw_json_object_is_parsed() {
        assert_eq!(raw_to_value(r#"{"x": 1}"#), json!({"x": 1}));
        assert_eq!(raw_to_value("[1,2]"), json!([1, 2]));
    }

    #[test]
    fn test_raw_scalar_is_string() {
        assert_eq!(raw_to_value("42"), json!("42"));
        assert_eq!(raw_to_value("hello"), json!("hello"));
        assert_eq!(raw_to_value("{broken"), json!("{broken"));
    }

    // ── seed file ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"key":"title","value":"Finals"}},{{"key":"teamarea","value":{{"seatNum":4}}}}]"#
        )
        .unwrap();

        let seeds = load_seed_file(file.path()).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].key, "title");
        assert_eq!(seeds[1].value["seatNum"], 4);
    }

    #[test]
    fn test_load_seed_file_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"key":"title"}}"#).unwrap();
        let err = load_seed_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("not a JSON settings array"));
    }
}
