//! In-memory counter store
//!
//! [`MemoryCounterStore`] is the [`ICounterStore`] adapter used by the CLI and
//! tests. It holds integer, string and list values keyed by dotted name and
//! can be seeded from, or written back to, a flat JSON object.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use metricslog_core::ports::ICounterStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Int(i64),
    String(String),
    List(Vec<Value>),
}

/// Counter store backed by an ordered map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryCounterStore {
    values: BTreeMap<String, StoreValue>,
}

impl MemoryCounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from a JSON object of `name -> int | string | list`.
    pub fn from_json(value: Value) -> anyhow::Result<Self> {
        serde_json::from_value(value)
            .context("counter store must be a JSON object of ints, strings and lists")
    }

    /// Load a store from a JSON file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read counter store {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_json(value)
    }

    /// Write the store as pretty JSON to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write counter store {}", path.display()))?;
        Ok(())
    }

    /// Store a string value
    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .insert(name.to_string(), StoreValue::String(value.into()));
    }

    /// Store a list value
    pub fn set_list(&mut self, name: &str, value: Vec<Value>) {
        self.values.insert(name.to_string(), StoreValue::List(value));
    }

    /// Whether any value is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl ICounterStore for MemoryCounterStore {
    fn get_int(&self, name: &str) -> i64 {
        match self.values.get(name) {
            Some(StoreValue::Int(value)) => *value,
            _ => 0,
        }
    }

    fn set_int(&mut self, name: &str, value: i64) {
        self.values.insert(name.to_string(), StoreValue::Int(value));
    }

    fn get_string(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            StoreValue::String(value) => Some(value.clone()),
            StoreValue::Int(value) => Some(value.to_string()),
            StoreValue::List(_) => None,
        }
    }

    fn get_list(&self, name: &str) -> Option<Vec<Value>> {
        match self.values.get(name)? {
            StoreValue::List(items) => Some(items.clone()),
            _ => None,
        }
    }

    fn clear(&mut self, name: &str) {
        self.values.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_absent_keys_read_as_zero() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.get_int("stability.launch_count"), 0);
        assert!(store.get_string("metrics.client_id_timestamp").is_none());
        assert!(store.get_list("stability.plugin_stats").is_none());
    }

    #[test]
    fn test_drain_int_resets() {
        let mut store = MemoryCounterStore::new();
        store.set_int("stability.crash_count", 4);
        assert_eq!(store.drain_int("stability.crash_count"), 4);
        assert_eq!(store.get_int("stability.crash_count"), 0);
    }

    #[test]
    fn test_from_json_mixed_values() {
        let store = MemoryCounterStore::from_json(json!({
            "stability.launch_count": 3,
            "metrics.client_id_timestamp": "1334000000",
            "stability.plugin_stats": [{"name": "Flash", "launches": 1}]
        }))
        .unwrap();

        assert_eq!(store.get_int("stability.launch_count"), 3);
        assert_eq!(
            store.get_string("metrics.client_id_timestamp").as_deref(),
            Some("1334000000")
        );
        assert_eq!(store.get_list("stability.plugin_stats").unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(MemoryCounterStore::from_json(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_clear_removes_value() {
        let mut store = MemoryCounterStore::new();
        store.set_list("stability.plugin_stats", vec![json!({})]);
        store.clear("stability.plugin_stats");
        assert!(!store.contains("stability.plugin_stats"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");

        let mut store = MemoryCounterStore::new();
        store.set_int("stability.page_load_count", 12);
        store.set_string("metrics.client_id_timestamp", "42");
        store.save(&path).unwrap();

        let loaded = MemoryCounterStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(MemoryCounterStore::load(Path::new("/nonexistent/counters.json")).is_err());
    }
}
