//! Plugin types
//!
//! A [`PluginInfo`] describes a plugin currently loaded in the live
//! inventory. A [`PluginStat`] is one persisted per-plugin stability record,
//! stored as a dictionary in the counter store's plugin stats list.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Counter store key of the persisted per-plugin stats list
pub const PLUGIN_STATS_KEY: &str = "stability.plugin_stats";

/// Dictionary keys of a persisted plugin stat entry
pub const PLUGIN_NAME_KEY: &str = "name";
pub const PLUGIN_LAUNCHES_KEY: &str = "launches";
pub const PLUGIN_INSTANCES_KEY: &str = "instances";
pub const PLUGIN_CRASHES_KEY: &str = "crashes";

/// A plugin in the live inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Display name; the correlation key for persisted stats
    pub name: String,
    /// Full path of the plugin binary
    pub path: PathBuf,
    pub version: String,
}

impl PluginInfo {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            version: version.into(),
        }
    }

    /// Base name of the plugin binary; empty when the path has none
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// One persisted per-plugin stability record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStat {
    pub name: String,
    pub launches: i64,
    pub instances: i64,
    pub crashes: i64,
}

impl PluginStat {
    /// Parse a stat dictionary. Returns `None` when `value` is not a dictionary.
    ///
    /// Missing or non-integer counts read as 0; a missing name reads as empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let dict = value.as_object()?;
        let int = |key: &str| dict.get(key).and_then(Value::as_i64).unwrap_or(0);

        Some(Self {
            name: dict
                .get(PLUGIN_NAME_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            launches: int(PLUGIN_LAUNCHES_KEY),
            instances: int(PLUGIN_INSTANCES_KEY),
            crashes: int(PLUGIN_CRASHES_KEY),
        })
    }
}
