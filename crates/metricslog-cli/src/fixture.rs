//! Fixture files
//!
//! A fixture is a JSON snapshot of everything a reporting cycle reads: the
//! counter store, the live plugin inventory, plugin preferences, field
//! trials, host information, profile metrics and pending omnibox events.
//!
//! ```json
//! {
//!   "session_id": 1,
//!   "counters": { "stability.launch_count": 3, "stability.plugin_stats": [] },
//!   "plugins": [{ "name": "Flash", "path": "/usr/lib/libflash.so", "version": "11.2" }],
//!   "plugin_prefs": { "Flash": true },
//!   "field_trials": [{ "name": 1, "group": 2 }],
//!   "system": { "cpu_architecture": "x86_64", "physical_memory_mb": 4096 }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use metricslog_collect::{MemoryCounterStore, SystemSnapshot};
use metricslog_core::domain::{OmniboxLog, PluginInfo};
use metricslog_core::ports::{IPluginPrefs, NameGroupId};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Collaborator state for one reporting cycle
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub client_id: Option<String>,
    pub session_id: i32,
    pub counters: MemoryCounterStore,
    pub plugins: Vec<PluginInfo>,
    /// Enabled flag per plugin name; `None` means no preferences are loaded
    pub plugin_prefs: Option<HashMap<String, bool>>,
    pub field_trials: Vec<NameGroupId>,
    /// Fixed host answers; `None` means query the running host
    pub system: Option<SystemSnapshot>,
    pub profile_metrics: Option<Map<String, Value>>,
    pub omnibox_events: Vec<OmniboxLog>,
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }
}

/// Plugin preferences backed by a name to enabled map
///
/// Plugins missing from the map are treated as enabled.
pub struct FixturePrefs<'a>(pub &'a HashMap<String, bool>);

impl IPluginPrefs for FixturePrefs<'_> {
    fn is_enabled(&self, plugin: &PluginInfo) -> bool {
        self.0.get(&plugin.name).copied().unwrap_or(true)
    }
}
