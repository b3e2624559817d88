//! Plugin inventory and plugin stability
//!
//! [`PluginStabilityCorrelator`] joins the per-plugin stability stats
//! persisted in the counter store with the live plugin inventory. Matching is
//! by exact display name. The legacy encoding only ever sees hashed names;
//! the structured encoding carries the raw descriptor.
//!
//! The persisted list is consumed by a single pass: it is cleared afterwards
//! whether or not every entry found a live plugin.

use metricslog_core::domain::profile::{Plugin, PluginStability};
use metricslog_core::domain::{Fact, PluginInfo, PluginStat, Report, ReportError, PLUGIN_STATS_KEY};
use metricslog_core::domain::{Element, StructuredLog};
use metricslog_core::ports::{ICounterStore, IPluginPrefs};

use crate::hashing::hash_name;

/// Structured descriptor of a live plugin
fn describe(plugin: &PluginInfo, prefs: Option<&dyn IPluginPrefs>) -> Plugin {
    Plugin {
        name: plugin.name.clone(),
        filename: plugin.file_name(),
        version: plugin.version.clone(),
        is_disabled: prefs.map(|p| !p.is_enabled(plugin)),
    }
}

// ============================================================================
// Facts
// ============================================================================

/// One live plugin, as listed in the environment
struct PluginListingFact {
    legacy_name: String,
    legacy_filename: String,
    plugin: Plugin,
}

impl PluginListingFact {
    fn new(plugin: &PluginInfo, prefs: Option<&dyn IPluginPrefs>) -> Self {
        Self {
            legacy_name: hash_name(&plugin.name),
            legacy_filename: hash_name(&plugin.file_name()),
            plugin: describe(plugin, prefs),
        }
    }
}

impl Fact for PluginListingFact {
    fn write_legacy(&self, element: &mut Element) {
        element.push_attribute("name", self.legacy_name.clone());
        element.push_attribute("filename", self.legacy_filename.clone());
        element.push_attribute("version", self.plugin.version.clone());
        if let Some(disabled) = self.plugin.is_disabled {
            element.push_attribute("disabled", if disabled { "1" } else { "0" });
        }
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        log.system_profile.plugins.push(self.plugin.clone());
    }
}

/// One persisted stat correlated with its live plugin
struct PluginStabilityFact {
    hashed_name: String,
    stability: PluginStability,
}

impl Fact for PluginStabilityFact {
    fn write_legacy(&self, element: &mut Element) {
        element.push_attribute("filename", self.hashed_name.clone());
        element.push_attribute("launchcount", self.stability.launch_count.to_string());
        element.push_attribute("instancecount", self.stability.instance_count.to_string());
        element.push_attribute("crashcount", self.stability.crash_count.to_string());
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        log.system_profile
            .stability_mut()
            .plugin_stability
            .push(self.stability.clone());
    }
}

// ============================================================================
// Plugin list
// ============================================================================

/// Write the `plugins` element listing every live plugin.
pub fn write_plugin_list(
    report: &mut Report,
    plugins: &[PluginInfo],
    prefs: Option<&dyn IPluginPrefs>,
) -> Result<(), ReportError> {
    let mut list = report.open_scope("plugins")?;
    for plugin in plugins {
        let mut element = list.open_scope("plugin")?;
        element.record(&PluginListingFact::new(plugin, prefs))?;
    }
    Ok(())
}

// ============================================================================
// PluginStabilityCorrelator
// ============================================================================

/// Correlates persisted plugin stats with the live plugin inventory
pub struct PluginStabilityCorrelator<'a> {
    plugins: &'a [PluginInfo],
    prefs: Option<&'a dyn IPluginPrefs>,
}

impl<'a> PluginStabilityCorrelator<'a> {
    pub fn new(plugins: &'a [PluginInfo], prefs: Option<&'a dyn IPluginPrefs>) -> Self {
        Self { plugins, prefs }
    }

    fn find_live(&self, name: &str) -> Option<&'a PluginInfo> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Write the `plugins` element of the stability block and clear the
    /// persisted stats.
    ///
    /// Returns the number of entries written. An absent stats list writes
    /// nothing and returns 0.
    pub fn write_plugin_stability(
        &self,
        report: &mut Report,
        store: &mut dyn ICounterStore,
    ) -> Result<usize, ReportError> {
        report.ensure_building("write_plugin_stability")?;

        let Some(entries) = store.get_list(PLUGIN_STATS_KEY) else {
            return Ok(0);
        };

        let mut written = 0;
        {
            let mut plugins = report.open_scope("plugins")?;
            for entry in &entries {
                let Some(stat) = PluginStat::from_value(entry) else {
                    tracing::warn!(entry = %entry, "Skipping malformed plugin stat");
                    continue;
                };

                let hashed_name = hash_name(&stat.name);
                let Some(live) = self.find_live(&stat.name) else {
                    tracing::warn!(
                        plugin = %hashed_name,
                        "No live plugin matches persisted stats; dropping entry"
                    );
                    continue;
                };

                let fact = PluginStabilityFact {
                    hashed_name,
                    stability: PluginStability {
                        plugin: describe(live, self.prefs),
                        launch_count: stat.launches,
                        instance_count: stat.instances,
                        crash_count: stat.crashes,
                    },
                };
                let mut element = plugins.open_scope("pluginstability")?;
                element.record(&fact)?;
                written += 1;
            }
        }

        store.clear(PLUGIN_STATS_KEY);
        tracing::debug!(
            entries = entries.len(),
            written,
            "Plugin stability correlated"
        );
        Ok(written)
    }
}
