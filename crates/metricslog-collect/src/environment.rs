//! Environment facts
//!
//! [`EnvironmentCollector`] writes the `profile` element of a full log: the
//! install record, the plugin list, the full stability block, hardware, OS,
//! GPU and display facts, bookmark and keyword counts and per-profile
//! metrics. Most facts go to both encodings. A few exist in only one:
//!
//! | Fact | Legacy | Structured |
//! |---|---|---|
//! | install `buildid` | yes | no |
//! | bookmarks, keywords, user profile metrics | yes | no |
//! | application locale | no | yes |
//! | GPU driver and performance data | no | yes |
//! | field trials | no | yes |

use metricslog_core::domain::profile::{FieldTrial, PerformanceStatistics};
use metricslog_core::domain::{paired, Element, Fact, PluginInfo, Report, ReportError, StructuredLog};
use metricslog_core::ports::{ICounterStore, IFieldTrialRegistry, IPluginPrefs, ISystemInfo};
use serde_json::{Map, Value};

use crate::plugins::{write_plugin_list, PluginStabilityCorrelator};
use crate::stability::StabilityCollector;
use crate::uptime::UptimeTracker;

/// Counter store key of the install timestamp (seconds, string encoded)
pub const INSTALL_DATE_KEY: &str = "metrics.client_id_timestamp";

pub const BOOKMARK_BAR_ITEMS_KEY: &str = "bookmarks.bar.item_count";
pub const BOOKMARK_BAR_FOLDERS_KEY: &str = "bookmarks.bar.folder_count";
pub const OTHER_BOOKMARKS_ITEMS_KEY: &str = "bookmarks.other.item_count";
pub const OTHER_BOOKMARKS_FOLDERS_KEY: &str = "bookmarks.other.folder_count";
pub const KEYWORD_COUNT_KEY: &str = "keywords.count";

/// Prefix identifying per-profile entries in the profile metrics dictionary
pub const PROFILE_PREFIX: &str = "profile-";

// ============================================================================
// Install element
// ============================================================================

/// Install date as stored, or `"0"` when unknown
pub fn install_date(store: Option<&dyn ICounterStore>) -> String {
    store
        .and_then(|s| s.get_string(INSTALL_DATE_KEY))
        .unwrap_or_else(|| "0".to_string())
}

struct InstallFact {
    install_date: String,
}

impl Fact for InstallFact {
    fn write_legacy(&self, element: &mut Element) {
        element.push_attribute("installdate", self.install_date.clone());
        // appversion carries the build identity
        element.push_attribute("buildid", "0");
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        match self.install_date.parse::<i64>() {
            Ok(date) => log.system_profile.install_date = Some(date),
            Err(_) => {
                tracing::warn!(install_date = %self.install_date, "Install date is not an integer")
            }
        }
    }
}

/// Write the `install` element.
pub fn write_install_element(
    report: &mut Report,
    store: Option<&dyn ICounterStore>,
) -> Result<(), ReportError> {
    let fact = InstallFact {
        install_date: install_date(store),
    };
    let mut install = report.open_scope("install")?;
    install.record(&fact)?;
    Ok(())
}

// ============================================================================
// EnvironmentCollector
// ============================================================================

/// Gathers hardware, OS and profile facts into a full log
pub struct EnvironmentCollector<'a> {
    system: &'a dyn ISystemInfo,
    field_trials: &'a dyn IFieldTrialRegistry,
    plugins: &'a [PluginInfo],
    prefs: Option<&'a dyn IPluginPrefs>,
    locale_override: Option<&'a str>,
}

impl<'a> EnvironmentCollector<'a> {
    pub fn new(
        system: &'a dyn ISystemInfo,
        field_trials: &'a dyn IFieldTrialRegistry,
        plugins: &'a [PluginInfo],
        prefs: Option<&'a dyn IPluginPrefs>,
    ) -> Self {
        Self {
            system,
            field_trials,
            plugins,
            prefs,
            locale_override: None,
        }
    }

    /// Report `locale` instead of the host's application locale
    pub fn with_application_locale(mut self, locale: Option<&'a str>) -> Self {
        self.locale_override = locale;
        self
    }

    /// Write the full `profile` element and the structured system profile.
    ///
    /// Drains the stability counters and plugin stats from `store`.
    /// `profile_metrics` is the per-profile metrics dictionary, when the
    /// embedding application has one.
    pub fn record_environment(
        &self,
        report: &mut Report,
        store: &mut dyn ICounterStore,
        uptime: &mut UptimeTracker,
        profile_metrics: Option<&Map<String, Value>>,
    ) -> Result<(), ReportError> {
        let mut profile = report.open_scope("profile")?;
        profile.write_common_event_attributes()?;

        write_install_element(&mut profile, Some(&*store))?;
        write_plugin_list(&mut profile, self.plugins, self.prefs)?;

        let correlator = PluginStabilityCorrelator::new(self.plugins, self.prefs);
        StabilityCollector::new(uptime, correlator).write_stability_element(&mut profile, store)?;

        self.write_hardware(&mut profile)?;
        write_bookmarks(&mut profile, store)?;
        {
            let mut keywords = profile.open_scope("keywords")?;
            keywords.write_int_attribute("count", store.get_int(KEYWORD_COUNT_KEY))?;
        }
        if let Some(metrics) = profile_metrics {
            write_all_profiles_metrics(&mut profile, metrics)?;
        }

        self.write_structured_only(&mut profile)?;
        tracing::debug!(plugins = self.plugins.len(), "Environment recorded");
        Ok(())
    }

    fn write_hardware(&self, report: &mut Report) -> Result<(), ReportError> {
        {
            let arch = self.system.cpu_architecture();
            let mut cpu = report.open_scope("cpu")?;
            cpu.record(&paired(vec![("arch", arch.clone())], |log| {
                log.system_profile.hardware_mut().cpu_architecture = Some(arch.clone());
            }))?;
        }
        {
            let mb = self.system.physical_memory_mb();
            let mut memory = report.open_scope("memory")?;
            memory.record(&paired(vec![("mb", mb.to_string())], |log| {
                log.system_profile.hardware_mut().system_ram_mb = Some(mb);
            }))?;
        }
        {
            let name = self.system.os_name();
            let version = self.system.os_version();
            let mut os = report.open_scope("os")?;
            os.record(&paired(
                vec![("name", name.clone()), ("version", version.clone())],
                |log| {
                    let os = log.system_profile.os_mut();
                    os.name = Some(name.clone());
                    os.version = Some(version.clone());
                },
            ))?;
        }
        {
            let gpu = self.system.gpu_info();
            let mut element = report.open_scope("gpu")?;
            element.record(&paired(
                vec![
                    ("vendorid", gpu.vendor_id.to_string()),
                    ("deviceid", gpu.device_id.to_string()),
                ],
                |log| {
                    let graphics = log.system_profile.hardware_mut().gpu_mut();
                    graphics.vendor_id = Some(gpu.vendor_id);
                    graphics.device_id = Some(gpu.device_id);
                },
            ))?;
        }
        {
            let size = self.system.primary_screen_size();
            let screens = self.system.screen_count();
            let mut display = report.open_scope("display")?;
            display.record(&paired(
                vec![
                    ("xsize", size.width.to_string()),
                    ("ysize", size.height.to_string()),
                    ("screens", screens.to_string()),
                ],
                |log| {
                    let hardware = log.system_profile.hardware_mut();
                    hardware.primary_screen_width = Some(size.width);
                    hardware.primary_screen_height = Some(size.height);
                    hardware.screen_count = Some(screens);
                },
            ))?;
        }
        Ok(())
    }

    fn write_structured_only(&self, report: &mut Report) -> Result<(), ReportError> {
        let locale = match self.locale_override {
            Some(locale) => locale.to_string(),
            None => self.system.application_locale(),
        };
        let gpu = self.system.gpu_info();
        let trials: Vec<FieldTrial> = self
            .field_trials
            .snapshot()
            .into_iter()
            .map(|id| FieldTrial {
                name_id: id.name,
                group_id: id.group,
            })
            .collect();

        report.structured_mut(|log| {
            let profile = &mut log.system_profile;
            profile.application_locale = Some(locale);

            let graphics = profile.hardware_mut().gpu_mut();
            graphics.driver_version = Some(gpu.driver_version);
            graphics.driver_date = Some(gpu.driver_date);
            let performance = gpu.performance.unwrap_or_default();
            graphics.performance_statistics = Some(PerformanceStatistics {
                graphics_score: performance.graphics,
                gaming_score: performance.gaming,
                overall_score: performance.overall,
            });

            profile.field_trials = trials;
        })
    }
}

// ============================================================================
// Legacy-only elements
// ============================================================================

fn write_bookmarks(report: &mut Report, store: &dyn ICounterStore) -> Result<(), ReportError> {
    let bar_items = store.get_int(BOOKMARK_BAR_ITEMS_KEY);
    let bar_folders = store.get_int(BOOKMARK_BAR_FOLDERS_KEY);
    let other_items = store.get_int(OTHER_BOOKMARKS_ITEMS_KEY);
    let other_folders = store.get_int(OTHER_BOOKMARKS_FOLDERS_KEY);

    let mut bookmarks = report.open_scope("bookmarks")?;
    for (name, folders, items) in [
        (
            "full-tree",
            bar_folders.saturating_add(other_folders),
            bar_items.saturating_add(other_items),
        ),
        ("toolbar", bar_folders, bar_items),
    ] {
        let mut location = bookmarks.open_scope("bookmarklocation")?;
        location.write_attribute("name", name)?;
        location.write_int_attribute("foldercount", folders)?;
        location.write_int_attribute("itemcount", items)?;
    }
    Ok(())
}

/// Write a `userprofile` element for every dictionary whose key carries
/// [`PROFILE_PREFIX`]; other keys are ignored.
fn write_all_profiles_metrics(
    report: &mut Report,
    all_profiles: &Map<String, Value>,
) -> Result<(), ReportError> {
    for (key, value) in all_profiles {
        let Some(profile_id_hash) = key.strip_prefix(PROFILE_PREFIX) else {
            continue;
        };
        if let Some(metrics) = value.as_object() {
            write_profile_metrics(report, profile_id_hash, metrics)?;
        }
    }
    Ok(())
}

fn write_profile_metrics(
    report: &mut Report,
    profile_id_hash: &str,
    metrics: &Map<String, Value>,
) -> Result<(), ReportError> {
    let mut profile = report.open_scope("userprofile")?;
    profile.write_attribute("profileidhash", profile_id_hash)?;

    for (name, value) in metrics {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => i64::from(*b).to_string(),
            Value::Number(n) if n.is_i64() => n.to_string(),
            other => {
                tracing::debug!(param = %name, value = %other, "Skipping unsupported profile metric");
                continue;
            }
        };
        let mut param = profile.open_scope("profileparam")?;
        param.write_attribute("name", name)?;
        param.write_attribute("value", &value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use metricslog_core::ports::{GpuInfo, GpuPerformance, NameGroupId, ScreenSize};
    use serde_json::json;

    use super::*;
    use crate::host::SystemSnapshot;
    use crate::store::MemoryCounterStore;
    use crate::uptime::ManualClock;

    fn snapshot() -> SystemSnapshot {
        SystemSnapshot {
            cpu_architecture: "x86_64".into(),
            physical_memory_mb: 8192,
            os_name: "Linux".into(),
            os_version: "6.1.0".into(),
            gpu: GpuInfo {
                vendor_id: 0x10de,
                device_id: 0x1b80,
                driver_version: "535.54".into(),
                driver_date: "2023-06-01".into(),
                performance: Some(GpuPerformance {
                    graphics: 5.5,
                    gaming: 6.0,
                    overall: 5.8,
                }),
            },
            primary_screen: ScreenSize {
                width: 1920,
                height: 1080,
            },
            screen_count: 2,
            application_locale: "en-US".into(),
        }
    }

    fn plugins() -> Vec<PluginInfo> {
        vec![PluginInfo::new("Shockwave Flash", "/opt/flash/libflashplayer.so", "11.2")]
    }

    fn record(
        collector: &EnvironmentCollector<'_>,
        store: &mut MemoryCounterStore,
        profile_metrics: Option<&Map<String, Value>>,
    ) -> Report {
        let mut report = Report::new("client", 1, "1.0");
        let mut uptime = UptimeTracker::with_clock(ManualClock::new());
        collector
            .record_environment(&mut report, store, &mut uptime, profile_metrics)
            .unwrap();
        report
    }

    #[test]
    fn test_install_date_defaults_to_zero() {
        assert_eq!(install_date(None), "0");
        let store = MemoryCounterStore::new();
        assert_eq!(install_date(Some(&store as &dyn ICounterStore)), "0");
    }

    #[test]
    fn test_install_element_without_store() {
        let mut report = Report::new("client", 1, "1.0");
        write_install_element(&mut report, None).unwrap();

        let install = report.legacy().child("install").unwrap();
        assert_eq!(install.attribute("installdate"), Some("0"));
        assert_eq!(install.attribute("buildid"), Some("0"));
        assert_eq!(report.structured().system_profile.install_date, Some(0));
    }

    #[test]
    fn test_environment_writes_hardware_to_both_encodings() {
        let system = snapshot();
        let trials = vec![NameGroupId::new(11, 2)];
        let plugins = plugins();
        let collector = EnvironmentCollector::new(&system, &trials, &plugins, None);
        let mut store = MemoryCounterStore::new();
        store.set_string(INSTALL_DATE_KEY, "1334000000");

        let report = record(&collector, &mut store, None);
        let profile = report.legacy().child("profile").unwrap();

        assert_eq!(profile.find(&["install"]).unwrap().attribute("installdate"), Some("1334000000"));
        assert_eq!(profile.child("cpu").unwrap().attribute("arch"), Some("x86_64"));
        assert_eq!(profile.child("memory").unwrap().attribute("mb"), Some("8192"));
        assert_eq!(profile.child("os").unwrap().attribute("version"), Some("6.1.0"));
        assert_eq!(profile.child("gpu").unwrap().attribute("vendorid"), Some("4318"));
        let display = profile.child("display").unwrap();
        assert_eq!(display.attribute("xsize"), Some("1920"));
        assert_eq!(display.attribute("screens"), Some("2"));
        assert!(profile.child("stability").is_some());
        assert!(profile.find(&["plugins", "plugin"]).is_some());

        let structured = &report.structured().system_profile;
        assert_eq!(structured.install_date, Some(1334000000));
        let hardware = structured.hardware.as_ref().unwrap();
        assert_eq!(hardware.cpu_architecture.as_deref(), Some("x86_64"));
        assert_eq!(hardware.system_ram_mb, Some(8192));
        assert_eq!(hardware.primary_screen_width, Some(1920));
        assert_eq!(hardware.screen_count, Some(2));
        assert_eq!(structured.os.as_ref().unwrap().name.as_deref(), Some("Linux"));
        assert_eq!(structured.plugins[0].name, "Shockwave Flash");
    }

    #[test]
    fn test_structured_only_facts() {
        let system = snapshot();
        let trials = vec![NameGroupId::new(11, 2), NameGroupId::new(12, 0)];
        let plugins = plugins();
        let collector = EnvironmentCollector::new(&system, &trials, &plugins, None);
        let mut store = MemoryCounterStore::new();

        let report = record(&collector, &mut store, None);
        let structured = &report.structured().system_profile;

        assert_eq!(structured.application_locale.as_deref(), Some("en-US"));
        let gpu = structured.hardware.as_ref().unwrap().gpu.as_ref().unwrap();
        assert_eq!(gpu.driver_version.as_deref(), Some("535.54"));
        assert_eq!(gpu.performance_statistics.as_ref().unwrap().gaming_score, 6.0);
        assert_eq!(structured.field_trials.len(), 2);
        assert_eq!(structured.field_trials[0].name_id, 11);
        assert_eq!(structured.field_trials[0].group_id, 2);

        let xml = report.legacy().to_xml();
        assert!(!xml.contains("en-US"));
        assert!(!xml.contains("535.54"));
    }

    #[test]
    fn test_locale_override() {
        let system = snapshot();
        let trials: Vec<NameGroupId> = Vec::new();
        let collector = EnvironmentCollector::new(&system, &trials, &[], None)
            .with_application_locale(Some("pt-BR"));
        let mut store = MemoryCounterStore::new();

        let report = record(&collector, &mut store, None);
        assert_eq!(
            report.structured().system_profile.application_locale.as_deref(),
            Some("pt-BR")
        );
    }

    #[test]
    fn test_bookmarks_and_keywords_are_legacy_only() {
        let system = snapshot();
        let trials: Vec<NameGroupId> = Vec::new();
        let collector = EnvironmentCollector::new(&system, &trials, &[], None);
        let mut store = MemoryCounterStore::new();
        store.set_int(BOOKMARK_BAR_ITEMS_KEY, 10);
        store.set_int(BOOKMARK_BAR_FOLDERS_KEY, 2);
        store.set_int(OTHER_BOOKMARKS_ITEMS_KEY, 30);
        store.set_int(OTHER_BOOKMARKS_FOLDERS_KEY, 4);
        store.set_int(KEYWORD_COUNT_KEY, 7);

        let report = record(&collector, &mut store, None);
        let bookmarks = report.legacy().find(&["profile", "bookmarks"]).unwrap();
        let locations: Vec<_> = bookmarks.children_named("bookmarklocation").collect();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].attribute("name"), Some("full-tree"));
        assert_eq!(locations[0].attribute("foldercount"), Some("6"));
        assert_eq!(locations[0].attribute("itemcount"), Some("40"));
        assert_eq!(locations[1].attribute("name"), Some("toolbar"));
        assert_eq!(locations[1].attribute("itemcount"), Some("10"));

        let keywords = report.legacy().find(&["profile", "keywords"]).unwrap();
        assert_eq!(keywords.attribute("count"), Some("7"));
    }

    #[test]
    fn test_bookmark_totals_saturate() {
        let mut report = Report::new("c", 1, "1.0");
        let mut store = MemoryCounterStore::new();
        store.set_int(BOOKMARK_BAR_ITEMS_KEY, i64::MAX);
        store.set_int(OTHER_BOOKMARKS_ITEMS_KEY, 1);
        store.set_int(BOOKMARK_BAR_FOLDERS_KEY, i64::MAX);
        store.set_int(OTHER_BOOKMARKS_FOLDERS_KEY, i64::MAX);

        write_bookmarks(&mut report, &store).unwrap();

        let bookmarks = report.legacy().child("bookmarks").unwrap();
        let full_tree = bookmarks.children_named("bookmarklocation").next().unwrap();
        let max = i64::MAX.to_string();
        assert_eq!(full_tree.attribute("itemcount"), Some(max.as_str()));
        assert_eq!(full_tree.attribute("foldercount"), Some(max.as_str()));
    }

    #[test]
    fn test_profile_metrics() {
        let system = snapshot();
        let trials: Vec<NameGroupId> = Vec::new();
        let collector = EnvironmentCollector::new(&system, &trials, &[], None);
        let mut store = MemoryCounterStore::new();
        let metrics = json!({
            "profile-abc123": {"bookmark_count": 12, "signed_in": true, "theme": "dark", "ratio": 0.5},
            "unrelated": {"x": 1},
            "profile-notadict": 3
        });

        let report = record(&collector, &mut store, metrics.as_object());
        let profile = report.legacy().child("profile").unwrap();
        let users: Vec<_> = profile.children_named("userprofile").collect();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].attribute("profileidhash"), Some("abc123"));

        let params: Vec<(&str, &str)> = users[0]
            .children_named("profileparam")
            .map(|p| (p.attribute("name").unwrap(), p.attribute("value").unwrap()))
            .collect();
        assert_eq!(
            params,
            vec![("bookmark_count", "12"), ("signed_in", "1"), ("theme", "dark")]
        );
    }

    #[test]
    fn test_environment_on_locked_report_fails() {
        let system = snapshot();
        let trials: Vec<NameGroupId> = Vec::new();
        let collector = EnvironmentCollector::new(&system, &trials, &[], None);
        let mut report = Report::new("client", 1, "1.0");
        report.lock().unwrap();
        let mut store = MemoryCounterStore::new();
        store.set_int("stability.launch_count", 1);
        let mut uptime = UptimeTracker::with_clock(ManualClock::new());

        let err = collector
            .record_environment(&mut report, &mut store, &mut uptime, None)
            .unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(store.get_int("stability.launch_count"), 1);
    }
}
