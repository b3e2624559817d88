//! Integration test: counter store → collectors → locked report → encodings
//!
//! Drives full reporting cycles through `ReportingContext` with an in-memory
//! counter store and a fixed system snapshot, then checks both encodings
//! and what is left behind in the store.

use std::time::Duration;

use metricslog_collect::environment::{INSTALL_DATE_KEY, KEYWORD_COUNT_KEY};
use metricslog_collect::uptime::UPTIME_KEY;
use metricslog_collect::{
    hash_name, EnvironmentCollector, ManualClock, MemoryCounterStore, ReportingContext,
    SystemSnapshot, UptimeTracker,
};
use metricslog_core::config::ConfigBuilder;
use metricslog_core::domain::{
    InputType, OmniboxLog, PluginInfo, ProviderType, ResultType, StabilityCounter, Suggestion,
    PLUGIN_STATS_KEY,
};
use metricslog_core::ports::{ICounterStore, IPluginPrefs, NameGroupId};
use serde_json::json;

struct AllEnabled;

impl IPluginPrefs for AllEnabled {
    fn is_enabled(&self, _plugin: &PluginInfo) -> bool {
        true
    }
}

fn context(clock: &ManualClock) -> ReportingContext {
    let config = ConfigBuilder::new()
        .product_version("21.0.1180.0")
        .official_build(true)
        .build();
    ReportingContext::from_config(&config, "client-42")
        .with_session_id(1)
        .with_uptime_tracker(UptimeTracker::with_clock(clock.clone()))
}

fn live_plugins() -> Vec<PluginInfo> {
    vec![PluginInfo::new(
        "Flash",
        "/usr/lib/flash/libflashplayer.so",
        "11.2.202",
    )]
}

fn seeded_store() -> MemoryCounterStore {
    let mut store = MemoryCounterStore::new();
    store.set_int(StabilityCounter::LaunchCount.store_key(), 3);
    store.set_int(StabilityCounter::CrashCount.store_key(), 1);
    store.set_string(INSTALL_DATE_KEY, "1334000000");
    store.set_int(KEYWORD_COUNT_KEY, 5);
    store.set_list(
        PLUGIN_STATS_KEY,
        vec![json!({"name": "Flash", "launches": 2, "instances": 3, "crashes": 1})],
    );
    store
}

#[test]
fn test_full_cycle_produces_consistent_encodings() {
    let clock = ManualClock::new();
    let mut context = context(&clock);
    let mut store = seeded_store();
    let system = SystemSnapshot {
        cpu_architecture: "x86_64".into(),
        physical_memory_mb: 4096,
        os_name: "Linux".into(),
        os_version: "6.1".into(),
        application_locale: "en-US".into(),
        ..Default::default()
    };
    let trials = vec![NameGroupId::new(1, 2)];
    let plugins = live_plugins();
    let prefs = AllEnabled;
    let collector = EnvironmentCollector::new(&system, &trials, &plugins, Some(&prefs));

    let mut report = context.new_report();
    context
        .record_environment(&mut report, &collector, &mut store, None)
        .unwrap();
    report.lock().unwrap();
    let encoded = report.encode().unwrap();

    // Legacy
    let stability = report.legacy().find(&["profile", "stability"]).unwrap();
    assert_eq!(stability.attribute("launchcount"), Some("3"));
    assert_eq!(stability.attribute("crashcount"), Some("1"));
    let plugin_entry = stability.find(&["plugins", "pluginstability"]).unwrap();
    assert_eq!(plugin_entry.attribute("filename"), Some(hash_name("Flash").as_str()));
    assert_eq!(plugin_entry.attribute("crashcount"), Some("1"));
    assert!(encoded.legacy_xml.contains("<log clientid=\"client-42\" appversion=\"21.0.1180.0\""));
    assert!(!encoded.legacy_xml.contains("\"Flash\""));

    // Structured, decoded from the binary encoding
    let decoded = encoded.decode_structured().unwrap();
    assert_eq!(&decoded, report.structured());
    let structured = decoded.system_profile.stability.unwrap();
    assert_eq!(structured.launch_count, Some(3));
    assert_eq!(structured.crash_count, Some(1));
    assert_eq!(structured.plugin_stability.len(), 1);
    assert_eq!(structured.plugin_stability[0].plugin.name, "Flash");
    assert_eq!(structured.plugin_stability[0].plugin.is_disabled, Some(false));
    assert_eq!(decoded.system_profile.install_date, Some(1334000000));
    assert_eq!(decoded.system_profile.field_trials.len(), 1);

    // Store after the cycle
    assert_eq!(store.get_int(StabilityCounter::LaunchCount.store_key()), 0);
    assert_eq!(store.get_int(StabilityCounter::CrashCount.store_key()), 0);
    assert!(store.get_list(PLUGIN_STATS_KEY).is_none());
}

#[test]
fn test_second_cycle_sees_drained_counters() {
    let clock = ManualClock::new();
    let mut context = context(&clock);
    let mut store = seeded_store();
    let plugins = live_plugins();

    let mut first = context.new_report();
    context
        .record_incremental_stability(&mut first, &plugins, None, &mut store)
        .unwrap();
    let mut second = context.new_report();
    context
        .record_incremental_stability(&mut second, &plugins, None, &mut store)
        .unwrap();

    let launch = |report: &metricslog_core::domain::Report| {
        report
            .legacy()
            .find(&["profile", "stability"])
            .and_then(|s| s.attribute("launchcount"))
            .map(str::to_string)
    };
    assert_eq!(launch(&first).as_deref(), Some("3"));
    assert_eq!(launch(&second).as_deref(), Some("0"));

    // Plugin stats were consumed by the first cycle
    let second_stability = second.legacy().find(&["profile", "stability"]).unwrap();
    assert!(second_stability.child("plugins").is_none());
}

#[test]
fn test_uptime_accumulates_across_cycles() {
    let clock = ManualClock::new();
    let mut context = context(&clock);
    let mut store = MemoryCounterStore::new();

    clock.advance(Duration::from_secs(10));
    let mut first = context.new_report();
    context
        .record_incremental_stability(&mut first, &[], None, &mut store)
        .unwrap();
    let stability = first.legacy().find(&["profile", "stability"]).unwrap();
    assert_eq!(stability.attribute("uptimesec"), Some("10"));
    assert_eq!(store.get_int(UPTIME_KEY), 10);

    let mut second = context.new_report();
    context
        .record_incremental_stability(&mut second, &[], None, &mut store)
        .unwrap();
    let stability = second.legacy().find(&["profile", "stability"]).unwrap();
    assert!(stability.attribute("uptimesec").is_none());
    assert_eq!(store.get_int(UPTIME_KEY), 10);
}

#[test]
fn test_events_and_locking() {
    let clock = ManualClock::new();
    let context = context(&clock);
    let log = OmniboxLog {
        text: "metrics".to_string(),
        tab_id: None,
        selected_index: 0,
        inline_autocompleted_length: 0,
        elapsed_since_first_modified: None,
        input_type: InputType::Url,
        results: vec![Suggestion {
            provider: ProviderType::from_name("HistoryURL"),
            result_type: ResultType::HistoryUrl,
            relevance: 1400,
            starred: false,
        }],
    };

    let mut report = context.new_report();
    context.record_omnibox_event(&mut report, &log).unwrap();
    context.record_omnibox_event(&mut report, &log).unwrap();
    assert_eq!(report.num_events(), 2);

    report.lock().unwrap();
    let before = report.encode().unwrap();
    assert!(context.record_omnibox_event(&mut report, &log).is_err());
    assert_eq!(report.encode().unwrap(), before);
    assert_eq!(report.num_events(), 2);
}
