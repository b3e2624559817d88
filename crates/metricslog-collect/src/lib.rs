//! metricslog Collect - Collectors that fill a report
//!
//! Provides:
//! - `ReportingContext`: Process-wide state driving each reporting cycle
//! - `VersionProvider`: Reporting version string with a once-only extension
//! - `UptimeTracker`: Wall-clock delta between samples, persisted cumulatively
//! - `StabilityCollector`: Drain-once stability counters
//! - `PluginStabilityCorrelator`: Persisted plugin stats joined with live plugins
//! - `EnvironmentCollector`: Hardware, OS, GPU, display and profile facts
//! - `EventRecorder`: Omnibox events
//! - `MemoryCounterStore`, `HostSystemInfo`, `SystemSnapshot`: Port adapters

pub mod context;
pub mod environment;
pub mod events;
pub mod hashing;
pub mod host;
pub mod plugins;
pub mod stability;
pub mod store;
pub mod uptime;
pub mod version;

pub use context::ReportingContext;
pub use environment::EnvironmentCollector;
pub use events::EventRecorder;
pub use hashing::{create_hashes, hash_name, NameHash};
pub use host::{HostSystemInfo, SystemSnapshot};
pub use plugins::{write_plugin_list, PluginStabilityCorrelator};
pub use stability::StabilityCollector;
pub use store::MemoryCounterStore;
pub use uptime::{Clock, ManualClock, SystemClock, UptimeTracker};
pub use version::VersionProvider;
