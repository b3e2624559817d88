//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the collaborator traits the report collectors depend
//! on. Implementations live in adapter crates or in the embedding
//! application.
//!
//! ## Ports Overview
//!
//! - [`ICounterStore`] - Persistent stability counters and plugin stats
//! - [`IPluginPrefs`] - Per-profile plugin enablement
//! - [`IFieldTrialRegistry`] - Active experiment groups
//! - [`ISystemInfo`] - Hardware, OS, GPU and display introspection

pub mod counter_store;
pub mod field_trials;
pub mod plugin_prefs;
pub mod system_info;

pub use counter_store::ICounterStore;
pub use field_trials::{IFieldTrialRegistry, NameGroupId};
pub use plugin_prefs::IPluginPrefs;
pub use system_info::{GpuInfo, GpuPerformance, ISystemInfo, ScreenSize};
