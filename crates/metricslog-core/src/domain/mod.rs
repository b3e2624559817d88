//! Domain entities and business logic
//!
//! This module contains the core report model for metricslog:
//! - The dual-encoded report and its lifecycle
//! - The legacy element tree and the structured record
//! - Facts that fan one datum out to both encodings
//! - Stability counters, plugin records and omnibox events
//! - Domain-specific error types

pub mod errors;
pub mod fact;
pub mod legacy;
pub mod omnibox;
pub mod plugin;
pub mod profile;
pub mod report;
pub mod stability;

// Re-export commonly used types
pub use errors::ReportError;
pub use fact::{paired, Fact, PairedFact};
pub use legacy::Element;
pub use omnibox::{InputType, OmniboxLog, ProviderType, ResultType, Suggestion};
pub use plugin::{PluginInfo, PluginStat, PLUGIN_STATS_KEY};
pub use profile::{StructuredLog, SystemProfile};
pub use report::{EncodedReport, Report, ReportState, ScopedElement};
pub use stability::{StabilityCounter, StabilityFact, UptimeFact};
