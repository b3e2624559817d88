//! metricslog Core - Report model, ports and configuration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Report`, `Element`, `StructuredLog`, `StabilityCounter`, `OmniboxLog`
//! - **Port definitions** - Traits for collaborators: `ICounterStore`, `IPluginPrefs`,
//!   `IFieldTrialRegistry`, `ISystemInfo`
//! - **Configuration** - YAML-backed `Config` with validation and a builder
//!
//! # Architecture
//!
//! A report holds every fact twice: once in the legacy element tree and once
//! in the structured record. The domain module guarantees the two never
//! diverge by routing writes through facts. Ports define the collaborators
//! that collectors read from; collectors live in `metricslog-collect`.

pub mod config;
pub mod domain;
pub mod ports;
