//! Reporting context
//!
//! [`ReportingContext`] owns the state that outlives a single report: the
//! version provider with its once-only extension and the uptime baseline.
//! One context is created per process from the [`Config`] and drives every
//! reporting cycle.

use metricslog_core::config::Config;
use metricslog_core::domain::{OmniboxLog, PluginInfo, Report, ReportError};
use metricslog_core::ports::{ICounterStore, IPluginPrefs};
use serde_json::{Map, Value};

use crate::environment::EnvironmentCollector;
use crate::events::EventRecorder;
use crate::plugins::PluginStabilityCorrelator;
use crate::stability::StabilityCollector;
use crate::uptime::UptimeTracker;
use crate::version::VersionProvider;

/// Process-wide reporting state
#[derive(Debug)]
pub struct ReportingContext {
    client_id: String,
    session_id: i32,
    application_locale: Option<String>,
    version: VersionProvider,
    uptime: UptimeTracker,
    events: EventRecorder,
}

impl ReportingContext {
    /// Build a context from configuration.
    ///
    /// `client_id` is used only when the configuration does not pin one.
    pub fn from_config(config: &Config, client_id: impl Into<String>) -> Self {
        let version = VersionProvider::new(config.build_info());
        if let Some(extension) = &config.reporting.version_extension {
            version.set_version_extension(extension.clone());
        }

        let client_id = config
            .reporting
            .client_id
            .clone()
            .unwrap_or_else(|| client_id.into());

        tracing::info!(
            client_id = %client_id,
            version = %version.version_string(),
            "Reporting context initialized"
        );

        Self {
            client_id,
            session_id: 0,
            application_locale: config.reporting.application_locale.clone(),
            version,
            uptime: UptimeTracker::new(),
            events: EventRecorder::new(),
        }
    }

    /// Replace the uptime tracker, e.g. with one on a manual clock
    pub fn with_uptime_tracker(mut self, uptime: UptimeTracker) -> Self {
        self.uptime = uptime;
        self
    }

    pub fn with_session_id(mut self, session_id: i32) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn session_id(&self) -> i32 {
        self.session_id
    }

    /// Locale from configuration, overriding the host's when set
    pub fn application_locale(&self) -> Option<&str> {
        self.application_locale.as_deref()
    }

    pub fn version(&self) -> &VersionProvider {
        &self.version
    }

    /// Start a new report for this client and session
    pub fn new_report(&self) -> Report {
        Report::new(
            self.client_id.clone(),
            self.session_id,
            self.version.version_string(),
        )
    }

    /// Record the full environment, including the full stability element.
    pub fn record_environment(
        &mut self,
        report: &mut Report,
        collector: &EnvironmentCollector<'_>,
        store: &mut dyn ICounterStore,
        profile_metrics: Option<&Map<String, Value>>,
    ) -> Result<(), ReportError> {
        collector.record_environment(report, store, &mut self.uptime, profile_metrics)
    }

    /// Record the minimal stability block of an incremental log.
    pub fn record_incremental_stability(
        &mut self,
        report: &mut Report,
        plugins: &[PluginInfo],
        prefs: Option<&dyn IPluginPrefs>,
        store: &mut dyn ICounterStore,
    ) -> Result<(), ReportError> {
        let correlator = PluginStabilityCorrelator::new(plugins, prefs);
        StabilityCollector::new(&mut self.uptime, correlator)
            .write_incremental_stability(report, store)
    }

    pub fn record_omnibox_event(
        &self,
        report: &mut Report,
        log: &OmniboxLog,
    ) -> Result<(), ReportError> {
        self.events.record_omnibox_event(report, log)
    }
}
