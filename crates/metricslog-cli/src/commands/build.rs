//! Build command - Produce a report from a fixture
//!
//! Provides the `metricslog build` CLI command which:
//! 1. Loads collaborator state from a JSON fixture
//! 2. Runs one reporting cycle (full or incremental) and records pending events
//! 3. Locks the report and prints the legacy XML or the structured record
//! 4. Optionally writes the binary structured encoding and the drained store

use std::path::PathBuf;

use anyhow::{Context, Result};
use metricslog_collect::{EnvironmentCollector, HostSystemInfo, ReportingContext, SystemSnapshot};
use metricslog_core::config::Config;
use metricslog_core::domain::EncodedReport;
use metricslog_core::ports::IPluginPrefs;
use tracing::info;

use crate::fixture::{Fixture, FixturePrefs};
use crate::output::{get_formatter, OutputFormat};

/// Encoding printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// Legacy element tree as XML
    Xml,
    /// Structured record as JSON
    Json,
}

/// Arguments for the build subcommand
#[derive(Debug, clap::Args)]
pub struct BuildCommand {
    /// Fixture file with collaborator state
    #[arg(long)]
    pub fixture: PathBuf,

    /// Encoding to print
    #[arg(long, value_enum, default_value_t = Encoding::Xml)]
    pub format: Encoding,

    /// Write the binary structured encoding to this file
    #[arg(long)]
    pub binary_out: Option<PathBuf>,

    /// Build an incremental log with the minimal stability block only
    #[arg(long)]
    pub incremental: bool,

    /// Write the counter store, as left after the cycle, to this file
    #[arg(long)]
    pub store_out: Option<PathBuf>,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let encoded = self.build(config)?;

        if let Some(path) = &self.binary_out {
            std::fs::write(path, &encoded.structured)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = encoded.structured.len(), "Binary encoding written");
        }

        let structured = encoded.decode_structured()?;
        match format {
            OutputFormat::Json => {
                formatter.print_json(&serde_json::json!({
                    "client_id": structured.client_id,
                    "version": structured.system_profile.app_version,
                    "legacy_xml": encoded.legacy_xml,
                    "structured": serde_json::to_value(&structured)?,
                    "binary_bytes": encoded.structured.len(),
                }));
            }
            OutputFormat::Human => match self.format {
                Encoding::Xml => print!("{}", encoded.legacy_xml),
                Encoding::Json => println!("{}", serde_json::to_string_pretty(&structured)?),
            },
        }

        Ok(())
    }

    /// Run one reporting cycle over the fixture and return both encodings
    fn build(&self, config: &Config) -> Result<EncodedReport> {
        let Fixture {
            client_id,
            session_id,
            counters: mut store,
            plugins,
            plugin_prefs,
            field_trials,
            system: snapshot,
            profile_metrics,
            omnibox_events,
        } = Fixture::load(&self.fixture)?;

        let client_id = client_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut context =
            ReportingContext::from_config(config, client_id).with_session_id(session_id);

        // One fixed set of host answers for the whole cycle
        let system = snapshot.unwrap_or_else(|| SystemSnapshot::capture(&HostSystemInfo::new()));
        let prefs = plugin_prefs.as_ref().map(FixturePrefs);
        let prefs = prefs.as_ref().map(|p| p as &dyn IPluginPrefs);

        let mut report = context.new_report();
        if self.incremental {
            context.record_incremental_stability(&mut report, &plugins, prefs, &mut store)?;
        } else {
            let locale = context.application_locale().map(str::to_string);
            let collector = EnvironmentCollector::new(&system, &field_trials, &plugins, prefs)
                .with_application_locale(locale.as_deref());
            context.record_environment(
                &mut report,
                &collector,
                &mut store,
                profile_metrics.as_ref(),
            )?;
        }
        for event in &omnibox_events {
            context.record_omnibox_event(&mut report, event)?;
        }

        report.lock()?;
        let encoded = report.encode()?;
        info!(
            client_id = %report.client_id(),
            version = %report.version(),
            events = report.num_events(),
            incremental = self.incremental,
            "Report built"
        );

        if let Some(path) = &self.store_out {
            store.save(path)?;
        }
        Ok(encoded)
    }
}
