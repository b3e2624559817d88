//! Version command - Show the reporting version string
//!
//! The reporting version is the configured product version, plus the
//! configured extension, plus `-devel` on unofficial builds.

use anyhow::Result;
use metricslog_collect::VersionProvider;
use metricslog_core::config::Config;

use crate::output::{get_formatter, OutputFormat};

/// Arguments for the version subcommand
#[derive(Debug, clap::Args)]
pub struct VersionCommand {
    /// Extension to apply instead of the configured one
    #[arg(long)]
    pub extension: Option<String>,
}

impl VersionCommand {
    /// Compute the version string for `config`
    pub fn version_string(&self, config: &Config) -> String {
        let provider = VersionProvider::new(config.build_info());
        if let Some(extension) = self
            .extension
            .as_ref()
            .or(config.reporting.version_extension.as_ref())
        {
            provider.set_version_extension(extension.clone());
        }
        provider.version_string()
    }

    pub fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let version = self.version_string(config);

        match format {
            OutputFormat::Json => formatter.print_json(&serde_json::json!({
                "version": version,
                "product_version": config.build.product_version,
                "official_build": config.build.official_build,
            })),
            OutputFormat::Human if version.is_empty() => {
                formatter.error("Build information is unavailable");
            }
            OutputFormat::Human => println!("{version}"),
        }
        Ok(())
    }
}
