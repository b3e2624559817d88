//! Config command - View and manage metricslog configuration
//!
//! Provides the `metricslog config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use metricslog_core::config::Config;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "build.product_version")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command against the loaded `config` read from `config_path`
    pub fn execute(&self, config: &Config, config_path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(config, config_path, format),
            ConfigCommand::Set { key, value } => execute_set(config_path, key, value, format),
            ConfigCommand::Validate => execute_validate(config_path, format),
        }
    }
}

fn execute_show(config: &Config, config_path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    info!(config_path = %config_path.display(), "Showing configuration");

    if matches!(format, OutputFormat::Json) {
        let json =
            serde_json::to_value(config).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
    } else {
        formatter.success(&format!("Configuration ({})", config_path.display()));
        formatter.info("");
        let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
        for line in yaml.lines() {
            formatter.info(line);
        }
    }

    Ok(())
}

fn execute_set(config_path: &Path, key: &str, value: &str, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    // Start from the file on disk; a file that does not parse is never overwritten
    let mut config = if config_path.exists() {
        Config::load(config_path).with_context(|| {
            format!(
                "Refusing to overwrite unparsable configuration {}",
                config_path.display()
            )
        })?
    } else {
        Config::default()
    };

    match apply_config_value(&mut config, key, value) {
        Ok(()) => {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create configuration directory")?;
            }
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            std::fs::write(config_path, &yaml).context("Failed to write configuration file")?;
            info!(key, value, config_path = %config_path.display(), "Configuration updated");

            if matches!(format, OutputFormat::Json) {
                formatter.print_json(&serde_json::json!({
                    "success": true,
                    "key": key,
                    "value": value,
                    "config_path": config_path.display().to_string(),
                }));
            } else {
                formatter.success(&format!("Set {} = {}", key, value));
                formatter.info(&format!("Saved to {}", config_path.display()));
            }
        }
        Err(e) => {
            if matches!(format, OutputFormat::Json) {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{}': {}", key, e));
                formatter.info("");
                formatter.info("Supported keys:");
                formatter.info("  build.product_version          - Base product version");
                formatter.info("  build.official_build           - true|false");
                formatter.info("  reporting.version_extension    - Suffix appended to the version");
                formatter.info("  reporting.client_id            - Fixed client identifier");
                formatter.info("  reporting.application_locale   - Locale override");
                formatter.info("  logging.level                  - trace|debug|info|warn|error");
                formatter.info("  logging.json                   - true|false");
            }
        }
    }

    Ok(())
}

fn execute_validate(config_path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    // Load explicitly; load_or_default would hide parse errors
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            let message = if config_path.exists() {
                format!("Failed to parse configuration: {}", e)
            } else {
                "Configuration file not found. Using defaults.".to_string()
            };
            if matches!(format, OutputFormat::Json) {
                formatter.print_json(&serde_json::json!({
                    "valid": false,
                    "config_path": config_path.display().to_string(),
                    "errors": [message],
                }));
            } else if config_path.exists() {
                formatter.error(&message);
                formatter.info(&format!("File: {}", config_path.display()));
            } else {
                formatter.info(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                formatter.info("Using default configuration. Run 'metricslog config set <key> <value>' to create one.");
            }
            return Ok(());
        }
    };

    info!(config_path = %config_path.display(), "Validating configuration");
    let errors = config.validate();

    if matches!(format, OutputFormat::Json) {
        let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": config_path.display().to_string(),
            "errors": error_strings,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", config_path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        formatter.info(&format!("File: {}", config_path.display()));
        formatter.info("");
        for error in &errors {
            formatter.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    Ok(())
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

    match key {
        "build.product_version" => config.build.product_version = value.to_string(),
        "build.official_build" => {
            config.build.official_build = value
                .parse::<bool>()
                .context("Expected true or false for build.official_build")?;
        }
        "reporting.version_extension" => config.reporting.version_extension = optional(value),
        "reporting.client_id" => config.reporting.client_id = optional(value),
        "reporting.application_locale" => config.reporting.application_locale = optional(value),
        "logging.level" => {
            let level = value.to_lowercase();
            if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
                bail!("Invalid log level '{}'", value);
            }
            config.logging.level = level;
        }
        "logging.json" => {
            config.logging.json = value
                .parse::<bool>()
                .context("Expected true or false for logging.json")?;
        }
        _ => bail!("Unknown configuration key '{}'", key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_known_keys() {
        let mut config = Config::default();
        apply_config_value(&mut config, "build.product_version", "9.9").unwrap();
        apply_config_value(&mut config, "build.official_build", "true").unwrap();
        apply_config_value(&mut config, "reporting.version_extension", "-beta").unwrap();
        apply_config_value(&mut config, "logging.level", "DEBUG").unwrap();

        assert_eq!(config.build.product_version, "9.9");
        assert!(config.build.official_build);
        assert_eq!(config.reporting.version_extension.as_deref(), Some("-beta"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_value_clears_optional_key() {
        let mut config = Config::default();
        config.reporting.client_id = Some("abc".to_string());
        apply_config_value(&mut config, "reporting.client_id", "").unwrap();
        assert!(config.reporting.client_id.is_none());
    }

    #[test]
    fn apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply_config_value(&mut config, "logging.level", "loud").is_err());
        assert!(apply_config_value(&mut config, "build.official_build", "yes").is_err());
        assert!(apply_config_value(&mut config, "sync.root", "/tmp").is_err());
    }

    #[test]
    fn set_writes_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let cmd = ConfigCommand::Set {
            key: "reporting.version_extension".to_string(),
            value: "-canary".to_string(),
        };
        cmd.execute(&Config::default(), &path, OutputFormat::Json)
            .unwrap();

        let saved = Config::load(&path).unwrap();
        assert_eq!(saved.reporting.version_extension.as_deref(), Some("-canary"));
    }

    #[test]
    fn set_keeps_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "build:\n  official_build: true\nreporting:\n  client_id: pinned\n")
            .unwrap();

        let cmd = ConfigCommand::Set {
            key: "logging.level".to_string(),
            value: "warn".to_string(),
        };
        cmd.execute(&Config::default(), &path, OutputFormat::Json)
            .unwrap();

        let saved = Config::load(&path).unwrap();
        assert!(saved.build.official_build);
        assert_eq!(saved.reporting.client_id.as_deref(), Some("pinned"));
        assert_eq!(saved.logging.level, "warn");
    }

    #[test]
    fn set_refuses_to_overwrite_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "build: [not, a, map]\n").unwrap();

        let cmd = ConfigCommand::Set {
            key: "logging.level".to_string(),
            value: "warn".to_string(),
        };
        assert!(cmd
            .execute(&Config::default(), &path, OutputFormat::Json)
            .is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "build: [not, a, map]\n"
        );
    }

    #[test]
    fn validate_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(ConfigCommand::Validate
            .execute(&Config::default(), &path, OutputFormat::Json)
            .is_ok());
    }
}
