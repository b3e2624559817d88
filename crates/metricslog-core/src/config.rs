//! Configuration module for metricslog.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for metricslog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Build information the reporting version string is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Base product version, e.g. `"21.0.1180.0"`. Empty means unknown.
    pub product_version: String,
    /// Whether this is an official release build.
    pub official_build: bool,
}

/// Reporting cycle settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Suffix appended to the product version in every report. Applied once
    /// per process; later changes are ignored.
    pub version_extension: Option<String>,
    /// Client identifier. `None` means a fresh one is generated by the caller.
    pub client_id: Option<String>,
    /// Overrides the locale reported by the host when set.
    pub application_locale: Option<String>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) if path.exists() => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid configuration file; using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/metricslog/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("metricslog")
            .join("config.yaml")
    }

    /// Build information, or `None` when the product version is unknown.
    pub fn build_info(&self) -> Option<BuildConfig> {
        if self.build.product_version.is_empty() {
            None
        } else {
            Some(self.build.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            product_version: env!("CARGO_PKG_VERSION").to_string(),
            official_build: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"logging.level"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- build ---
        if self.build.product_version.trim().is_empty() {
            errors.push(ValidationError {
                field: "build.product_version".into(),
                message: "must not be empty".into(),
            });
        }

        // --- reporting ---
        if let Some(ext) = &self.reporting.version_extension {
            if ext.chars().any(char::is_whitespace) {
                errors.push(ValidationError {
                    field: "reporting.version_extension".into(),
                    message: format!("must not contain whitespace: '{ext}'"),
                });
            }
        }
        if let Some(client_id) = &self.reporting.client_id {
            if client_id.trim().is_empty() {
                errors.push(ValidationError {
                    field: "reporting.client_id".into(),
                    message: "must not be blank when set".into(),
                });
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use metricslog_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .product_version("21.0.1180.0")
///     .official_build(true)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- build ---

    pub fn product_version(mut self, version: impl Into<String>) -> Self {
        self.config.build.product_version = version.into();
        self
    }

    pub fn official_build(mut self, official: bool) -> Self {
        self.config.build.official_build = official;
        self
    }

    // --- reporting ---

    pub fn version_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.reporting.version_extension = Some(extension.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.reporting.client_id = Some(client_id.into());
        self
    }

    pub fn application_locale(mut self, locale: impl Into<String>) -> Self {
        self.config.reporting.application_locale = Some(locale.into());
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
