//! Reporting version string
//!
//! The version reported with every log is the product version, followed by
//! an optional extension chosen once per process (for example a channel
//! suffix), followed by `-devel` on unofficial builds.

use std::sync::OnceLock;

use metricslog_core::config::BuildConfig;

/// Suffix marking an unofficial build
pub const DEVEL_SUFFIX: &str = "-devel";

/// Computes the version string attached to each report
#[derive(Debug, Default)]
pub struct VersionProvider {
    build: Option<BuildConfig>,
    extension: OnceLock<String>,
}

impl VersionProvider {
    /// Creates a provider. `None` means build information is unavailable.
    pub fn new(build: Option<BuildConfig>) -> Self {
        Self {
            build,
            extension: OnceLock::new(),
        }
    }

    /// Set the process-wide version extension.
    ///
    /// Only the first call takes effect. Returns `false` when an extension
    /// was already set.
    pub fn set_version_extension(&self, extension: impl Into<String>) -> bool {
        let extension = extension.into();
        match self.extension.set(extension) {
            Ok(()) => true,
            Err(rejected) => {
                tracing::warn!(
                    current = self.version_extension(),
                    rejected = %rejected,
                    "Version extension already set; ignoring"
                );
                false
            }
        }
    }

    /// The extension, or empty when none was set
    pub fn version_extension(&self) -> &str {
        self.extension.get().map(String::as_str).unwrap_or_default()
    }

    /// The full reporting version string
    ///
    /// Empty when build information is unavailable.
    pub fn version_string(&self) -> String {
        let Some(build) = &self.build else {
            tracing::error!("Build information unavailable; reporting an empty version");
            return String::new();
        };

        let mut version = build.product_version.clone();
        version.push_str(self.version_extension());
        if !build.official_build {
            version.push_str(DEVEL_SUFFIX);
        }
        version
    }
}
