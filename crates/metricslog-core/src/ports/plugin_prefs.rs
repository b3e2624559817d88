//! Plugin preferences port
//!
//! Answers whether the user has enabled a given plugin. The collaborator is
//! only available once a user profile is loaded, so collectors receive it as
//! an `Option<&dyn IPluginPrefs>` and omit the enabled flag when it is absent.

use crate::domain::PluginInfo;

/// Port trait for per-profile plugin preferences
pub trait IPluginPrefs {
    /// Returns true if the plugin is enabled for the current profile
    fn is_enabled(&self, plugin: &PluginInfo) -> bool;
}
