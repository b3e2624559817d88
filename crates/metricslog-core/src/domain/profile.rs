//! Structured report records
//!
//! The structured encoding is a typed tree of records. A field that was
//! never set stays `None` (or empty) and is omitted on the wire, so "set to
//! zero" and "not reported" remain distinguishable.

use serde::{Deserialize, Serialize};

/// Root of the structured encoding for one report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredLog {
    pub client_id: String,
    pub session_id: i32,
    pub system_profile: SystemProfile,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omnibox_events: Vec<OmniboxEvent>,
}

/// Environment and stability facts about the reporting client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemProfile {
    pub app_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<Hardware>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<Stability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<Plugin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_trials: Vec<FieldTrial>,
}

impl SystemProfile {
    /// Returns the stability block, creating it on first use
    pub fn stability_mut(&mut self) -> &mut Stability {
        self.stability.get_or_insert_with(Stability::default)
    }

    /// Returns the hardware block, creating it on first use
    pub fn hardware_mut(&mut self) -> &mut Hardware {
        self.hardware.get_or_insert_with(Hardware::default)
    }

    /// Returns the OS block, creating it on first use
    pub fn os_mut(&mut self) -> &mut Os {
        self.os.get_or_insert_with(Os::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_ram_mb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<Graphics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_screen_width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_screen_height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_count: Option<i32>,
}

impl Hardware {
    /// Returns the GPU block, creating it on first use
    pub fn gpu_mut(&mut self) -> &mut Graphics {
        self.gpu.get_or_insert_with(Graphics::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graphics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_statistics: Option<PerformanceStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStatistics {
    pub graphics_score: f32,
    pub gaming_score: f32,
    pub overall_score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Os {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Stability counters drained from the counter store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_shutdown_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpad_registration_success_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpad_registration_failure_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugger_present_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugger_not_present_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_load_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_crash_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_renderer_crash_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_hang_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_process_crash_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_user_crash_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_crash_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unclean_system_shutdown_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_sec: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_stability: Vec<PluginStability>,
}

/// A plugin as seen by the structured encoding (raw, unhashed name)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    pub filename: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStability {
    pub plugin: Plugin,
    pub launch_count: i64,
    pub instance_count: i64,
    pub crash_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTrial {
    pub name_id: u32,
    pub group_id: u32,
}

/// One omnibox interaction, with integer-coded enumerations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmniboxEvent {
    pub time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i32>,
    pub typed_length: i32,
    pub num_typed_terms: i32,
    pub selected_index: i32,
    pub completed_length: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_duration_ms: Option<i64>,
    pub input_type: i32,
    pub suggestions: Vec<OmniboxSuggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmniboxSuggestion {
    pub provider: i32,
    pub result_type: i32,
    pub relevance: i32,
    pub is_starred: bool,
}
