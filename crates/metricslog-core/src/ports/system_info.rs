//! System introspection port (driven/secondary port)
//!
//! Point-in-time, read-only queries about the host: CPU, memory, operating
//! system, primary GPU and displays. Implementations must not block; values
//! that are unknown are reported as zero or empty.

use serde::{Deserialize, Serialize};

/// GPU benchmark scores, when the platform provides them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuPerformance {
    pub graphics: f32,
    pub gaming: f32,
    pub overall: f32,
}

/// Description of the primary GPU
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub vendor_id: u32,
    pub device_id: u32,
    #[serde(default)]
    pub driver_version: String,
    #[serde(default)]
    pub driver_date: String,
    #[serde(default)]
    pub performance: Option<GpuPerformance>,
}

/// Size of a display in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

/// Port trait for host introspection
pub trait ISystemInfo {
    /// CPU architecture name, e.g. `x86_64`
    fn cpu_architecture(&self) -> String;

    /// Physical memory in MiB
    fn physical_memory_mb(&self) -> i64;

    fn os_name(&self) -> String;

    fn os_version(&self) -> String;

    fn gpu_info(&self) -> GpuInfo;

    fn primary_screen_size(&self) -> ScreenSize;

    fn screen_count(&self) -> i32;

    /// Locale the application UI runs in, e.g. `en-US`
    fn application_locale(&self) -> String;
}
