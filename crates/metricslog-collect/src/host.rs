//! Host system information
//!
//! [`HostSystemInfo`] answers [`ISystemInfo`] queries from the running Linux
//! system. Values the host does not expose cheaply (GPU, displays) are reported
//! as zero. [`SystemSnapshot`] is a fixed, serializable answer set used by
//! fixtures and tests.

use metricslog_core::ports::{GpuInfo, ISystemInfo, ScreenSize};
use serde::{Deserialize, Serialize};

/// System information read from the current host
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystemInfo;

impl HostSystemInfo {
    pub fn new() -> Self {
        Self
    }
}

impl ISystemInfo for HostSystemInfo {
    fn cpu_architecture(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    fn physical_memory_mb(&self) -> i64 {
        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| parse_mem_total_kb(&content))
            .map(|kb| kb / 1024)
            .unwrap_or_default()
    }

    fn os_name(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn os_version(&self) -> String {
        std::fs::read_to_string("/proc/version")
            .ok()
            .and_then(|v| v.split_whitespace().nth(2).map(String::from))
            .unwrap_or_default()
    }

    fn gpu_info(&self) -> GpuInfo {
        GpuInfo::default()
    }

    fn primary_screen_size(&self) -> ScreenSize {
        ScreenSize::default()
    }

    fn screen_count(&self) -> i32 {
        0
    }

    fn application_locale(&self) -> String {
        std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LANG"))
            .map(|raw| locale_from_env(&raw))
            .unwrap_or_default()
    }
}

/// Extract `MemTotal` in KiB from `/proc/meminfo` content
fn parse_mem_total_kb(meminfo: &str) -> Option<i64> {
    meminfo
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

/// `en_US.UTF-8` -> `en-US`
fn locale_from_env(raw: &str) -> String {
    let base = raw.split(['.', '@']).next().unwrap_or_default();
    if base == "C" || base == "POSIX" {
        return String::new();
    }
    base.replace('_', "-")
}

// ============================================================================
// Fixed snapshot
// ============================================================================

/// Serializable, fixed answers to every [`ISystemInfo`] query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSnapshot {
    pub cpu_architecture: String,
    pub physical_memory_mb: i64,
    pub os_name: String,
    pub os_version: String,
    pub gpu: GpuInfo,
    pub primary_screen: ScreenSize,
    pub screen_count: i32,
    pub application_locale: String,
}

impl SystemSnapshot {
    /// Capture every answer `source` currently gives.
    pub fn capture(source: &dyn ISystemInfo) -> Self {
        Self {
            cpu_architecture: source.cpu_architecture(),
            physical_memory_mb: source.physical_memory_mb(),
            os_name: source.os_name(),
            os_version: source.os_version(),
            gpu: source.gpu_info(),
            primary_screen: source.primary_screen_size(),
            screen_count: source.screen_count(),
            application_locale: source.application_locale(),
        }
    }
}

impl ISystemInfo for SystemSnapshot {
    fn cpu_architecture(&self) -> String {
        self.cpu_architecture.clone()
    }

    fn physical_memory_mb(&self) -> i64 {
        self.physical_memory_mb
    }

    fn os_name(&self) -> String {
        self.os_name.clone()
    }

    fn os_version(&self) -> String {
        self.os_version.clone()
    }

    fn gpu_info(&self) -> GpuInfo {
        self.gpu.clone()
    }

    fn primary_screen_size(&self) -> ScreenSize {
        self.primary_screen
    }

    fn screen_count(&self) -> i32 {
        self.screen_count
    }

    fn application_locale(&self) -> String {
        self.application_locale.clone()
    }
}
