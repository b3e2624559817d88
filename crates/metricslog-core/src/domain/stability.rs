//! Stability counters
//!
//! Each variant names one persisted counter. The variant knows the counter
//! store key it is drained from, the legacy attribute it is written to (if
//! any), and the structured field it sets.

use serde::{Deserialize, Serialize};

use super::fact::Fact;
use super::legacy::Element;
use super::profile::{Stability, StructuredLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityCounter {
    LaunchCount,
    CrashCount,
    IncompleteShutdownCount,
    BreakpadRegistrationSuccess,
    BreakpadRegistrationFailure,
    DebuggerPresent,
    DebuggerNotPresent,
    PageLoadCount,
    RendererCrashCount,
    ExtensionRendererCrashCount,
    RendererHangCount,
    ChildProcessCrashCount,
    OtherUserCrashCount,
    KernelCrashCount,
    SystemUncleanShutdownCount,
}

impl StabilityCounter {
    /// Always emitted, zero included. Collection servers reject stability
    /// blocks that lack these.
    pub const REQUIRED: [StabilityCounter; 2] =
        [StabilityCounter::LaunchCount, StabilityCounter::CrashCount];

    /// Emitted only when non-zero; aggregated by summing server side.
    pub const REALTIME: [StabilityCounter; 5] = [
        StabilityCounter::PageLoadCount,
        StabilityCounter::RendererCrashCount,
        StabilityCounter::ExtensionRendererCrashCount,
        StabilityCounter::RendererHangCount,
        StabilityCounter::ChildProcessCrashCount,
    ];

    /// Drained and always emitted, but only in the full stability element.
    pub const SESSION_END: [StabilityCounter; 5] = [
        StabilityCounter::IncompleteShutdownCount,
        StabilityCounter::BreakpadRegistrationSuccess,
        StabilityCounter::BreakpadRegistrationFailure,
        StabilityCounter::DebuggerPresent,
        StabilityCounter::DebuggerNotPresent,
    ];

    /// Only meaningful on Linux-family systems; structured encoding only.
    pub const SYSTEM: [StabilityCounter; 3] = [
        StabilityCounter::OtherUserCrashCount,
        StabilityCounter::KernelCrashCount,
        StabilityCounter::SystemUncleanShutdownCount,
    ];

    /// Counter store key holding the pending value
    pub fn store_key(self) -> &'static str {
        match self {
            StabilityCounter::LaunchCount => "stability.launch_count",
            StabilityCounter::CrashCount => "stability.crash_count",
            StabilityCounter::IncompleteShutdownCount => {
                "stability.incomplete_session_end_count"
            }
            StabilityCounter::BreakpadRegistrationSuccess => {
                "stability.breakpad_registration_ok"
            }
            StabilityCounter::BreakpadRegistrationFailure => {
                "stability.breakpad_registration_fail"
            }
            StabilityCounter::DebuggerPresent => "stability.debugger_present",
            StabilityCounter::DebuggerNotPresent => "stability.debugger_not_present",
            StabilityCounter::PageLoadCount => "stability.page_load_count",
            StabilityCounter::RendererCrashCount => "stability.renderer_crash_count",
            StabilityCounter::ExtensionRendererCrashCount => {
                "stability.extension_renderer_crash_count"
            }
            StabilityCounter::RendererHangCount => "stability.renderer_hang_count",
            StabilityCounter::ChildProcessCrashCount => "stability.child_process_crash_count",
            StabilityCounter::OtherUserCrashCount => "stability.other_user_crash_count",
            StabilityCounter::KernelCrashCount => "stability.kernel_crash_count",
            StabilityCounter::SystemUncleanShutdownCount => {
                "stability.system_unclean_shutdowns"
            }
        }
    }

    /// Attribute name on the legacy `stability` element, if the counter has one
    pub fn legacy_attribute(self) -> Option<&'static str> {
        match self {
            StabilityCounter::LaunchCount => Some("launchcount"),
            StabilityCounter::CrashCount => Some("crashcount"),
            StabilityCounter::IncompleteShutdownCount => Some("incompleteshutdowncount"),
            StabilityCounter::BreakpadRegistrationSuccess => Some("breakpadregistrationok"),
            StabilityCounter::BreakpadRegistrationFailure => Some("breakpadregistrationfail"),
            StabilityCounter::DebuggerPresent => Some("debuggerpresent"),
            StabilityCounter::DebuggerNotPresent => Some("debuggernotpresent"),
            StabilityCounter::PageLoadCount => Some("pageloadcount"),
            StabilityCounter::RendererCrashCount => Some("renderercrashcount"),
            StabilityCounter::ExtensionRendererCrashCount => Some("extensionrenderercrashcount"),
            StabilityCounter::RendererHangCount => Some("rendererhangcount"),
            StabilityCounter::ChildProcessCrashCount => Some("childprocesscrashcount"),
            StabilityCounter::OtherUserCrashCount
            | StabilityCounter::KernelCrashCount
            | StabilityCounter::SystemUncleanShutdownCount => None,
        }
    }

    fn field(self, stability: &mut Stability) -> &mut Option<i64> {
        match self {
            StabilityCounter::LaunchCount => &mut stability.launch_count,
            StabilityCounter::CrashCount => &mut stability.crash_count,
            StabilityCounter::IncompleteShutdownCount => &mut stability.incomplete_shutdown_count,
            StabilityCounter::BreakpadRegistrationSuccess => {
                &mut stability.breakpad_registration_success_count
            }
            StabilityCounter::BreakpadRegistrationFailure => {
                &mut stability.breakpad_registration_failure_count
            }
            StabilityCounter::DebuggerPresent => &mut stability.debugger_present_count,
            StabilityCounter::DebuggerNotPresent => &mut stability.debugger_not_present_count,
            StabilityCounter::PageLoadCount => &mut stability.page_load_count,
            StabilityCounter::RendererCrashCount => &mut stability.renderer_crash_count,
            StabilityCounter::ExtensionRendererCrashCount => {
                &mut stability.extension_renderer_crash_count
            }
            StabilityCounter::RendererHangCount => &mut stability.renderer_hang_count,
            StabilityCounter::ChildProcessCrashCount => &mut stability.child_process_crash_count,
            StabilityCounter::OtherUserCrashCount => &mut stability.other_user_crash_count,
            StabilityCounter::KernelCrashCount => &mut stability.kernel_crash_count,
            StabilityCounter::SystemUncleanShutdownCount => {
                &mut stability.unclean_system_shutdown_count
            }
        }
    }

    /// Pair the counter with a drained value, ready to be recorded
    pub fn with_value(self, value: i64) -> StabilityFact {
        StabilityFact {
            counter: self,
            value,
        }
    }
}

/// One drained stability counter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityFact {
    pub counter: StabilityCounter,
    pub value: i64,
}

impl Fact for StabilityFact {
    fn write_legacy(&self, element: &mut Element) {
        if let Some(name) = self.counter.legacy_attribute() {
            element.push_attribute(name, self.value.to_string());
        }
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        let stability = log.system_profile.stability_mut();
        *self.counter.field(stability) = Some(self.value);
    }
}

/// Uptime accrued since the previous sample, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeFact(pub i64);

impl Fact for UptimeFact {
    fn write_legacy(&self, element: &mut Element) {
        element.push_attribute("uptimesec", self.0.to_string());
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        log.system_profile.stability_mut().uptime_sec = Some(self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StabilityCounter; 15] = [
        StabilityCounter::LaunchCount,
        StabilityCounter::CrashCount,
        StabilityCounter::IncompleteShutdownCount,
        StabilityCounter::BreakpadRegistrationSuccess,
        StabilityCounter::BreakpadRegistrationFailure,
        StabilityCounter::DebuggerPresent,
        StabilityCounter::DebuggerNotPresent,
        StabilityCounter::PageLoadCount,
        StabilityCounter::RendererCrashCount,
        StabilityCounter::ExtensionRendererCrashCount,
        StabilityCounter::RendererHangCount,
        StabilityCounter::ChildProcessCrashCount,
        StabilityCounter::OtherUserCrashCount,
        StabilityCounter::KernelCrashCount,
        StabilityCounter::SystemUncleanShutdownCount,
    ];

    #[test]
    fn test_counter_classes_partition_all_counters() {
        let classified: Vec<StabilityCounter> = StabilityCounter::REQUIRED
            .iter()
            .chain(StabilityCounter::REALTIME.iter())
            .chain(StabilityCounter::SESSION_END.iter())
            .chain(StabilityCounter::SYSTEM.iter())
            .copied()
            .collect();
        assert_eq!(classified.len(), ALL.len());
        for counter in ALL {
            assert!(classified.contains(&counter), "{counter:?} unclassified");
        }
    }

    #[test]
    fn test_store_keys_are_unique() {
        let mut keys: Vec<&str> = ALL.iter().map(|c| c.store_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ALL.len());
    }

    #[test]
    fn test_stability_fact_writes_both_encodings() {
        let mut element = Element::new("stability");
        let mut log = StructuredLog::default();

        let fact = StabilityCounter::RendererHangCount.with_value(4);
        fact.write_legacy(&mut element);
        fact.write_structured(&mut log);

        assert_eq!(element.attribute("rendererhangcount"), Some("4"));
        let stability = log.system_profile.stability.unwrap();
        assert_eq!(stability.renderer_hang_count, Some(4));
    }

    #[test]
    fn test_system_counters_have_no_legacy_attribute() {
        for counter in StabilityCounter::SYSTEM {
            assert!(counter.legacy_attribute().is_none());
        }
    }
}
