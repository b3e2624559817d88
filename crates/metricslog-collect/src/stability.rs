//! Stability counters
//!
//! [`StabilityCollector`] drains the persisted stability counters into a
//! report. Every counter it emits is reset to zero in the store within the
//! same call that read it, so a value is reported at most once. If the report
//! is never delivered the drained values are lost; callers accept that.
//!
//! Counters fall into four classes (see [`StabilityCounter`]):
//! - required: always written, zero included
//! - realtime: written and reset only when non-zero
//! - session-end: always written, full stability element only
//! - system: Linux only, structured encoding only, zero suppressed

use metricslog_core::domain::{Report, ReportError, StabilityCounter, UptimeFact};
use metricslog_core::ports::ICounterStore;

use crate::environment::write_install_element;
use crate::plugins::PluginStabilityCorrelator;
use crate::uptime::UptimeTracker;

/// Drains stability counters into a report
pub struct StabilityCollector<'a> {
    uptime: &'a mut UptimeTracker,
    plugins: PluginStabilityCorrelator<'a>,
}

impl<'a> StabilityCollector<'a> {
    pub fn new(uptime: &'a mut UptimeTracker, plugins: PluginStabilityCorrelator<'a>) -> Self {
        Self { uptime, plugins }
    }

    // ========================================================================
    // Counter classes
    // ========================================================================

    /// Drain and write the required counters, zero included.
    pub fn write_required(
        report: &mut Report,
        store: &mut dyn ICounterStore,
    ) -> Result<(), ReportError> {
        report.ensure_building("write_required")?;
        for counter in StabilityCounter::REQUIRED {
            let value = store.drain_int(counter.store_key());
            report.record(&counter.with_value(value))?;
        }
        Ok(())
    }

    /// Drain and write the session-end counters, zero included.
    pub fn write_session_end(
        report: &mut Report,
        store: &mut dyn ICounterStore,
    ) -> Result<(), ReportError> {
        report.ensure_building("write_session_end")?;
        for counter in StabilityCounter::SESSION_END {
            let value = store.drain_int(counter.store_key());
            report.record(&counter.with_value(value))?;
        }
        Ok(())
    }

    /// Write and reset the non-zero realtime counters, then the system
    /// counters on Linux, then the uptime accrued since the last sample.
    pub fn write_realtime(
        &mut self,
        report: &mut Report,
        store: &mut dyn ICounterStore,
    ) -> Result<(), ReportError> {
        report.ensure_building("write_realtime")?;
        write_optional(report, store, &StabilityCounter::REALTIME)?;

        #[cfg(target_os = "linux")]
        write_optional(report, store, &StabilityCounter::SYSTEM)?;

        let uptime = self.uptime.sample(store);
        if uptime > 0 {
            report.record(&UptimeFact(uptime))?;
        }
        Ok(())
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Write the full `stability` element: required, realtime and
    /// session-end counters followed by plugin stability.
    pub fn write_stability_element(
        &mut self,
        report: &mut Report,
        store: &mut dyn ICounterStore,
    ) -> Result<(), ReportError> {
        let mut stability = report.open_scope("stability")?;
        Self::write_required(&mut stability, store)?;
        self.write_realtime(&mut stability, store)?;
        Self::write_session_end(&mut stability, store)?;
        self.plugins.write_plugin_stability(&mut stability, store)?;
        Ok(())
    }

    /// Write the minimal stability block sent with incremental logs.
    ///
    /// Produces a `profile` element carrying the common event attributes,
    /// the `install` element, and a `stability` element with the required
    /// and realtime counters and plugin stability. Session-end counters are
    /// left in the store for the next full log.
    pub fn write_incremental_stability(
        &mut self,
        report: &mut Report,
        store: &mut dyn ICounterStore,
    ) -> Result<(), ReportError> {
        let mut profile = report.open_scope("profile")?;
        profile.write_common_event_attributes()?;
        write_install_element(&mut profile, Some(&*store))?;

        let mut stability = profile.open_scope("stability")?;
        Self::write_required(&mut stability, store)?;
        self.write_realtime(&mut stability, store)?;
        self.plugins.write_plugin_stability(&mut stability, store)?;
        Ok(())
    }
}

/// Write and reset each counter that is non-zero; zero counters are left
/// alone in both the report and the store.
fn write_optional(
    report: &mut Report,
    store: &mut dyn ICounterStore,
    counters: &[StabilityCounter],
) -> Result<(), ReportError> {
    for &counter in counters {
        let value = store.get_int(counter.store_key());
        if value != 0 {
            report.record(&counter.with_value(value))?;
            store.set_int(counter.store_key(), 0);
        }
    }
    Ok(())
}
