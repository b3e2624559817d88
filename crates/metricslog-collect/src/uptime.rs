//! Uptime sampling
//!
//! [`UptimeTracker`] measures wall-clock time elapsed since its previous
//! sample (initially since process start), adds it to a cumulative counter
//! persisted in the counter store, and reports the delta.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use metricslog_core::ports::ICounterStore;

/// Counter store key of the cumulative uptime, in seconds
pub const UPTIME_KEY: &str = "uninstall_metrics.uptime_sec";

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The system monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same offset, so a test can keep one handle and give the
/// other to a tracker.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Instant the first tracker (or the first call) observed the process
pub fn process_start() -> Instant {
    *PROCESS_START.get_or_init(Instant::now)
}

/// Tracks uptime between reporting cycles
pub struct UptimeTracker {
    clock: Box<dyn Clock>,
    baseline: Instant,
}

impl UptimeTracker {
    /// Tracker on the system clock, measuring from process start
    pub fn new() -> Self {
        Self {
            clock: Box::new(SystemClock),
            baseline: process_start(),
        }
    }

    /// Tracker on `clock`, measuring from the clock's current instant
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        let baseline = clock.now();
        Self {
            clock: Box::new(clock),
            baseline,
        }
    }

    /// Instant the next sample measures from
    pub fn baseline(&self) -> Instant {
        self.baseline
    }

    /// Take a sample
    ///
    /// Returns the whole seconds elapsed since the previous sample and adds
    /// them to the cumulative counter. The baseline always moves to now. A
    /// zero delta leaves the store untouched.
    pub fn sample(&mut self, store: &mut dyn ICounterStore) -> i64 {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.baseline);
        self.baseline = now;

        let seconds = i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX);
        if seconds > 0 {
            let total = store.get_int(UPTIME_KEY).saturating_add(seconds);
            store.set_int(UPTIME_KEY, total);
            tracing::debug!(elapsed_sec = seconds, total_sec = total, "Uptime sampled");
        }
        seconds
    }
}

impl Default for UptimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UptimeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UptimeTracker")
            .field("baseline", &self.baseline)
            .finish_non_exhaustive()
    }
}
