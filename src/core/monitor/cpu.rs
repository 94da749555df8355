use crate::error::Result;

use super::sample::clamp_percent;

/// Cumulative CPU time counters since an arbitrary epoch, in platform time
/// units.
///
/// The accounting model matches the classic system-times API: `kernel`
/// includes `idle`, which is why [`CpuUsageTracker`] subtracts the idle delta
/// to isolate active time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimeSnapshot {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

/// Source of cumulative idle/kernel/user CPU time counters.
///
/// Implementations are provided in the platform layer.
pub trait SystemTimeSource: Send {
    fn query_cumulative_times(&mut self) -> Result<CpuTimeSnapshot>;
}

/// Stateful tracker converting two successive cumulative-time snapshots into
/// a usage percentage.
///
/// Not idempotent: every `compute_usage` call overwrites the stored baseline,
/// so two back-to-back calls over an unchanged system yield 0% on the second
/// call (the diff against itself is zero).
pub struct CpuUsageTracker {
    source: Box<dyn SystemTimeSource>,
    previous: CpuTimeSnapshot,
}

impl CpuUsageTracker {
    /// Create a tracker and capture its initial baseline snapshot.
    pub fn new(source: Box<dyn SystemTimeSource>) -> Self {
        let mut tracker = Self {
            source,
            previous: CpuTimeSnapshot::default(),
        };
        tracker.reset();
        tracker
    }

    /// Capture a fresh baseline snapshot, discarding any prior one.
    ///
    /// If the time source fails the baseline falls back to zeroed counters
    /// and the first subsequent `compute_usage` diffs against boot.
    pub fn reset(&mut self) {
        self.previous = match self.source.query_cumulative_times() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("CPU time source unavailable on reset: {}", e);
                CpuTimeSnapshot::default()
            }
        };
    }

    /// Compute CPU usage since the previous snapshot and advance the baseline.
    ///
    /// Returns `0.0` when the time source fails or when no time elapsed;
    /// telemetry is best-effort and never fatal. Counter deltas saturate at
    /// zero so a wrapped counter degrades to a 0% reading instead of a
    /// garbage percentage.
    pub fn compute_usage(&mut self) -> f64 {
        let now = match self.source.query_cumulative_times() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("CPU time query failed: {}", e);
                return 0.0;
            }
        };

        let idle_diff = now.idle.saturating_sub(self.previous.idle);
        let kernel_diff = now.kernel.saturating_sub(self.previous.kernel);
        let user_diff = now.user.saturating_sub(self.previous.user);
        self.previous = now;

        // Kernel time includes idle time, so active = (kernel + user) - idle.
        let total_sys = kernel_diff.saturating_add(user_diff);
        if total_sys == 0 {
            return 0.0;
        }
        let total_active = total_sys.saturating_sub(idle_diff);

        clamp_percent(total_active as f64 * 100.0 / total_sys as f64)
    }
}
