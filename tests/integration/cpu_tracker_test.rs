use telemon::CpuUsageTracker;

use super::support::{FailingTimeSource, FakeTimeSource, snap};

#[test]
fn test_usage_in_range_for_generated_counter_walks() {
    // Deterministic pseudo-random walk over monotonically increasing counters.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state % 10_000
    };

    let mut idle = 0u64;
    let mut kernel = 0u64;
    let mut user = 0u64;
    let mut snapshots = vec![snap(idle, kernel, user)];
    for _ in 0..200 {
        let idle_step = next();
        // Keep the model consistent: kernel includes idle.
        kernel += idle_step + next();
        idle += idle_step;
        user += next();
        snapshots.push(snap(idle, kernel, user));
    }

    let mut tracker = CpuUsageTracker::new(Box::new(FakeTimeSource::new(snapshots)));
    for _ in 0..200 {
        let usage = tracker.compute_usage();
        assert!(
            (0.0..=100.0).contains(&usage),
            "usage {} out of range",
            usage
        );
    }
}

#[test]
fn test_failing_source_always_reports_zero() {
    let mut tracker = CpuUsageTracker::new(Box::new(FailingTimeSource));
    for _ in 0..3 {
        assert_eq!(tracker.compute_usage(), 0.0);
    }
}

#[test]
fn test_reference_delta_scenario() {
    let source = FakeTimeSource::new(vec![snap(1000, 2000, 500), snap(1100, 2300, 600)]);
    let mut tracker = CpuUsageTracker::new(Box::new(source));

    assert_eq!(tracker.compute_usage(), 75.0);
    // The baseline advanced; an unchanged system now reads 0%.
    assert_eq!(tracker.compute_usage(), 0.0);
}
