use serde::{Deserialize, Serialize};

/// One immutable telemetry sample, produced once per tick.
///
/// Percentage fields are always clamped to `[0, 100]`. Optional fields are
/// `None` when the corresponding provider failed or is unavailable — never a
/// sentinel value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub cpu_usage_percent: f64,
    pub cpu_temperature_celsius: Option<f64>,
    pub memory_usage_percent: f64,
    pub gpu_usage_percent: Option<f64>,
    pub gpu_temperature_celsius: Option<f64>,
}

/// Clamp a percentage into `[0, 100]`.
pub(crate) fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
