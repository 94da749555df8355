//! GPU-specific platform code.
//!
//! Provides GPU utilization queries for different vendors.
//! Supports NVIDIA (via NVML) and AMD (via ROCm SMI).

mod amd;
mod nvidia;

pub use amd::AmdUsageProvider;
pub use nvidia::NvidiaUsageProvider;

use crate::core::monitor::GpuUsageProvider;
use crate::error::{Result, TelemonError};

/// Attempt to get an available GPU usage provider
///
/// Tries each supported vendor in order of preference:
/// 1. NVIDIA (via NVML)
/// 2. AMD (via ROCm SMI)
///
/// Returns error if no GPU is available.
pub fn detect_gpu_usage_provider() -> Result<Box<dyn GpuUsageProvider>> {
    // Try NVIDIA first
    if let Ok(provider) = NvidiaUsageProvider::new() {
        return Ok(Box::new(provider));
    }

    // Try AMD
    if let Ok(provider) = AmdUsageProvider::new() {
        return Ok(Box::new(provider));
    }

    Err(TelemonError::gpu_not_available("No supported GPU found"))
}
