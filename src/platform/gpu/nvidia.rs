#[cfg(feature = "nvml")]
use nvml_wrapper::{Device, Nvml};

use crate::core::monitor::{GpuUsageProvider, GpuVendor};
use crate::error::{Result, TelemonError};

/// NVIDIA GPU usage provider using NVML
pub struct NvidiaUsageProvider {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
    #[allow(dead_code)]
    device_index: u32,
}

impl NvidiaUsageProvider {
    /// Create a new NVIDIA GPU provider
    ///
    /// Initializes NVML and selects the first available GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    /// Create provider for a specific GPU index
    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init().map_err(|e| {
                TelemonError::gpu_not_available(format!("Failed to init NVML: {}", e))
            })?;

            // Verify device exists
            let _ = nvml.device_by_index(index).map_err(|e| {
                TelemonError::gpu_not_available(format!("GPU {} not found: {}", index, e))
            })?;

            Ok(Self {
                nvml,
                device_index: index,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            let _ = index;
            Err(TelemonError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device(&self) -> Option<Device<'_>> {
        self.nvml.device_by_index(self.device_index).ok()
    }
}

impl GpuUsageProvider for NvidiaUsageProvider {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Nvidia
    }

    fn is_available(&self) -> bool {
        #[cfg(feature = "nvml")]
        {
            self.get_device().is_some()
        }
        #[cfg(not(feature = "nvml"))]
        {
            false
        }
    }

    fn query_usage_percent(&mut self) -> Option<f64> {
        #[cfg(feature = "nvml")]
        {
            let device = self.get_device()?;
            device
                .utilization_rates()
                .ok()
                .map(|utilization| utilization.gpu as f64)
        }
        #[cfg(not(feature = "nvml"))]
        {
            None
        }
    }
}
