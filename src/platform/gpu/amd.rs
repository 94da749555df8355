#[cfg(all(unix, feature = "rocm"))]
use rocm_smi_lib::{DeviceHandle, RocmSmi};

use crate::core::monitor::{GpuUsageProvider, GpuVendor};
use crate::error::{Result, TelemonError};

/// AMD GPU usage provider using ROCm SMI
pub struct AmdUsageProvider {
    #[cfg(all(unix, feature = "rocm"))]
    rocm: RocmSmi,
    #[allow(dead_code)]
    device_index: u32,
}

impl AmdUsageProvider {
    /// Create a new AMD GPU provider
    ///
    /// Initializes ROCm SMI and selects the first available GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    /// Create provider for a specific GPU index
    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(all(unix, feature = "rocm"))]
        {
            let rocm = RocmSmi::init().map_err(|e| {
                TelemonError::gpu_not_available(format!("Failed to init ROCm SMI: {:?}", e))
            })?;

            // Verify device exists
            let device_count = rocm.get_device_count().map_err(|e| {
                TelemonError::gpu_not_available(format!("Failed to get device count: {:?}", e))
            })?;

            if index >= device_count as u32 {
                return Err(TelemonError::gpu_not_available(format!(
                    "GPU {} not found (only {} devices available)",
                    index, device_count
                )));
            }

            Ok(Self {
                rocm,
                device_index: index,
            })
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            let _ = index;
            Err(TelemonError::gpu_not_available(
                "AMD GPU support not enabled or not on Unix",
            ))
        }
    }

    #[cfg(all(unix, feature = "rocm"))]
    fn get_device(&self) -> Option<DeviceHandle> {
        self.rocm.get_device_handle(self.device_index).ok()
    }
}

impl GpuUsageProvider for AmdUsageProvider {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Amd
    }

    fn is_available(&self) -> bool {
        #[cfg(all(unix, feature = "rocm"))]
        {
            self.get_device().is_some()
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            false
        }
    }

    fn query_usage_percent(&mut self) -> Option<f64> {
        #[cfg(all(unix, feature = "rocm"))]
        {
            let device = self.get_device()?;
            self.rocm
                .get_busy_percent(&device)
                .ok()
                .map(|busy| busy as f64)
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            None
        }
    }
}
