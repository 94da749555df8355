use serde::{Deserialize, Serialize};

/// Trait for GPU utilization providers
///
/// This trait abstracts GPU usage queries across different vendors
/// (NVIDIA, AMD, Intel). It is independent of the hardware sensor provider
/// and may use a different data source. Implementations are provided in the
/// platform layer.
pub trait GpuUsageProvider: Send {
    /// Get the vendor of the GPU
    fn vendor(&self) -> GpuVendor;

    /// Current GPU utilization percentage, `None` when the query fails.
    ///
    /// Absence is a normal condition (driver gone, device lost), not an
    /// error to surface.
    fn query_usage_percent(&mut self) -> Option<f64>;

    /// Check if the GPU provider is available and functional
    fn is_available(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    #[default]
    Unknown,
}
