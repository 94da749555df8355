// Telemon Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, TelemonError};

// Module declarations
pub mod core;
pub mod platform;

// Re-export commonly used types
pub use crate::core::monitor::{
    CpuTimeSnapshot, CpuUsageTracker, DeviceClass, DeviceHandle, GpuUsageProvider, GpuVendor,
    HardwareSensorProvider, MemoryStatusSource, MonitorBuilder, PerformanceMonitor,
    PerformanceSample, SensorAggregator, SensorKind, SensorReading, SubscriptionHandle,
    SystemTimeSource, DEFAULT_SAMPLE_INTERVAL,
};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
