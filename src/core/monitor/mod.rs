//! Host telemetry core.
//!
//! This module provides the business logic for sampling CPU, memory, GPU,
//! and temperature telemetry and publishing it to subscribers. Providers
//! backed by real OS facilities live in the platform layer; everything here
//! talks to them through the traits defined alongside each component.

mod cpu;
mod gpu;
mod memory;
#[allow(clippy::module_inception)]
mod monitor;
mod sample;
mod sensors;

pub use cpu::{CpuTimeSnapshot, CpuUsageTracker, SystemTimeSource};
pub use gpu::{GpuUsageProvider, GpuVendor};
pub use memory::MemoryStatusSource;
pub use monitor::{
    MonitorBuilder, PerformanceMonitor, SubscriptionHandle, DEFAULT_SAMPLE_INTERVAL,
};
pub use sample::PerformanceSample;
pub use sensors::{
    DeviceClass, DeviceHandle, HardwareSensorProvider, SensorAggregator, SensorKind, SensorReading,
};
