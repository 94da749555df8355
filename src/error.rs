use std::io;
use thiserror::Error;

/// Custom error type for the telemon library
#[derive(Error, Debug)]
pub enum TelemonError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("System monitor error: {0}")]
    SystemMonitor(String),

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Sensor error: {0}")]
    Sensor(String),
}

/// Result type alias for the telemon library
pub type Result<T> = std::result::Result<T, TelemonError>;

impl TelemonError {
    pub fn system_monitor<S: Into<String>>(msg: S) -> Self {
        TelemonError::SystemMonitor(msg.into())
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        TelemonError::GpuNotAvailable(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        TelemonError::MetricCollection(msg.into())
    }

    pub fn sensor<S: Into<String>>(msg: S) -> Self {
        TelemonError::Sensor(msg.into())
    }
}
