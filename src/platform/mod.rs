//! Platform-specific provider implementations.
//!
//! The core layer only talks to the traits in `core::monitor`; everything
//! touching a real OS facility lives here.

pub mod gpu;
pub mod memory;
pub mod sensors;
pub mod times;
