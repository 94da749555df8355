//! Memory load backed by `sysinfo`.

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::core::monitor::MemoryStatusSource;
use crate::error::{Result, TelemonError};

/// Memory-load source reading used/total physical memory via `sysinfo`.
pub struct SysinfoMemorySource {
    system: System,
}

impl SysinfoMemorySource {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        Self { system }
    }
}

impl Default for SysinfoMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStatusSource for SysinfoMemorySource {
    fn query_memory_load_percent(&mut self) -> Result<f64> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Err(TelemonError::metric_collection(
                "total memory reported as zero",
            ));
        }

        Ok(self.system.used_memory() as f64 / total as f64 * 100.0)
    }
}
