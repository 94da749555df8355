use crate::error::Result;

/// Source of the instantaneous memory-load percentage.
///
/// Implementations are provided in the platform layer.
pub trait MemoryStatusSource: Send {
    fn query_memory_load_percent(&mut self) -> Result<f64>;
}
