use std::alloc::LayoutError;

use thiserror::Error;

/// Reasons an aligned allocation cannot be satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("capacity overflow: {count} elements of {elem_size} bytes")]
    CapacityOverflow { count: usize, elem_size: usize },
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("out of memory: {size} bytes aligned to {align}")]
    OutOfMemory { size: usize, align: usize },
}
