/*!
 * memtrack Library
 * Paging and segmentation simulator with live host memory statistics
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod ui;

// Re-exports
pub use crate::core::errors::{AppError, AppResult, ConfigError};
pub use crate::core::{SimConfig, TagPolicy};
pub use memory::{Command, Engine, EngineSnapshot, MemoryError, MemoryResult, Transition};
pub use monitoring::{
    init_tracing, HostMemorySample, HostMemorySource, HostSampler, MetricsSnapshot, ProcMeminfo,
};
