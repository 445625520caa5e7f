/*!
 * Memory Module
 * Simulated paging and segmentation
 */

pub mod engine;
pub mod page_table;
pub mod segments;
pub mod tags;
pub mod types;

// Re-export for convenience
pub use engine::{Command, Engine, EngineSnapshot, Transition};
pub use page_table::PageTable;
pub use segments::SegmentList;
pub use tags::TagGenerator;
pub use types::*;
