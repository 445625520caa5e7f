/*!
 * Engine Protocol
 * Commands in, transitions and snapshots out
 */

use crate::memory::types::{Allocation, Deallocation, MemoryError, Page, Segment};
use crate::monitoring::{HostMemorySample, MetricsSnapshot};
use serde::Serialize;

/// Input to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Allocate,
    Deallocate,
    /// Periodic refresh carrying the newest host sample, if one arrived
    Tick(Option<HostMemorySample>),
    Quit,
}

/// What a command did
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Allocated(Allocation),
    Deallocated(Deallocation),
    /// Soft failure; engine state is unchanged
    Rejected(MemoryError),
    Ticked,
    Quit,
}

impl Transition {
    pub fn is_quit(&self) -> bool {
        matches!(self, Transition::Quit)
    }
}

/// Read-only view of engine state for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub pages: Vec<Page>,
    pub segments: Vec<Segment>,
    pub metrics: MetricsSnapshot,
}
