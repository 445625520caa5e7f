/*!
 * Memory Types
 * Pages, segments and the outcomes of engine operations
 */

use crate::core::limits::{PRESSURE_CRITICAL_PCT, PRESSURE_HIGH_PCT, PRESSURE_MEDIUM_PCT};
use crate::core::types::{OwnerTag, PageIndex, Size};
use serde::Serialize;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
///
/// The first two variants are the expected soft failures of the simulation:
/// the engine leaves all state untouched when it returns them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Insufficient contiguous memory: requested {requested} pages, largest free run is {largest_run}")]
    InsufficientContiguousMemory { requested: usize, largest_run: usize },

    #[error("Nothing to deallocate: segment list is empty")]
    NothingToDeallocate,

    #[error("Owner tag must not be empty")]
    EmptyOwnerTag,

    #[error("Invalid page range: start {start}, count {count}, capacity {capacity}")]
    InvalidRange {
        start: PageIndex,
        count: usize,
        capacity: usize,
    },
}

impl MemoryError {
    /// Soft failures are normal simulation states, not faults
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            MemoryError::InsufficientContiguousMemory { .. } | MemoryError::NothingToDeallocate
        )
    }
}

/// One slot of the simulated page table
///
/// A used page always carries an owner; a free page never does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    owner: Option<OwnerTag>,
}

impl Page {
    pub fn free() -> Self {
        Self { owner: None }
    }

    pub fn owned_by(owner: OwnerTag) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn is_used(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub(super) fn release(&mut self) {
        self.owner = None;
    }
}

impl Serialize for Page {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Page", 2)?;
        state.serialize_field("used", &self.is_used())?;
        state.serialize_field("owner", &self.owner)?;
        state.end()
    }
}

/// Record of one outstanding allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Total size in KB (pages * page size)
    pub size_kb: Size,
    pub owner: OwnerTag,
}

impl Segment {
    pub fn new(size_kb: Size, owner: OwnerTag) -> Self {
        Self { size_kb, owner }
    }
}

/// A successful allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub owner: OwnerTag,
    /// First page of the run
    pub start: PageIndex,
    pub pages: usize,
    pub size_kb: Size,
}

/// A successful deallocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deallocation {
    /// The segment popped from the tail
    pub segment: Segment,
    /// Pages returned to the free state; can exceed the segment's own pages
    /// when another outstanding allocation shares the owner tag
    pub pages_freed: usize,
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    /// Classify a usage percentage
    pub fn from_percentage(usage: f64) -> Self {
        if usage >= PRESSURE_CRITICAL_PCT {
            MemoryPressure::Critical
        } else if usage >= PRESSURE_HIGH_PCT {
            MemoryPressure::High
        } else if usage >= PRESSURE_MEDIUM_PCT {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
