/*!
 * Metrics Calculation
 * Derived figures over the page table and segment list
 */

use super::host::HostMemorySample;
use crate::core::types::percentage;
use crate::memory::{MemoryPressure, PageTable, SegmentList};
use serde::Serialize;

/// Lifetime operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounters {
    pub total_allocations: u64,
    pub total_deallocations: u64,
}

/// Point-in-time metrics for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Percent of pages in use
    pub used_page_ratio: f64,
    /// Percent of segments whose owner differs from their predecessor's
    pub fragmentation_rate: f64,
    /// Highest `used_page_ratio` seen so far; never decreases
    pub peak_usage_ratio: f64,
    pub total_allocations: u64,
    pub total_deallocations: u64,
    pub used_pages: usize,
    pub free_pages: usize,
    pub capacity: usize,
    pub page_size_kb: usize,
    pub largest_free_run: usize,
    pub pressure: MemoryPressure,
    /// Latest successful host sample, absent until the first one arrives
    pub host: Option<HostMemorySample>,
}

/// Metrics calculator
///
/// Stateless apart from the running peak, which lives as long as the
/// calculator does.
#[derive(Debug, Clone, Default)]
pub struct MetricsCalculator {
    peak_usage_ratio: f64,
}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `used / capacity * 100`
    pub fn used_page_ratio(table: &PageTable) -> f64 {
        percentage(table.used_count(), table.capacity())
    }

    /// Owner-tag transitions between adjacent segments, over segment count
    ///
    /// Counts transitions, not free-space gaps. An empty list scores 0.
    pub fn fragmentation_rate(segments: &SegmentList) -> f64 {
        let transitions = segments
            .as_slice()
            .windows(2)
            .filter(|pair| pair[0].owner != pair[1].owner)
            .count();
        percentage(transitions, segments.len())
    }

    /// Recompute every metric and advance the peak
    pub fn recompute(
        &mut self,
        table: &PageTable,
        segments: &SegmentList,
        counters: OperationCounters,
        page_size_kb: usize,
        host: Option<HostMemorySample>,
    ) -> MetricsSnapshot {
        let used_page_ratio = Self::used_page_ratio(table);
        if used_page_ratio > self.peak_usage_ratio {
            self.peak_usage_ratio = used_page_ratio;
        }

        let used_pages = table.used_count();
        MetricsSnapshot {
            used_page_ratio,
            fragmentation_rate: Self::fragmentation_rate(segments),
            peak_usage_ratio: self.peak_usage_ratio,
            total_allocations: counters.total_allocations,
            total_deallocations: counters.total_deallocations,
            used_pages,
            free_pages: table.capacity() - used_pages,
            capacity: table.capacity(),
            page_size_kb,
            largest_free_run: table.largest_free_run(),
            pressure: MemoryPressure::from_percentage(used_page_ratio),
            host,
        }
    }
}
