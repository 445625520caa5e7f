/*!
 * Allocation Engine
 *
 * Owns the page table, the segment list and the operation counters, and is
 * the only thing that mutates them.
 *
 * ## Transitions
 *
 * - **Allocate**: fresh owner tag, random run length in `1..=max_run`,
 *   first-fit search, then pages + segment + counter all at once or not at all
 * - **Deallocate**: pop the newest segment, free every page carrying its tag
 * - **Tick**: merge the latest host sample (if any) and recompute metrics
 *
 * Every method takes `&mut self`, so transitions are applied one at a time by
 * construction. Soft failures return `Err` and leave all state untouched.
 */

mod allocator;
mod command;

pub use command::{Command, EngineSnapshot, Transition};

use super::page_table::PageTable;
use super::segments::SegmentList;
use super::tags::TagGenerator;
use super::types::MemoryPressure;
use crate::core::config::SimConfig;
use crate::core::types::Size;
use crate::monitoring::{HostMemorySample, MetricsCalculator, MetricsSnapshot, OperationCounters};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Memory allocation engine
pub struct Engine<R = StdRng> {
    pages: PageTable,
    segments: SegmentList,
    counters: OperationCounters,
    calculator: MetricsCalculator,
    metrics: MetricsSnapshot,
    host: Option<HostMemorySample>,
    tags: TagGenerator,
    rng: R,
    page_size_kb: Size,
    max_run_length: usize,
}

impl Engine<StdRng> {
    /// Create an engine seeded from the config, or from OS entropy
    pub fn new(config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Engine<R> {
    /// Create an engine driven by a caller-provided RNG
    pub fn with_rng(config: &SimConfig, rng: R) -> Self {
        let pages = PageTable::new(config.page_count);
        let segments = SegmentList::new();
        let counters = OperationCounters::default();
        let mut calculator = MetricsCalculator::new();
        let metrics = calculator.recompute(&pages, &segments, counters, config.page_size_kb, None);

        info!(
            pages = config.page_count,
            page_size_kb = config.page_size_kb,
            max_run = config.max_run_length,
            "Allocation engine initialized"
        );

        Self {
            pages,
            segments,
            counters,
            calculator,
            metrics,
            host: None,
            tags: TagGenerator::new(config.tag_policy, config.tag_space),
            rng,
            page_size_kb: config.page_size_kb,
            max_run_length: config.max_run_length.max(1),
        }
    }

    pub fn page_table(&self) -> &PageTable {
        &self.pages
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub fn counters(&self) -> OperationCounters {
        self.counters
    }

    pub fn page_size_kb(&self) -> Size {
        self.page_size_kb
    }

    /// Metrics as of the last transition
    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    /// Merge a host sample and recompute metrics
    ///
    /// `None` means no new sample arrived; the previous one is kept.
    pub fn tick(&mut self, sample: Option<HostMemorySample>) -> &MetricsSnapshot {
        if sample.is_some() {
            self.host = sample;
        }
        self.refresh();
        &self.metrics
    }

    /// Apply one command
    pub fn apply(&mut self, command: Command) -> Transition {
        match command {
            Command::Allocate => match self.allocate() {
                Ok(allocation) => Transition::Allocated(allocation),
                Err(e) => Transition::Rejected(e),
            },
            Command::Deallocate => match self.deallocate() {
                Ok(deallocation) => Transition::Deallocated(deallocation),
                Err(e) => Transition::Rejected(e),
            },
            Command::Tick(sample) => {
                self.tick(sample);
                Transition::Ticked
            }
            Command::Quit => Transition::Quit,
        }
    }

    /// Owned copy of everything a renderer needs
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            pages: self.pages.pages().to_vec(),
            segments: self.segments.as_slice().to_vec(),
            metrics: self.metrics.clone(),
        }
    }

    /// Recompute metrics and report pressure changes
    fn refresh(&mut self) {
        let previous = self.metrics.pressure;
        self.metrics = self.calculator.recompute(
            &self.pages,
            &self.segments,
            self.counters,
            self.page_size_kb,
            self.host,
        );

        let current = self.metrics.pressure;
        if current > previous && current >= MemoryPressure::High {
            warn!(
                pressure = %current,
                used_pct = self.metrics.used_page_ratio,
                free_pages = self.metrics.free_pages,
                "Simulated memory pressure rising"
            );
        }
    }
}
