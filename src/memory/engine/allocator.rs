/*!
 * Engine Allocator
 * Allocation and deallocation transitions
 */

use super::Engine;
use crate::core::types::OwnerTag;
use crate::memory::types::{Allocation, Deallocation, MemoryError, MemoryResult, Segment};
use rand::Rng;
use tracing::{debug, warn};

impl<R: Rng> Engine<R> {
    /// Allocate a random run of pages for a freshly tagged process
    pub fn allocate(&mut self) -> MemoryResult<Allocation> {
        let owner = self.tags.next_tag(&mut self.rng);
        let pages = self.rng.gen_range(1..=self.max_run_length);
        self.allocate_tagged(owner, pages)
    }

    /// Allocate exactly `pages` pages for a freshly tagged process
    pub fn allocate_run(&mut self, pages: usize) -> MemoryResult<Allocation> {
        let owner = self.tags.next_tag(&mut self.rng);
        self.allocate_tagged(owner, pages)
    }

    /// Allocate `pages` pages under a caller-chosen owner tag
    ///
    /// The tag is not checked for uniqueness: reusing one makes the next
    /// deallocation of that tag free both allocations' pages.
    pub fn allocate_tagged(
        &mut self,
        owner: impl Into<OwnerTag>,
        pages: usize,
    ) -> MemoryResult<Allocation> {
        let owner = owner.into();
        if owner.is_empty() {
            return Err(MemoryError::EmptyOwnerTag);
        }

        let Some(start) = self.pages.find_contiguous_free(pages) else {
            let largest_run = self.pages.largest_free_run();
            debug!(
                owner = %owner,
                requested = pages,
                largest_run,
                "Allocation rejected: insufficient contiguous memory"
            );
            return Err(MemoryError::InsufficientContiguousMemory {
                requested: pages,
                largest_run,
            });
        };

        // The search guarantees a free in-bounds range
        self.pages.mark_used(start, pages, &owner)?;

        let size_kb = pages * self.page_size_kb;
        self.segments.append(Segment::new(size_kb, owner.clone()));
        self.counters.total_allocations += 1;
        self.refresh();

        debug!(
            owner = %owner,
            start,
            pages,
            size_kb,
            segment_kb = self.segments.total_size_kb(),
            used_pct = self.metrics.used_page_ratio,
            "Allocated pages"
        );

        Ok(Allocation {
            owner,
            start,
            pages,
            size_kb,
        })
    }

    /// Release the newest allocation
    pub fn deallocate(&mut self) -> MemoryResult<Deallocation> {
        let Some(segment) = self.segments.pop_tail() else {
            debug!("Deallocation rejected: no outstanding segments");
            return Err(MemoryError::NothingToDeallocate);
        };

        let pages_freed = self.pages.mark_free_by_owner(&segment.owner);
        self.counters.total_deallocations += 1;
        self.refresh();

        let own_pages = segment.size_kb / self.page_size_kb;
        if pages_freed > own_pages {
            warn!(
                owner = %segment.owner,
                own_pages,
                pages_freed,
                "Owner tag shared with another allocation; freed its pages too"
            );
        } else {
            debug!(
                owner = %segment.owner,
                pages_freed,
                size_kb = segment.size_kb,
                segment_kb = self.segments.total_size_kb(),
                "Deallocated segment"
            );
        }

        Ok(Deallocation {
            segment,
            pages_freed,
        })
    }
}
