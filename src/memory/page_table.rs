/*!
 * Page Table
 * Fixed-capacity sequence of simulated pages
 */

use super::types::{MemoryError, MemoryResult, Page};
use crate::core::types::PageIndex;

/// Simulated page table
///
/// Capacity is fixed at construction. Every scan is a single O(N) pass in
/// index order, so results are deterministic for a given table state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTable {
    pages: Vec<Page>,
}

impl PageTable {
    /// Create a table of `capacity` free pages
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: vec![Page::free(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn get(&self, index: PageIndex) -> Option<&Page> {
        self.pages.get(index)
    }

    /// First-fit search for `count` consecutive free pages
    ///
    /// Returns the start index of the first such run, or `None` if the end of
    /// the table is reached first. A request for zero pages never matches.
    pub fn find_contiguous_free(&self, count: usize) -> Option<PageIndex> {
        if count == 0 {
            return None;
        }

        let mut run_start = 0;
        let mut run_len = 0;
        for (index, page) in self.pages.iter().enumerate() {
            if page.is_free() {
                if run_len == 0 {
                    run_start = index;
                }
                run_len += 1;
                if run_len == count {
                    return Some(run_start);
                }
            } else {
                run_len = 0;
            }
        }
        None
    }

    /// Assign `count` pages starting at `start` to `owner`
    ///
    /// The whole range must be in bounds and free; otherwise nothing changes.
    pub fn mark_used(&mut self, start: PageIndex, count: usize, owner: &str) -> MemoryResult<()> {
        let end = start.checked_add(count).filter(|&end| end <= self.pages.len());
        let range = match end {
            Some(end) if count > 0 => start..end,
            _ => {
                return Err(MemoryError::InvalidRange {
                    start,
                    count,
                    capacity: self.pages.len(),
                })
            }
        };

        if self.pages[range.clone()].iter().any(Page::is_used) {
            return Err(MemoryError::InvalidRange {
                start,
                count,
                capacity: self.pages.len(),
            });
        }

        for page in &mut self.pages[range] {
            *page = Page::owned_by(owner.to_string());
        }
        Ok(())
    }

    /// Free every page owned by `owner`, returning how many were freed
    pub fn mark_free_by_owner(&mut self, owner: &str) -> usize {
        let mut freed = 0;
        for page in self.pages.iter_mut().filter(|p| p.owner() == Some(owner)) {
            page.release();
            freed += 1;
        }
        freed
    }

    pub fn used_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_used()).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.used_count()
    }

    /// Length of the longest run of consecutive free pages
    pub fn largest_free_run(&self) -> usize {
        let mut best = 0;
        let mut current = 0;
        for page in &self.pages {
            if page.is_free() {
                current += 1;
                best = best.max(current);
            } else {
                current = 0;
            }
        }
        best
    }
}
