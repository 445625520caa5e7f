/*!
 * Simulation Limits and Defaults
 *
 * Centralized location for the simulator's defaults, bounds and thresholds.
 * Grouped by domain; every value here can be referenced by configuration
 * validation and by the engine itself.
 */

use std::time::Duration;

// =============================================================================
// PAGE TABLE
// =============================================================================

/// Number of pages in the simulated page table
pub const DEFAULT_PAGE_COUNT: usize = 64;

/// Upper bound on configurable page count
/// Keeps the paging grid renderable in a terminal
pub const MAX_PAGE_COUNT: usize = 4096;

/// Simulated page size (4KB)
pub const DEFAULT_PAGE_SIZE_KB: usize = 4;

/// Pages requested by a single allocation are drawn from 1..=this
pub const DEFAULT_MAX_RUN_LENGTH: usize = 3;

// =============================================================================
// OWNER TAGS
// =============================================================================

/// Prefix of every generated owner tag ("P42")
pub const OWNER_TAG_PREFIX: &str = "P";

/// Random tags are drawn from [0, this)
pub const DEFAULT_TAG_SPACE: u32 = 100;

// =============================================================================
// REFRESH
// =============================================================================

/// Tick interval for host sampling and metric recomputation
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Lower bound on the tick interval
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on the tick interval
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

// =============================================================================
// MEMORY PRESSURE (percent of pages in use)
// =============================================================================

/// Medium pressure threshold
pub const PRESSURE_MEDIUM_PCT: f64 = 60.0;

/// High pressure threshold
pub const PRESSURE_HIGH_PCT: f64 = 80.0;

/// Critical pressure threshold
pub const PRESSURE_CRITICAL_PCT: f64 = 95.0;

// =============================================================================
// PRESENTATION
// =============================================================================

/// Pages drawn per row in the paging grid
pub const PAGES_PER_ROW: usize = 16;

/// Segments listed in detail before collapsing into "... and N more"
pub const SEGMENT_TABLE_ROWS: usize = 8;
