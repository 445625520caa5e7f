/*!
 * Core Types
 * Common types used across the simulator
 */

/// Index of a slot in the simulated page table
pub type PageIndex = usize;

/// Size type for simulated memory, in kilobytes
pub type Size = usize;

/// Opaque identifier of the simulated process owning pages and segments
pub type OwnerTag = String;

/// Bytes in one mebibyte, used when presenting host memory figures
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Convert a byte count to whole mebibytes
#[inline]
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / BYTES_PER_MIB
}

/// Percentage of `part` in `whole`, 0 when `whole` is empty
#[inline]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
