/*!
 * Host Memory
 * Whole-machine physical memory figures from the operating system
 */

use crate::core::types::bytes_to_mib;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Host sampling errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostSampleError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Malformed memory info: missing or invalid {0}")]
    Malformed(&'static str),

    #[error("Host memory sampling is not supported on this platform")]
    Unsupported,
}

/// One reading of host memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HostMemorySample {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
}

impl HostMemorySample {
    pub fn total_mib(&self) -> u64 {
        bytes_to_mib(self.total_bytes)
    }

    pub fn used_mib(&self) -> u64 {
        bytes_to_mib(self.used_bytes)
    }

    pub fn free_mib(&self) -> u64 {
        bytes_to_mib(self.free_bytes)
    }
}

/// Source of host memory samples
pub trait HostMemorySource: Send + Sync {
    fn sample(&self) -> Result<HostMemorySample, HostSampleError>;
}

/// Linux `/proc/meminfo` reader
#[derive(Debug, Clone)]
pub struct ProcMeminfo {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    path: PathBuf,
}

impl ProcMeminfo {
    pub const DEFAULT_PATH: &'static str = "/proc/meminfo";

    pub fn new() -> Self {
        Self::with_path(Self::DEFAULT_PATH)
    }

    /// Read from an alternate file with the same format
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse `/proc/meminfo` content
    ///
    /// Used memory excludes buffers and page cache, the same accounting
    /// `free(1)` uses.
    pub fn parse(content: &str) -> Result<HostMemorySample, HostSampleError> {
        let mut total = None;
        let mut free = None;
        let mut buffers = 0u64;
        let mut cached = 0u64;
        let mut reclaimable = 0u64;

        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(kb) = value.parse::<u64>() else {
                continue;
            };
            match key {
                "MemTotal:" => total = Some(kb),
                "MemFree:" => free = Some(kb),
                "Buffers:" => buffers = kb,
                "Cached:" => cached = kb,
                "SReclaimable:" => reclaimable = kb,
                _ => {}
            }
        }

        let total = total.filter(|&t| t > 0).ok_or(HostSampleError::Malformed("MemTotal"))?;
        let free = free.ok_or(HostSampleError::Malformed("MemFree"))?;
        let used = total
            .saturating_sub(free)
            .saturating_sub(buffers)
            .saturating_sub(cached)
            .saturating_sub(reclaimable);

        Ok(HostMemorySample {
            total_bytes: total * 1024,
            used_bytes: used * 1024,
            free_bytes: free * 1024,
            used_percent: used as f64 / total as f64 * 100.0,
        })
    }
}

impl Default for ProcMeminfo {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMemorySource for ProcMeminfo {
    #[cfg(target_os = "linux")]
    fn sample(&self) -> Result<HostMemorySample, HostSampleError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| HostSampleError::Read {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    #[cfg(not(target_os = "linux"))]
    fn sample(&self) -> Result<HostMemorySample, HostSampleError> {
        Err(HostSampleError::Unsupported)
    }
}
