/*!
 * Simulation Configuration
 *
 * Runtime configuration loaded from `MEMTRACK_*` environment variables,
 * falling back to the defaults in [`crate::core::limits`].
 */

use super::errors::ConfigError;
use super::limits::*;
use std::time::Duration;
use tracing::info;

/// How owner tags are chosen for new allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagPolicy {
    /// Uniformly random in the tag space; unrelated allocations may collide
    #[default]
    Random,
    /// Monotonically increasing counter; tags never repeat
    Sequential,
}

impl std::str::FromStr for TagPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(TagPolicy::Random),
            "sequential" | "seq" => Ok(TagPolicy::Sequential),
            _ => Err(()),
        }
    }
}

/// Simulator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Slots in the page table, fixed for the lifetime of the engine
    pub page_count: usize,
    /// Size of one page in KB
    pub page_size_kb: usize,
    /// Longest run of pages a single allocation may request
    pub max_run_length: usize,
    /// Tick interval
    pub refresh_interval: Duration,
    pub tag_policy: TagPolicy,
    /// Random tags are drawn from [0, tag_space)
    pub tag_space: u32,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            page_count: DEFAULT_PAGE_COUNT,
            page_size_kb: DEFAULT_PAGE_SIZE_KB,
            max_run_length: DEFAULT_MAX_RUN_LENGTH,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            tag_policy: TagPolicy::default(),
            tag_space: DEFAULT_TAG_SPACE,
            seed: None,
        }
    }
}

impl SimConfig {
    pub const ENV_PAGES: &'static str = "MEMTRACK_PAGES";
    pub const ENV_PAGE_SIZE_KB: &'static str = "MEMTRACK_PAGE_SIZE_KB";
    pub const ENV_MAX_RUN: &'static str = "MEMTRACK_MAX_RUN";
    pub const ENV_REFRESH_MS: &'static str = "MEMTRACK_REFRESH_MS";
    pub const ENV_TAGS: &'static str = "MEMTRACK_TAGS";
    pub const ENV_TAG_SPACE: &'static str = "MEMTRACK_TAG_SPACE";
    pub const ENV_SEED: &'static str = "MEMTRACK_SEED";

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            pages = config.page_count,
            page_size_kb = config.page_size_kb,
            max_run = config.max_run_length,
            refresh_ms = config.refresh_interval.as_millis() as u64,
            tag_policy = ?config.tag_policy,
            seeded = config.seed.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset keys keep their defaults; set keys must parse and pass validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::ENV_PAGES) {
            config.page_count = parse_number(Self::ENV_PAGES, &raw)?;
        }
        if let Some(raw) = lookup(Self::ENV_PAGE_SIZE_KB) {
            config.page_size_kb = parse_number(Self::ENV_PAGE_SIZE_KB, &raw)?;
        }
        if let Some(raw) = lookup(Self::ENV_MAX_RUN) {
            config.max_run_length = parse_number(Self::ENV_MAX_RUN, &raw)?;
        }
        if let Some(raw) = lookup(Self::ENV_REFRESH_MS) {
            config.refresh_interval =
                Duration::from_millis(parse_number(Self::ENV_REFRESH_MS, &raw)?);
        }
        if let Some(raw) = lookup(Self::ENV_TAGS) {
            config.tag_policy = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: Self::ENV_TAGS,
                value: raw.clone(),
                expected: "`random` or `sequential`",
            })?;
        }
        if let Some(raw) = lookup(Self::ENV_TAG_SPACE) {
            config.tag_space = parse_number(Self::ENV_TAG_SPACE, &raw)?;
        }
        if let Some(raw) = lookup(Self::ENV_SEED) {
            config.seed = Some(parse_number(Self::ENV_SEED, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every field against its bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_count == 0 || self.page_count > MAX_PAGE_COUNT {
            return Err(ConfigError::OutOfRange {
                key: Self::ENV_PAGES,
                value: self.page_count as u64,
                min: 1,
                max: MAX_PAGE_COUNT as u64,
            });
        }
        if self.page_size_kb == 0 {
            return Err(ConfigError::OutOfRange {
                key: Self::ENV_PAGE_SIZE_KB,
                value: 0,
                min: 1,
                max: u64::MAX,
            });
        }
        if self.max_run_length == 0 || self.max_run_length > self.page_count {
            return Err(ConfigError::OutOfRange {
                key: Self::ENV_MAX_RUN,
                value: self.max_run_length as u64,
                min: 1,
                max: self.page_count as u64,
            });
        }
        if self.refresh_interval < MIN_REFRESH_INTERVAL
            || self.refresh_interval > MAX_REFRESH_INTERVAL
        {
            return Err(ConfigError::OutOfRange {
                key: Self::ENV_REFRESH_MS,
                value: self.refresh_interval.as_millis() as u64,
                min: MIN_REFRESH_INTERVAL.as_millis() as u64,
                max: MAX_REFRESH_INTERVAL.as_millis() as u64,
            });
        }
        if self.tag_space == 0 {
            return Err(ConfigError::OutOfRange {
                key: Self::ENV_TAG_SPACE,
                value: 0,
                min: 1,
                max: u32::MAX as u64,
            });
        }
        Ok(())
    }

    /// Builder-style page count override (useful for tests)
    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = page_count;
        self.max_run_length = self.max_run_length.min(page_count.max(1));
        self
    }

    pub fn with_tag_policy(mut self, policy: TagPolicy) -> Self {
        self.tag_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        expected: "a non-negative integer",
    })
}
