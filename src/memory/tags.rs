/*!
 * Owner Tags
 * Generation of simulated process identifiers
 */

use crate::core::config::TagPolicy;
use crate::core::limits::OWNER_TAG_PREFIX;
use crate::core::types::OwnerTag;
use rand::Rng;

/// Produces a fresh owner tag for every allocation
#[derive(Debug, Clone)]
pub enum TagGenerator {
    /// "P" + uniform[0, space); repeats are possible and not deduplicated
    Random { space: u32 },
    /// "P" + counter; never repeats
    Sequential { next: u64 },
}

impl TagGenerator {
    pub fn new(policy: TagPolicy, space: u32) -> Self {
        match policy {
            TagPolicy::Random => TagGenerator::Random { space: space.max(1) },
            TagPolicy::Sequential => TagGenerator::Sequential { next: 0 },
        }
    }

    pub fn next_tag<R: Rng + ?Sized>(&mut self, rng: &mut R) -> OwnerTag {
        match self {
            TagGenerator::Random { space } => {
                format!("{}{}", OWNER_TAG_PREFIX, rng.gen_range(0..*space))
            }
            TagGenerator::Sequential { next } => {
                let tag = format!("{}{}", OWNER_TAG_PREFIX, next);
                *next += 1;
                tag
            }
        }
    }
}
