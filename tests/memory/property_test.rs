/*!
 * Engine Property Tests
 * Invariants that must hold for any sequence of operations
 */

use memtrack::memory::{Engine, Page};
use memtrack::{SimConfig, TagPolicy};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
enum Op {
    Allocate,
    AllocateRun(usize),
    Deallocate,
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Allocate),
        2 => (0usize..8).prop_map(Op::AllocateRun),
        3 => Just(Op::Deallocate),
        1 => Just(Op::Tick),
    ]
}

fn engine(pages: usize, policy: TagPolicy, seed: u64) -> Engine<StdRng> {
    let config = SimConfig::default()
        .with_page_count(pages)
        .with_tag_policy(policy);
    Engine::with_rng(&config, StdRng::seed_from_u64(seed))
}

fn replay(engine: &mut Engine<StdRng>, op: &Op) {
    match op {
        Op::Allocate => {
            let _ = engine.allocate();
        }
        Op::AllocateRun(k) => {
            let _ = engine.allocate_run(*k);
        }
        Op::Deallocate => {
            let _ = engine.deallocate();
        }
        Op::Tick => {
            engine.tick(None);
        }
    }
}

proptest! {
    #[test]
    fn used_count_stays_within_capacity(
        pages in 1usize..64,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let mut engine = engine(pages, TagPolicy::Random, seed);
        for op in &ops {
            replay(&mut engine, op);
            let used = engine.page_table().used_count();
            prop_assert!(used <= pages);
            prop_assert_eq!(used + engine.page_table().free_count(), pages);
        }
    }

    #[test]
    fn used_pages_always_have_owners(
        pages in 1usize..32,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..100),
    ) {
        let mut engine = engine(pages, TagPolicy::Random, seed);
        for op in &ops {
            replay(&mut engine, op);
        }
        for page in engine.page_table().pages() {
            match page.owner() {
                Some(owner) => prop_assert!(!owner.is_empty()),
                None => prop_assert!(page.is_free()),
            }
        }
    }

    #[test]
    fn allocate_then_deallocate_round_trips(
        pages in 1usize..32,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..50),
    ) {
        // Unique tags so the round trip cannot free a neighbour's pages
        let mut engine = engine(pages, TagPolicy::Sequential, seed);
        for op in &ops {
            replay(&mut engine, op);
        }

        let before: Vec<Page> = engine.page_table().pages().to_vec();
        let segments_before = engine.segments().len();

        if engine.allocate().is_ok() {
            engine.deallocate().unwrap();
        }

        prop_assert_eq!(engine.page_table().pages(), before.as_slice());
        prop_assert_eq!(engine.segments().len(), segments_before);
    }

    #[test]
    fn peak_never_decreases(
        pages in 1usize..32,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..150),
    ) {
        let mut engine = engine(pages, TagPolicy::Random, seed);
        let mut last_peak = engine.metrics().peak_usage_ratio;
        for op in &ops {
            replay(&mut engine, op);
            let metrics = engine.metrics();
            prop_assert!(metrics.peak_usage_ratio >= last_peak);
            prop_assert!(metrics.peak_usage_ratio >= metrics.used_page_ratio);
            last_peak = metrics.peak_usage_ratio;
        }
    }

    #[test]
    fn unique_tags_keep_segments_and_pages_in_step(
        pages in 1usize..32,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..150),
    ) {
        let mut engine = engine(pages, TagPolicy::Sequential, seed);
        for op in &ops {
            replay(&mut engine, op);
        }
        let page_size = engine.page_size_kb();
        let segment_pages: usize = engine.segments().iter().map(|s| s.size_kb / page_size).sum();
        prop_assert_eq!(segment_pages, engine.page_table().used_count());
    }

    #[test]
    fn counters_match_successful_operations(
        pages in 1usize..32,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..150),
    ) {
        let mut engine = engine(pages, TagPolicy::Random, seed);
        let mut allocations = 0u64;
        let mut deallocations = 0u64;
        for op in &ops {
            match op {
                Op::Allocate => allocations += engine.allocate().is_ok() as u64,
                Op::AllocateRun(k) => allocations += engine.allocate_run(*k).is_ok() as u64,
                Op::Deallocate => deallocations += engine.deallocate().is_ok() as u64,
                Op::Tick => {
                    engine.tick(None);
                }
            }
        }
        prop_assert_eq!(engine.counters().total_allocations, allocations);
        prop_assert_eq!(engine.counters().total_deallocations, deallocations);
        prop_assert_eq!(allocations - deallocations, engine.segments().len() as u64);
    }
}
