/*!
 * Allocation Engine Tests
 * Allocate/deallocate transitions, soft failures and the command protocol
 */

use memtrack::memory::{Command, Engine, MemoryError, Page, Segment, Transition};
use memtrack::{HostMemorySample, SimConfig, TagPolicy};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine_with(pages: usize, policy: TagPolicy) -> Engine<StdRng> {
    let config = SimConfig::default()
        .with_page_count(pages)
        .with_tag_policy(policy);
    Engine::with_rng(&config, StdRng::seed_from_u64(0xC0FFEE))
}

fn used_map(engine: &Engine<StdRng>) -> Vec<bool> {
    engine.page_table().pages().iter().map(Page::is_used).collect()
}

fn sample(used_percent: f64) -> HostMemorySample {
    HostMemorySample {
        total_bytes: 8 * 1024 * 1024 * 1024,
        used_bytes: 4 * 1024 * 1024 * 1024,
        free_bytes: 2 * 1024 * 1024 * 1024,
        used_percent,
    }
}

#[test]
fn test_first_allocation_lands_at_index_zero() {
    let mut engine = engine_with(8, TagPolicy::Random);

    let allocation = engine.allocate_run(3).unwrap();

    assert_eq!(allocation.start, 0);
    assert_eq!(allocation.pages, 3);
    assert_eq!(allocation.size_kb, 12);
    assert_eq!(
        used_map(&engine),
        vec![true, true, true, false, false, false, false, false]
    );
    assert_eq!(
        engine.segments().as_slice(),
        &[Segment::new(12, allocation.owner.clone())]
    );
    for page in &engine.page_table().pages()[..3] {
        assert_eq!(page.owner(), Some(allocation.owner.as_str()));
    }
    assert_eq!(engine.counters().total_allocations, 1);
}

#[test]
fn test_request_larger_than_largest_run_is_noop() {
    let mut engine = engine_with(8, TagPolicy::Random);
    engine.allocate_run(3).unwrap();
    let pages_before = engine.page_table().clone();
    let segments_before = engine.segments().clone();

    // Indices 3..8 give exactly five contiguous free pages
    let err = engine.allocate_run(6).unwrap_err();

    assert_eq!(
        err,
        MemoryError::InsufficientContiguousMemory {
            requested: 6,
            largest_run: 5
        }
    );
    assert!(err.is_soft());
    assert_eq!(engine.page_table(), &pages_before);
    assert_eq!(engine.segments(), &segments_before);
    assert_eq!(engine.counters().total_allocations, 1);
}

#[test]
fn test_deallocate_restores_all_free() {
    let mut engine = engine_with(8, TagPolicy::Random);
    engine.allocate_run(3).unwrap();

    let deallocation = engine.deallocate().unwrap();

    assert_eq!(deallocation.pages_freed, 3);
    assert_eq!(deallocation.segment.size_kb, 12);
    assert_eq!(used_map(&engine), vec![false; 8]);
    assert!(engine.segments().is_empty());
    assert_eq!(engine.counters().total_deallocations, 1);
}

#[test]
fn test_deallocate_empty_is_noop() {
    let mut engine = engine_with(8, TagPolicy::Random);
    let before = engine.page_table().clone();

    assert_eq!(engine.deallocate(), Err(MemoryError::NothingToDeallocate));
    assert_eq!(engine.counters().total_deallocations, 0);
    assert_eq!(engine.page_table(), &before);
}

#[test]
fn test_deallocation_is_lifo() {
    let mut engine = engine_with(16, TagPolicy::Sequential);
    let first = engine.allocate_run(2).unwrap();
    let second = engine.allocate_run(1).unwrap();

    assert_eq!(engine.deallocate().unwrap().segment.owner, second.owner);
    assert_eq!(engine.deallocate().unwrap().segment.owner, first.owner);
}

#[test]
fn test_first_fit_reuses_freed_hole() {
    let mut engine = engine_with(8, TagPolicy::Sequential);
    engine.allocate_tagged("P1", 2).unwrap();
    engine.allocate_tagged("P2", 2).unwrap();
    engine.deallocate().unwrap();
    engine.deallocate().unwrap();
    engine.allocate_tagged("P3", 3).unwrap();
    engine.allocate_tagged("P4", 1).unwrap();

    let owners: Vec<Option<&str>> = engine.page_table().pages().iter().map(Page::owner).collect();
    assert_eq!(
        owners,
        vec![
            Some("P3"),
            Some("P3"),
            Some("P3"),
            Some("P4"),
            None,
            None,
            None,
            None
        ]
    );
}

#[test]
fn test_shared_owner_tag_frees_both_allocations() {
    let mut engine = engine_with(8, TagPolicy::Random);
    engine.allocate_tagged("P1", 1).unwrap();
    engine.allocate_tagged("P2", 1).unwrap();
    engine.allocate_tagged("P1", 2).unwrap();

    let deallocation = engine.deallocate().unwrap();

    // The older P1 allocation loses its page while its segment stays listed
    assert_eq!(deallocation.pages_freed, 3);
    assert_eq!(
        used_map(&engine),
        vec![false, true, false, false, false, false, false, false]
    );
    let owners: Vec<&str> = engine.segments().iter().map(|s| s.owner.as_str()).collect();
    assert_eq!(owners, vec!["P1", "P2"]);
}

#[test]
fn test_sequential_tags_never_collide() {
    let mut engine = engine_with(64, TagPolicy::Sequential);
    let mut owners = Vec::new();
    while let Ok(allocation) = engine.allocate() {
        owners.push(allocation.owner);
    }
    let mut unique = owners.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), owners.len());
    assert!(engine.metrics().largest_free_run < 3);
}

#[test]
fn test_apply_dispatches_commands() {
    let mut engine = engine_with(8, TagPolicy::Sequential);

    assert!(matches!(engine.apply(Command::Allocate), Transition::Allocated(_)));
    assert!(matches!(engine.apply(Command::Deallocate), Transition::Deallocated(_)));
    assert_eq!(
        engine.apply(Command::Deallocate),
        Transition::Rejected(MemoryError::NothingToDeallocate)
    );
    assert_eq!(engine.apply(Command::Tick(None)), Transition::Ticked);
    assert!(engine.apply(Command::Quit).is_quit());

    assert_eq!(engine.counters().total_allocations, 1);
    assert_eq!(engine.counters().total_deallocations, 1);
}

#[test]
fn test_tick_keeps_last_good_host_sample() {
    let mut engine = engine_with(8, TagPolicy::Random);
    assert_eq!(engine.metrics().host, None);

    engine.tick(Some(sample(42.0)));
    assert_eq!(engine.metrics().host, Some(sample(42.0)));

    // A failed or missing sample leaves the previous one in place
    engine.tick(None);
    assert_eq!(engine.metrics().host, Some(sample(42.0)));

    engine.tick(Some(sample(55.0)));
    assert_eq!(engine.metrics().host.map(|h| h.used_percent), Some(55.0));
}

#[test]
fn test_seeded_engines_are_reproducible() {
    let config = SimConfig::default().with_seed(17);
    let mut a = Engine::new(&config);
    let mut b = Engine::new(&config);
    for _ in 0..20 {
        assert_eq!(a.allocate(), b.allocate());
    }
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_snapshot_serializes_pages_and_segments() {
    let mut engine = engine_with(4, TagPolicy::Random);
    engine.allocate_tagged("P9", 1).unwrap();

    let json = serde_json::to_value(engine.snapshot()).unwrap();

    assert_eq!(json["pages"][0]["used"], true);
    assert_eq!(json["pages"][0]["owner"], "P9");
    assert_eq!(json["pages"][1]["used"], false);
    assert!(json["pages"][1]["owner"].is_null());
    assert_eq!(json["segments"][0]["size_kb"], 4);
    assert_eq!(json["metrics"]["total_allocations"], 1);
    assert_eq!(json["metrics"]["used_page_ratio"], 25.0);
}

#[test]
fn test_segment_total_tracks_outstanding_allocations() {
    let mut engine = engine_with(8, TagPolicy::Sequential);

    engine.allocate_run(3).unwrap();
    engine.allocate_run(2).unwrap();
    assert_eq!(engine.segments().total_size_kb(), 20);

    engine.deallocate().unwrap();
    assert_eq!(engine.segments().total_size_kb(), 12);
}
