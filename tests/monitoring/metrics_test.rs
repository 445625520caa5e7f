/*!
 * Metrics Tests
 * Usage, fragmentation, peak and pressure as seen through the engine
 */

use memtrack::memory::{Engine, MemoryPressure};
use memtrack::{SimConfig, TagPolicy};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine(pages: usize) -> Engine<StdRng> {
    let config = SimConfig::default()
        .with_page_count(pages)
        .with_tag_policy(TagPolicy::Sequential);
    Engine::with_rng(&config, StdRng::seed_from_u64(1))
}

#[test]
fn test_initial_metrics() {
    let engine = engine(32);
    let metrics = engine.metrics();

    assert_eq!(metrics.used_page_ratio, 0.0);
    assert_eq!(metrics.fragmentation_rate, 0.0);
    assert_eq!(metrics.peak_usage_ratio, 0.0);
    assert_eq!(metrics.free_pages, 32);
    assert_eq!(metrics.capacity, 32);
    assert_eq!(metrics.page_size_kb, 4);
    assert_eq!(metrics.largest_free_run, 32);
    assert_eq!(metrics.pressure, MemoryPressure::Low);
}

#[test]
fn test_fragmentation_counts_owner_transitions_over_segment_count() {
    let mut engine = engine(16);
    for owner in ["A", "A", "B", "B"] {
        engine.allocate_tagged(owner, 1).unwrap();
    }
    assert_eq!(engine.metrics().fragmentation_rate, 25.0);

    engine.allocate_tagged("C", 1).unwrap();
    // A|A, A->B, B|B, B->C: two transitions over five segments
    assert_eq!(engine.metrics().fragmentation_rate, 40.0);
}

#[test]
fn test_metrics_follow_every_mutation() {
    let mut engine = engine(8);
    engine.allocate_run(2).unwrap();

    let metrics = engine.metrics();
    assert_eq!(metrics.used_page_ratio, 25.0);
    assert_eq!(metrics.used_pages, 2);
    assert_eq!(metrics.total_allocations, 1);
    assert_eq!(metrics.largest_free_run, 6);
}

#[test]
fn test_peak_is_retained_after_deallocation() {
    let mut engine = engine(4);
    engine.allocate_run(3).unwrap();
    engine.deallocate().unwrap();
    engine.tick(None);

    let metrics = engine.metrics();
    assert_eq!(metrics.used_page_ratio, 0.0);
    assert_eq!(metrics.peak_usage_ratio, 75.0);
    assert_eq!(metrics.total_deallocations, 1);
}

#[test]
fn test_pressure_rises_with_usage() {
    let mut engine = engine(20);
    engine.allocate_run(12).unwrap();
    assert_eq!(engine.metrics().pressure, MemoryPressure::Medium);

    engine.allocate_run(4).unwrap();
    assert_eq!(engine.metrics().pressure, MemoryPressure::High);

    engine.allocate_run(3).unwrap();
    assert_eq!(engine.metrics().pressure, MemoryPressure::Critical);
}
