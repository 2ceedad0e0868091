//! Per-heap and process-wide collection metrics.

use scope_gc::{gc_history, global_metrics, CollectionTrigger, Heap, RootSet};

#[test]
fn test_metrics_populated_after_collection() {
    let mut heap = Heap::new(100);
    let mut roots = RootSet::new(8);
    for i in 0..10 {
        let obj = heap.allocate_scalar(i, &roots).unwrap();
        if i < 4 {
            roots.push_root(obj).unwrap();
        }
    }

    let metrics = heap.collect(&roots);
    assert_eq!(metrics.trigger, CollectionTrigger::Explicit);
    assert_eq!(metrics.objects_marked, 4);
    assert_eq!(metrics.objects_reclaimed, 6);
    assert_eq!(metrics.objects_surviving, 4);
    assert_eq!(metrics.threshold_before, 100);
    assert_eq!(metrics.threshold_after, 8);
    assert_eq!(metrics.total_collections, 1);
}

#[test]
fn test_phase_timing_fits_in_total_duration() {
    let mut heap = Heap::new(1_000_000);
    let roots = RootSet::new(1);
    for i in 0..10_000 {
        heap.allocate_scalar(i, &roots).unwrap();
    }

    let metrics = heap.collect(&roots);
    assert!(metrics.mark_duration + metrics.sweep_duration <= metrics.duration);
}

#[test]
fn test_last_metrics_track_latest_collection() {
    let mut heap = Heap::new(2);
    let mut roots = RootSet::new(8);
    assert_eq!(heap.last_gc_metrics().trigger, CollectionTrigger::None);

    for i in 0..3 {
        let obj = heap.allocate_scalar(i, &roots).unwrap();
        roots.push_root(obj).unwrap();
    }
    assert_eq!(heap.last_gc_metrics().trigger, CollectionTrigger::Allocation);

    heap.collect(&roots);
    let last = heap.last_gc_metrics();
    assert_eq!(last.trigger, CollectionTrigger::Explicit);
    assert_eq!(last.total_collections, heap.collections());
}

#[test]
fn test_global_metrics_accumulate() {
    let collections_before = global_metrics().total_collections();
    let explicit_before = global_metrics().total_explicit_collections();
    let reclaimed_before = global_metrics().total_objects_reclaimed();

    let mut heap = Heap::new(100);
    let roots = RootSet::new(1);
    for i in 0..5 {
        heap.allocate_scalar(i, &roots).unwrap();
    }
    heap.collect(&roots);

    // Other tests collect concurrently, so only lower bounds hold.
    assert!(global_metrics().total_collections() > collections_before);
    assert!(global_metrics().total_explicit_collections() > explicit_before);
    assert!(global_metrics().total_objects_reclaimed() >= reclaimed_before + 5);
}

#[test]
fn test_history_records_collections() {
    let recorded_before = gc_history().total_recorded();

    let mut heap = Heap::new(100);
    let roots = RootSet::new(1);
    heap.allocate_scalar(1, &roots).unwrap();
    heap.collect(&roots);
    heap.collect(&roots);

    assert!(gc_history().total_recorded() >= recorded_before + 2);
    assert!(gc_history().latest().is_some());
    assert!(!gc_history().recent().is_empty());
}
