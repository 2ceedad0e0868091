//! Memory-domain limits and `HeapExhausted` reporting.

use scope_gc::{global_metrics, CollectionTrigger, GcError, Heap, HeapConfig, RootSet};

fn bounded(limit: usize, threshold: usize) -> Heap {
    Heap::with_config(
        HeapConfig::new()
            .initial_threshold(threshold)
            .max_objects(Some(limit)),
    )
}

#[test]
fn test_exhausted_after_collection_fails_to_free() {
    let mut heap = bounded(4, 100);
    let mut roots = RootSet::new(8);
    for i in 0..4 {
        let obj = heap.allocate_scalar(i, &roots).unwrap();
        roots.push_root(obj).unwrap();
    }

    let exhaustions_before = global_metrics().total_exhaustions();
    assert_eq!(
        heap.allocate_scalar(4, &roots),
        Err(GcError::HeapExhausted { limit: 4 })
    );
    assert!(global_metrics().total_exhaustions() > exhaustions_before);

    // The failed allocation still ran a full collection first.
    assert_eq!(heap.collections(), 1);
    assert_eq!(heap.last_gc_metrics().trigger, CollectionTrigger::Exhaustion);
    assert_eq!(heap.live_object_count(), 4);
    for root in roots.iter() {
        assert!(heap.contains(root));
    }
}

#[test]
fn test_collection_makes_room() {
    let mut heap = bounded(4, 100);
    let mut roots = RootSet::new(8);
    for i in 0..4 {
        let obj = heap.allocate_scalar(i, &roots).unwrap();
        if i % 2 == 0 {
            roots.push_root(obj).unwrap();
        }
    }

    let obj = heap.allocate_scalar(4, &roots).unwrap();
    assert!(heap.contains(obj));
    assert_eq!(heap.live_object_count(), 3);
    assert_eq!(heap.last_gc_metrics().trigger, CollectionTrigger::Exhaustion);
    assert_eq!(heap.last_gc_metrics().objects_reclaimed, 2);
}

#[test]
fn test_threshold_collection_is_not_repeated() {
    // Threshold and limit coincide: the threshold collection is the only one.
    let mut heap = bounded(3, 3);
    let mut roots = RootSet::new(8);
    for i in 0..3 {
        let obj = heap.allocate_scalar(i, &roots).unwrap();
        roots.push_root(obj).unwrap();
    }

    assert_eq!(
        heap.allocate_scalar(3, &roots),
        Err(GcError::HeapExhausted { limit: 3 })
    );
    assert_eq!(heap.collections(), 1);
    assert_eq!(heap.last_gc_metrics().trigger, CollectionTrigger::Allocation);
}

#[test]
fn test_recovers_once_roots_are_dropped() {
    let mut heap = bounded(2, 100);
    let mut roots = RootSet::new(4);
    for i in 0..2 {
        let obj = heap.allocate_scalar(i, &roots).unwrap();
        roots.push_root(obj).unwrap();
    }
    assert!(heap.allocate_scalar(9, &roots).is_err());

    roots.pop_root().unwrap();
    assert!(heap.allocate_scalar(9, &roots).is_ok());
    assert_eq!(heap.live_object_count(), 2);
}

#[test]
fn test_zero_limit_always_exhausted() {
    let mut heap = bounded(0, 100);
    let roots = RootSet::new(1);
    assert_eq!(
        heap.allocate_scalar(1, &roots),
        Err(GcError::HeapExhausted { limit: 0 })
    );
    assert_eq!(heap.live_object_count(), 0);
}

#[test]
fn test_composite_operands_pinned_during_exhaustion_collection() {
    let mut heap = bounded(3, 100);
    let roots = RootSet::new(1);
    let a = heap.allocate_scalar(1, &roots).unwrap();
    let b = heap.allocate_scalar(2, &roots).unwrap();
    heap.allocate_scalar(3, &roots).unwrap();

    // Domain full: the collection frees the unpinned scalar only.
    let pair = heap.allocate_composite(Some(a), Some(b), &roots).unwrap();
    assert_eq!(heap.render(pair), "(1, 2)");
    assert_eq!(heap.live_object_count(), 3);
}
