//! Basic allocation and collection tests.

use scope_gc::{Heap, ObjectKind, Payload, RootSet};

#[test]
fn test_basic_allocation() {
    let mut heap = Heap::new(8);
    let roots = RootSet::new(1);
    let x = heap.allocate_scalar(42, &roots).unwrap();
    assert_eq!(heap.get(x).unwrap().as_scalar(), Some(42));
    assert_eq!(heap.kind(x), Some(ObjectKind::Scalar));
    assert_eq!(heap.live_object_count(), 1);
}

#[test]
fn test_identity_is_not_structural() {
    let mut heap = Heap::new(8);
    let roots = RootSet::new(1);
    let a = heap.allocate_scalar(7, &roots).unwrap();
    let b = heap.allocate_scalar(7, &roots).unwrap();
    assert_ne!(a, b);
    assert_eq!(heap.get(a), heap.get(b));
}

#[test]
fn test_partial_composite_can_be_completed() {
    let mut heap = Heap::new(8);
    let mut roots = RootSet::new(2);
    let pair = heap.allocate_composite(None, None, &roots).unwrap();
    roots.push_root(pair).unwrap();
    assert_eq!(heap.render(pair), "(nil, nil)");

    let head = heap.allocate_scalar(1, &roots).unwrap();
    heap.set_first(pair, Some(head));
    heap.collect(&roots);

    assert!(heap.contains(head));
    assert_eq!(
        *heap.get(pair).unwrap().payload(),
        Payload::Composite {
            first: Some(head),
            second: None
        }
    );
}

#[test]
fn test_drop_and_collect() {
    let mut heap = Heap::new(8);
    let mut roots = RootSet::new(1);
    let x = heap.allocate_scalar(1, &roots).unwrap();
    roots.push_root(x).unwrap();
    roots.pop_root().unwrap();
    heap.collect(&roots);
    assert!(!heap.contains(x));
    assert!(heap.get(x).is_none());
}

#[test]
fn test_multiple_allocations() {
    let mut heap = Heap::new(1000);
    let mut roots = RootSet::new(100);
    let values: Vec<_> = (0..100)
        .map(|i| {
            let obj = heap.allocate_scalar(i, &roots).unwrap();
            roots.push_root(obj).unwrap();
            obj
        })
        .collect();
    heap.collect(&roots);
    for (i, obj) in (0..).zip(&values) {
        assert_eq!(heap.get(*obj).unwrap().as_scalar(), Some(i));
    }
}

#[test]
fn test_stale_handle_after_slot_reuse() {
    let mut heap = Heap::new(8);
    let mut roots = RootSet::new(1);
    let old = heap.allocate_scalar(1, &roots).unwrap();
    heap.collect(&roots);

    let new = heap.allocate_scalar(2, &roots).unwrap();
    roots.push_root(new).unwrap();
    assert_eq!(old.index(), new.index());
    assert!(!heap.contains(old));
    assert_eq!(heap.render(old), "<dangling>");
    assert_eq!(heap.render(new), "2");
}

#[test]
fn test_registry_lists_unreachable_objects_too() {
    let mut heap = Heap::new(8);
    let mut roots = RootSet::new(1);
    let kept = heap.allocate_scalar(1, &roots).unwrap();
    let dropped = heap.allocate_scalar(2, &roots).unwrap();
    roots.push_root(kept).unwrap();

    let before: Vec<_> = heap.objects().map(|(r, _)| r).collect();
    assert_eq!(before, vec![dropped, kept]);

    heap.collect(&roots);
    let after: Vec<_> = heap.objects().map(|(r, _)| r).collect();
    assert_eq!(after, vec![kept]);
}
