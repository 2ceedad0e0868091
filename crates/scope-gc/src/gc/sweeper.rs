//! Reclamation of unmarked objects.

use crate::heap::{Heap, SlotEntry};

/// Walk the allocation registry once, reclaiming every unmarked object and
/// clearing the mark on every survivor. Returns the number of objects
/// reclaimed.
///
/// Afterwards the registry holds exactly the previously marked objects, none
/// of them marked, and the live count equals the registry length.
pub fn sweep(heap: &mut Heap) -> usize {
    let mut reclaimed = 0;
    let mut prev: Option<u32> = None;
    let mut cursor = heap.registry_head;

    while let Some(index) = cursor {
        let SlotEntry::Occupied { object, next } = &mut heap.slots[index as usize].entry else {
            debug_assert!(false, "vacant slot {index} linked into the registry");
            break;
        };
        let next = *next;

        if object.is_marked() {
            object.set_marked(false);
            prev = Some(index);
        } else {
            unlink(heap, prev, next);
            heap.release(index);
            reclaimed += 1;
        }
        cursor = next;
    }

    heap.live -= reclaimed;
    heap.marks_dirty = false;

    #[cfg(feature = "paranoid-sweep")]
    verify_registry(heap);

    reclaimed
}

/// Point `prev`'s registry link (or the registry head) at `next`.
fn unlink(heap: &mut Heap, prev: Option<u32>, next: Option<u32>) {
    match prev {
        None => heap.registry_head = next,
        Some(prev) => {
            if let SlotEntry::Occupied { next: link, .. } = &mut heap.slots[prev as usize].entry {
                *link = next;
            }
        }
    }
}

#[cfg(feature = "paranoid-sweep")]
fn verify_registry(heap: &Heap) {
    let mut count = 0;
    for (obj, object) in heap.objects() {
        assert!(!object.is_marked(), "{obj:?} still marked after sweep");
        count += 1;
    }
    assert_eq!(count, heap.live, "live count disagrees with registry length");
}
