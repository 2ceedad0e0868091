//! Reachability marking.
//!
//! Traversal uses an explicit worklist instead of native recursion, so a
//! composite chain of any depth is marked without growing the call stack.

use crate::heap::{Heap, SlotEntry};
use crate::object::ObjRef;
use crate::roots::RootSet;

/// Mark every object reachable from `roots`. Returns the number of objects
/// newly marked.
///
/// Each object is marked at most once no matter how many edges lead to it,
/// so cycles and shared substructure terminate. The marks stay set until the
/// next [`sweep`](crate::gc::sweep) clears them; a collection started while
/// stale marks are present clears them first.
pub fn mark_all(heap: &mut Heap, roots: &RootSet) -> usize {
    heap.marks_dirty = true;
    mark_from(heap, roots.iter())
}

/// Mark everything reachable from `roots`.
pub(crate) fn mark_from<I>(heap: &mut Heap, roots: I) -> usize
where
    I: IntoIterator<Item = ObjRef>,
{
    let mut worklist: Vec<ObjRef> = roots.into_iter().collect();
    let mut marked = 0;

    while let Some(obj) = worklist.pop() {
        // A reclaimed reference names nothing to keep alive.
        let Some(object) = heap.get_mut(obj) else {
            continue;
        };
        if object.is_marked() {
            continue;
        }
        object.set_marked(true);
        marked += 1;
        worklist.extend(object.payload().edges());
    }

    marked
}

/// Reset every mark flag in the heap.
pub(crate) fn clear_marks(heap: &mut Heap) {
    for slot in &mut heap.slots {
        if let SlotEntry::Occupied { object, .. } = &mut slot.entry {
            object.set_marked(false);
        }
    }
    heap.marks_dirty = false;
}
