//! Heap storage and allocation.
//!
//! Objects live in a slot arena. Every occupied slot is threaded onto an
//! intrusive allocation registry through its own `next` link; that link is
//! heap bookkeeping only and is never followed when computing reachability.
//! Reclaimed slots go onto a free list and are reused by later allocations
//! with a bumped generation, so old [`ObjRef`]s stop resolving.

use std::collections::HashSet;

use crate::config::HeapConfig;
use crate::error::GcError;
use crate::gc;
use crate::metrics::{global_metrics, CollectionTrigger, GcMetrics};
use crate::object::{Field, HeapObject, ObjRef, ObjectKind, Payload};
use crate::roots::RootSet;

/// Largest number of slots addressable by an [`ObjRef`].
const MAX_SLOTS: usize = u32::MAX as usize;

// ============================================================================
// Slot - one arena cell
// ============================================================================

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) entry: SlotEntry,
}

#[derive(Debug)]
pub(crate) enum SlotEntry {
    /// A live allocation and its link in the registry.
    Occupied {
        object: HeapObject,
        next: Option<u32>,
    },
    /// A reclaimed cell waiting for reuse.
    Vacant { next_free: Option<u32> },
}

impl Slot {
    const fn vacant() -> Self {
        Self {
            generation: 0,
            entry: SlotEntry::Vacant { next_free: None },
        }
    }
}

// ============================================================================
// Heap
// ============================================================================

/// A garbage-collected heap of scalar and composite objects.
///
/// The heap is the only creator of objects (through the `allocate_*`
/// methods) and, through its sweeper, the only destroyer.
///
/// # Example
///
/// ```
/// use scope_gc::{Heap, RootSet};
///
/// let mut heap = Heap::new(8);
/// let mut roots = RootSet::new(4);
///
/// let one = heap.allocate_scalar(1, &roots)?;
/// let two = heap.allocate_scalar(2, &roots)?;
/// let pair = heap.allocate_composite(Some(one), Some(two), &roots)?;
/// roots.push_root(pair)?;
///
/// heap.allocate_scalar(99, &roots)?;
/// heap.collect(&roots);
///
/// assert_eq!(heap.live_object_count(), 3);
/// assert_eq!(heap.current_threshold(), 6);
/// assert_eq!(heap.render(pair), "(1, 2)");
/// # Ok::<(), scope_gc::GcError>(())
/// ```
#[derive(Debug)]
pub struct Heap {
    pub(crate) slots: Vec<Slot>,
    /// Head of the intrusive allocation registry.
    pub(crate) registry_head: Option<u32>,
    /// Head of the free-slot list.
    free_head: Option<u32>,
    pub(crate) live: usize,
    pub(crate) threshold: usize,
    pub(crate) config: HeapConfig,
    /// Set when marks were left behind by a mark pass outside a collection.
    pub(crate) marks_dirty: bool,
    pub(crate) collections: usize,
    pub(crate) last_metrics: GcMetrics,
}

impl Default for Heap {
    fn default() -> Self {
        Self::with_config(HeapConfig::default())
    }
}

impl Heap {
    /// Create an empty heap whose first collection runs once
    /// `initial_threshold` objects are live.
    #[must_use]
    pub fn new(initial_threshold: usize) -> Self {
        Self::with_config(HeapConfig::new().initial_threshold(initial_threshold))
    }

    /// Create an empty heap with the given configuration.
    #[must_use]
    pub const fn with_config(config: HeapConfig) -> Self {
        Self {
            slots: Vec::new(),
            registry_head: None,
            free_head: None,
            live: 0,
            threshold: config.initial_threshold,
            config,
            marks_dirty: false,
            collections: 0,
            last_metrics: GcMetrics::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------------

    /// Allocate a scalar object.
    ///
    /// May run a full collection first, using `roots` as the root set.
    ///
    /// # Errors
    ///
    /// Returns [`GcError::HeapExhausted`] if the heap's memory domain is full
    /// even after a collection.
    pub fn allocate_scalar(&mut self, value: i64, roots: &RootSet) -> Result<ObjRef, GcError> {
        self.allocate(HeapObject::scalar(value), roots)
    }

    /// Allocate a composite object referencing `first` and `second`.
    ///
    /// May run a full collection first, using `roots` as the root set. The
    /// operands themselves are kept alive by that collection even if nothing
    /// else references them.
    ///
    /// # Errors
    ///
    /// Returns [`GcError::HeapExhausted`] if the heap's memory domain is full
    /// even after a collection.
    ///
    /// # Panics
    ///
    /// Panics if either operand does not name a live object of this heap.
    pub fn allocate_composite(
        &mut self,
        first: Option<ObjRef>,
        second: Option<ObjRef>,
        roots: &RootSet,
    ) -> Result<ObjRef, GcError> {
        for operand in first.into_iter().chain(second) {
            assert!(
                self.contains(operand),
                "composite operand {operand:?} is not a live object"
            );
        }
        self.allocate(HeapObject::composite(first, second), roots)
    }

    fn allocate(&mut self, object: HeapObject, roots: &RootSet) -> Result<ObjRef, GcError> {
        let operands = *object.payload();
        let mut collected = false;

        if self.live >= self.threshold {
            gc::collect_with(
                self,
                roots.iter().chain(operands.edges()),
                CollectionTrigger::Allocation,
            );
            collected = true;
        }

        if let Some(limit) = self.domain_limit() {
            if self.live >= limit && !collected {
                gc::collect_with(
                    self,
                    roots.iter().chain(operands.edges()),
                    CollectionTrigger::Exhaustion,
                );
            }
            if self.live >= limit {
                #[cfg(feature = "tracing")]
                crate::tracing::internal::log_heap_exhausted(limit);
                global_metrics().record_exhaustion();
                return Err(GcError::HeapExhausted { limit });
            }
        }

        self.register(object)
    }

    fn domain_limit(&self) -> Option<usize> {
        self.config.max_objects.map(|limit| limit.min(MAX_SLOTS))
    }

    /// Insert `object` at the head of the registry.
    fn register(&mut self, object: HeapObject) -> Result<ObjRef, GcError> {
        let index = match self.free_head {
            Some(index) => {
                self.free_head = match self.slots[index as usize].entry {
                    SlotEntry::Vacant { next_free } => next_free,
                    SlotEntry::Occupied { .. } => None,
                };
                index
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| GcError::HeapExhausted { limit: MAX_SLOTS })?;
                self.slots.push(Slot::vacant());
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.entry = SlotEntry::Occupied {
            object,
            next: self.registry_head,
        };
        self.registry_head = Some(index);
        self.live += 1;
        Ok(ObjRef::new(index, slot.generation))
    }

    /// Return a registered slot to the free list. The caller must already
    /// have unlinked it from the registry.
    pub(crate) fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.entry = SlotEntry::Vacant {
            next_free: self.free_head,
        };
        self.free_head = Some(index);
    }

    // ------------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------------

    /// Run a full collection now: mark from `roots`, sweep, and reschedule
    /// the threshold.
    pub fn collect(&mut self, roots: &RootSet) -> GcMetrics {
        gc::collect_with(self, roots.iter(), CollectionTrigger::Explicit)
    }

    /// Number of objects currently allocated.
    #[must_use]
    pub const fn live_object_count(&self) -> usize {
        self.live
    }

    /// Live-object count at which the next allocation collects first.
    #[must_use]
    pub const fn current_threshold(&self) -> usize {
        self.threshold
    }

    /// The configuration this heap was created with.
    #[must_use]
    pub const fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Number of collections this heap has run.
    #[must_use]
    pub const fn collections(&self) -> usize {
        self.collections
    }

    /// Statistics from this heap's most recent collection.
    #[must_use]
    pub const fn last_gc_metrics(&self) -> GcMetrics {
        self.last_metrics
    }

    // ------------------------------------------------------------------------
    // Object access
    // ------------------------------------------------------------------------

    /// The object named by `obj`, or `None` if it has been reclaimed.
    #[must_use]
    pub fn get(&self, obj: ObjRef) -> Option<&HeapObject> {
        let slot = self.slots.get(obj.slot())?;
        if slot.generation != obj.generation() {
            return None;
        }
        match &slot.entry {
            SlotEntry::Occupied { object, .. } => Some(object),
            SlotEntry::Vacant { .. } => None,
        }
    }

    pub(crate) fn get_mut(&mut self, obj: ObjRef) -> Option<&mut HeapObject> {
        let slot = self.slots.get_mut(obj.slot())?;
        if slot.generation != obj.generation() {
            return None;
        }
        match &mut slot.entry {
            SlotEntry::Occupied { object, .. } => Some(object),
            SlotEntry::Vacant { .. } => None,
        }
    }

    /// Whether `obj` names an object that is still allocated.
    #[must_use]
    pub fn contains(&self, obj: ObjRef) -> bool {
        self.get(obj).is_some()
    }

    /// The kind of a live object.
    #[must_use]
    pub fn kind(&self, obj: ObjRef) -> Option<ObjectKind> {
        self.get(obj).map(HeapObject::kind)
    }

    /// Overwrite the first field of a composite.
    ///
    /// # Panics
    ///
    /// Panics if `obj` is not a live composite, or `target` is not live.
    pub fn set_first(&mut self, obj: ObjRef, target: Option<ObjRef>) {
        self.set_field(obj, Field::First, target);
    }

    /// Overwrite the second field of a composite.
    ///
    /// # Panics
    ///
    /// Panics if `obj` is not a live composite, or `target` is not live.
    pub fn set_second(&mut self, obj: ObjRef, target: Option<ObjRef>) {
        self.set_field(obj, Field::Second, target);
    }

    fn set_field(&mut self, obj: ObjRef, field: Field, target: Option<ObjRef>) {
        if let Some(target) = target {
            assert!(
                self.contains(target),
                "field target {target:?} is not a live object"
            );
        }
        let Some(object) = self.get_mut(obj) else {
            panic!("write through reclaimed reference {obj:?}");
        };
        assert!(
            object.set_field(field, target),
            "{obj:?} is a scalar and has no fields"
        );
    }

    /// Iterate over every allocated object in registry order (most recent
    /// allocation first), whether reachable or not.
    #[must_use]
    pub fn objects(&self) -> Objects<'_> {
        Objects {
            heap: self,
            cursor: self.registry_head,
        }
    }

    /// Render the object graph rooted at `obj` as text.
    ///
    /// Scalars print as their value, composites as `(first, second)`, absent
    /// fields as `nil`. A reference back to an object that is still being
    /// printed prints as `<cycle>`; a reclaimed reference as `<dangling>`.
    #[must_use]
    pub fn render(&self, obj: ObjRef) -> String {
        let mut out = String::new();
        // Composites whose closing paren has not been written yet.
        let mut open: HashSet<ObjRef> = HashSet::new();
        let mut work = vec![RenderStep::Value(Some(obj))];

        while let Some(step) = work.pop() {
            match step {
                RenderStep::Text(text) => out.push_str(text),
                RenderStep::Close(obj) => {
                    out.push(')');
                    open.remove(&obj);
                }
                RenderStep::Value(None) => out.push_str("nil"),
                RenderStep::Value(Some(obj)) => {
                    if open.contains(&obj) {
                        out.push_str("<cycle>");
                        continue;
                    }
                    match self.get(obj).map(HeapObject::payload) {
                        None => out.push_str("<dangling>"),
                        Some(Payload::Scalar(value)) => out.push_str(&value.to_string()),
                        Some(&Payload::Composite { first, second }) => {
                            open.insert(obj);
                            out.push('(');
                            work.push(RenderStep::Close(obj));
                            work.push(RenderStep::Value(second));
                            work.push(RenderStep::Text(", "));
                            work.push(RenderStep::Value(first));
                        }
                    }
                }
            }
        }
        out
    }
}

/// Pending output of [`Heap::render`], popped in reverse push order.
enum RenderStep {
    Value(Option<ObjRef>),
    Text(&'static str),
    Close(ObjRef),
}

/// Iterator over the heap's allocation registry. See [`Heap::objects`].
#[derive(Debug)]
pub struct Objects<'a> {
    heap: &'a Heap,
    cursor: Option<u32>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = (ObjRef, &'a HeapObject);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = &self.heap.slots[index as usize];
        match &slot.entry {
            SlotEntry::Occupied { object, next } => {
                self.cursor = *next;
                Some((ObjRef::new(index, slot.generation), object))
            }
            SlotEntry::Vacant { .. } => {
                debug_assert!(false, "vacant slot {index} linked into the registry");
                self.cursor = None;
                None
            }
        }
    }
}
