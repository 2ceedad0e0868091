//! A minimal stack machine over a collected heap.
//!
//! The operand stack doubles as the root set: whatever is on the stack is
//! live, everything else is garbage once nothing on the stack reaches it.

use crate::config::HeapConfig;
use crate::error::GcError;
use crate::heap::Heap;
use crate::metrics::GcMetrics;
use crate::object::ObjRef;
use crate::roots::RootSet;

/// A stack machine whose stack entries are the collector's roots.
///
/// # Example
///
/// ```
/// use scope_gc::Vm;
///
/// let mut vm = Vm::new(16, 8);
/// vm.push_int(1)?;
/// vm.push_int(2)?;
/// vm.push_pair()?;
/// assert_eq!(vm.render_top().as_deref(), Some("(1, 2)"));
///
/// vm.pop()?;
/// vm.collect();
/// assert_eq!(vm.object_count(), 0);
/// # Ok::<(), scope_gc::GcError>(())
/// ```
#[derive(Debug)]
pub struct Vm {
    heap: Heap,
    stack: RootSet,
}

impl Vm {
    /// A machine with room for `stack_capacity` values whose heap first
    /// collects at `initial_threshold` live objects.
    #[must_use]
    pub fn new(stack_capacity: usize, initial_threshold: usize) -> Self {
        Self::with_config(
            stack_capacity,
            HeapConfig::new().initial_threshold(initial_threshold),
        )
    }

    /// A machine whose heap uses `config`.
    #[must_use]
    pub fn with_config(stack_capacity: usize, config: HeapConfig) -> Self {
        Self {
            heap: Heap::with_config(config),
            stack: RootSet::new(stack_capacity),
        }
    }

    /// Allocate a scalar and push it.
    ///
    /// # Errors
    ///
    /// [`GcError::RootOverflow`] if the stack is full (nothing is allocated
    /// in that case), [`GcError::HeapExhausted`] if the heap is full.
    pub fn push_int(&mut self, value: i64) -> Result<ObjRef, GcError> {
        self.ensure_room()?;
        let obj = self.heap.allocate_scalar(value, &self.stack)?;
        self.stack.push_root(obj)?;
        Ok(obj)
    }

    /// Pop the top two values and push a pair of them. The value that was
    /// below the top becomes `first`, the top becomes `second`.
    ///
    /// Both operands stay on the stack, and so stay rooted, until the pair
    /// has been allocated.
    ///
    /// # Errors
    ///
    /// [`GcError::RootUnderflow`] if fewer than two values are on the stack,
    /// [`GcError::HeapExhausted`] if the heap is full. The stack is unchanged
    /// on error.
    pub fn push_pair(&mut self) -> Result<ObjRef, GcError> {
        let second = self.stack.peek_at(0).ok_or(GcError::RootUnderflow)?;
        let first = self.stack.peek_at(1).ok_or(GcError::RootUnderflow)?;
        let pair = self
            .heap
            .allocate_composite(Some(first), Some(second), &self.stack)?;
        self.stack.pop_root()?;
        self.stack.pop_root()?;
        self.stack.push_root(pair)?;
        Ok(pair)
    }

    /// Pop the top value.
    ///
    /// # Errors
    ///
    /// [`GcError::RootUnderflow`] if the stack is empty.
    pub fn pop(&mut self) -> Result<ObjRef, GcError> {
        self.stack.pop_root()
    }

    /// The top value, if any.
    #[must_use]
    pub fn peek(&self) -> Option<ObjRef> {
        self.stack.peek()
    }

    /// Open a lexical scope; see [`RootSet::enter_frame`].
    pub fn enter_scope(&mut self) {
        self.stack.enter_frame();
    }

    /// Close the innermost scope, popping everything pushed inside it.
    ///
    /// # Errors
    ///
    /// [`GcError::RootUnderflow`] if no scope is open.
    pub fn exit_scope(&mut self) -> Result<usize, GcError> {
        self.stack.exit_frame()
    }

    /// Point the first field of pair `obj` at `target`.
    ///
    /// # Panics
    ///
    /// See [`Heap::set_first`].
    pub fn set_first(&mut self, obj: ObjRef, target: Option<ObjRef>) {
        self.heap.set_first(obj, target);
    }

    /// Point the second field of pair `obj` at `target`.
    ///
    /// # Panics
    ///
    /// See [`Heap::set_second`].
    pub fn set_second(&mut self, obj: ObjRef, target: Option<ObjRef>) {
        self.heap.set_second(obj, target);
    }

    /// Collect now, rooted at the current stack.
    pub fn collect(&mut self) -> GcMetrics {
        self.heap.collect(&self.stack)
    }

    /// Empty the stack and collect, releasing every object.
    pub fn reset(&mut self) -> GcMetrics {
        self.stack.clear();
        self.collect()
    }

    /// Number of objects currently allocated.
    #[must_use]
    pub const fn object_count(&self) -> usize {
        self.heap.live_object_count()
    }

    /// The heap's current collection threshold.
    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.heap.current_threshold()
    }

    /// Text form of the top value.
    #[must_use]
    pub fn render_top(&self) -> Option<String> {
        self.peek().map(|top| self.heap.render(top))
    }

    /// The underlying heap.
    #[must_use]
    pub const fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The underlying heap, for edits the machine has no instruction for.
    #[must_use]
    pub const fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// The operand stack.
    #[must_use]
    pub const fn roots(&self) -> &RootSet {
        &self.stack
    }

    fn ensure_room(&self) -> Result<(), GcError> {
        if self.stack.len() == self.stack.capacity() {
            return Err(GcError::RootOverflow {
                capacity: self.stack.capacity(),
            });
        }
        Ok(())
    }
}
