//! Root tracking using a bounded scope stack.
//!
//! The root set is owned and mutated by the host evaluator. The collector
//! only ever reads it.

use crate::error::GcError;
use crate::object::ObjRef;

// ============================================================================
// RootSet - bounded LIFO of live bindings
// ============================================================================

/// A bounded stack of references that are live from the program's point of
/// view.
///
/// Every object reachable from an entry of this stack survives a collection.
/// The capacity is fixed at construction and never exceeded.
#[derive(Debug, Clone)]
pub struct RootSet {
    roots: Vec<ObjRef>,
    capacity: usize,
    /// Depth of the stack when each open scope frame was entered.
    frame_markers: Vec<usize>,
}

impl RootSet {
    /// Create an empty root set that holds at most `capacity` references.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            roots: Vec::with_capacity(capacity),
            capacity,
            frame_markers: Vec::new(),
        }
    }

    /// Push a reference onto the stack.
    ///
    /// # Errors
    ///
    /// Returns [`GcError::RootOverflow`] if the stack is full. The stack is
    /// left unchanged in that case.
    pub fn push_root(&mut self, root: ObjRef) -> Result<(), GcError> {
        if self.roots.len() == self.capacity {
            return Err(GcError::RootOverflow {
                capacity: self.capacity,
            });
        }
        self.roots.push(root);
        Ok(())
    }

    /// Remove and return the most recently pushed reference.
    ///
    /// # Errors
    ///
    /// Returns [`GcError::RootUnderflow`] if the stack is empty.
    pub fn pop_root(&mut self) -> Result<ObjRef, GcError> {
        let root = self.roots.pop().ok_or(GcError::RootUnderflow)?;
        // A frame can never extend below the current depth.
        for marker in &mut self.frame_markers {
            *marker = (*marker).min(self.roots.len());
        }
        Ok(root)
    }

    /// The most recently pushed reference, if any.
    #[must_use]
    pub fn peek(&self) -> Option<ObjRef> {
        self.roots.last().copied()
    }

    /// The reference `depth` entries below the top (`0` is the top).
    #[must_use]
    pub fn peek_at(&self, depth: usize) -> Option<ObjRef> {
        let len = self.roots.len();
        depth
            .checked_add(1)
            .and_then(|d| len.checked_sub(d))
            .map(|i| self.roots[i])
    }

    /// Number of references currently on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the stack holds no references.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Maximum number of references the stack can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over all roots, bottom of the stack first.
    pub fn iter(&self) -> impl Iterator<Item = ObjRef> + '_ {
        self.roots.iter().copied()
    }

    /// Open a scope frame at the current depth.
    pub fn enter_frame(&mut self) {
        self.frame_markers.push(self.roots.len());
    }

    /// Close the innermost scope frame, dropping every root pushed since it
    /// was opened. Returns the number of roots dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GcError::RootUnderflow`] if no frame is open.
    pub fn exit_frame(&mut self) -> Result<usize, GcError> {
        let marker = self.frame_markers.pop().ok_or(GcError::RootUnderflow)?;
        let dropped = self.roots.len().saturating_sub(marker);
        self.roots.truncate(marker);
        Ok(dropped)
    }

    /// Number of scope frames currently open.
    #[must_use]
    pub fn frame_depth(&self) -> usize {
        self.frame_markers.len()
    }

    /// Drop all roots and frames.
    pub fn clear(&mut self) {
        self.roots.clear();
        self.frame_markers.clear();
    }
}
