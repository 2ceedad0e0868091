//! Error taxonomy for the collector.
//!
//! Each variant implies a different corrective action by the host, so they
//! are never folded into a generic error:
//!
//! - [`GcError::RootOverflow`]: grow the root set capacity.
//! - [`GcError::RootUnderflow`]: fix the scope balance of the evaluator.
//! - [`GcError::HeapExhausted`]: grow the heap's memory budget.

use std::fmt;

/// Failures reported by the root set and the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcError {
    /// `push_root` was called on a root set that is already at capacity.
    RootOverflow {
        /// Capacity of the root set that rejected the push.
        capacity: usize,
    },
    /// `pop_root` was called on an empty root set, or a scope frame was
    /// closed without a matching open.
    RootUnderflow,
    /// The heap's memory domain is full even after a complete collection.
    HeapExhausted {
        /// Maximum number of objects the heap may hold.
        limit: usize,
    },
}

impl fmt::Display for GcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootOverflow { capacity } => {
                write!(f, "root set overflow: capacity of {capacity} roots reached")
            }
            Self::RootUnderflow => f.write_str("root set underflow: nothing to pop"),
            Self::HeapExhausted { limit } => write!(
                f,
                "heap exhausted: {limit} objects still live after a full collection"
            ),
        }
    }
}

impl std::error::Error for GcError {}
