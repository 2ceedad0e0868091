//! A tracing mark-sweep garbage collector for a small tagged-union heap.
//!
//! `scope-gc` manages two kinds of values: scalars holding an integer, and
//! composites holding two references to other values. Liveness is decided by
//! tracing from an explicit, bounded root set ([`RootSet`]) that models the
//! variables currently in scope of the program built on top.
//!
//! # Features
//!
//! - **Exact roots**: the root set is a plain stack the host pushes and pops;
//!   nothing is scanned conservatively
//! - **Cycle safe**: self references, mutual cycles and shared substructure
//!   are marked once and reclaimed together
//! - **Amortized triggering**: after every collection the trigger point moves
//!   to `2 * live`, so a mostly-live heap collects less often as it grows
//! - **Stale handle detection**: an [`ObjRef`] to a reclaimed object stops
//!   resolving instead of aliasing the slot's next occupant
//!
//! # Quick Start
//!
//! ```
//! use scope_gc::{Heap, RootSet};
//!
//! let mut heap = Heap::new(8);
//! let mut roots = RootSet::new(4);
//!
//! let one = heap.allocate_scalar(1, &roots)?;
//! let two = heap.allocate_scalar(2, &roots)?;
//! let pair = heap.allocate_composite(Some(one), Some(two), &roots)?;
//! roots.push_root(pair)?;
//!
//! roots.pop_root()?;
//! heap.collect(&roots);
//! assert_eq!(heap.live_object_count(), 0);
//! # Ok::<(), scope_gc::GcError>(())
//! ```
//!
//! # Handling Cycles
//!
//! ```
//! use scope_gc::{Heap, RootSet};
//!
//! let mut heap = Heap::new(8);
//! let roots = RootSet::new(1);
//!
//! let a = heap.allocate_composite(None, None, &roots)?;
//! let b = heap.allocate_composite(Some(a), None, &roots)?;
//! heap.set_first(a, Some(b));
//!
//! heap.collect(&roots); // a <-> b is unreachable and reclaimed
//! assert!(!heap.contains(a) && !heap.contains(b));
//! # Ok::<(), scope_gc::GcError>(())
//! ```
//!
//! # Thread Safety
//!
//! Collection is synchronous and stop-the-world. A [`Heap`] is mutated
//! through `&mut self`, so no other access can overlap a collection. A host
//! that shares a heap between threads must serialize access itself.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod heap;
mod object;
mod roots;
#[cfg(feature = "tracing")]
mod tracing;
mod vm;

pub mod gc;
pub mod metrics;

pub use config::{
    HeapConfig, DEFAULT_GROWTH_FACTOR, DEFAULT_INITIAL_THRESHOLD, DEFAULT_MIN_THRESHOLD,
};
pub use error::GcError;
pub use heap::{Heap, Objects};
pub use metrics::{gc_history, global_metrics, CollectionTrigger, GcMetrics};
pub use object::{HeapObject, ObjRef, ObjectKind, Payload};
pub use roots::RootSet;
pub use vm::Vm;
