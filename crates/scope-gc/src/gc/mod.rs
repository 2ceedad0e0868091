//! Mark-sweep collection.
//!
//! A collection is stop-the-world and runs in three steps, each in its own
//! module:
//! - [`mark_all`]: flag everything reachable from the root set
//! - [`sweep`]: reclaim every unflagged object and clear the survivors' flags
//! - [`reschedule_threshold`]: move the next trigger point relative to the
//!   surviving object count
//!
//! [`Heap::collect`](crate::Heap::collect) runs all three; the steps are also
//! public so a host can drive or inspect them individually.

mod collect;
mod marker;
mod sweeper;
mod threshold;

pub(crate) use collect::collect_with;
pub use marker::mark_all;
pub(crate) use marker::{clear_marks, mark_from};
pub use sweeper::sweep;
pub use threshold::reschedule_threshold;
