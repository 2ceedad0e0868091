//! GC tracing support.
//!
//! Structured tracing spans and events for garbage collection operations.
//! Only compiled with the `tracing` feature; every call site is gated on it.

pub mod internal {
    use std::sync::atomic::{AtomicU64, Ordering};
    use tracing::{span, Level};

    use crate::metrics::CollectionTrigger;

    /// Collection phases that get their own span.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum GcPhase {
        /// Trace the live object graph.
        Mark,
        /// Reclaim unreachable objects.
        Sweep,
    }

    /// Stable identifier for a GC run.
    ///
    /// Correlates every event emitted during one collection. Starts at 1 and
    /// increases monotonically across all heaps in the process.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GcId(pub u64);

    static NEXT_GC_ID: AtomicU64 = AtomicU64::new(1);

    /// Generate the next unique GC ID.
    pub fn next_gc_id() -> GcId {
        GcId(NEXT_GC_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a span for the entire GC collection.
    pub fn trace_gc_collection(trigger: CollectionTrigger, gc_id: GcId) -> span::EnteredSpan {
        span!(
            Level::DEBUG,
            "gc_collect",
            trigger = trigger.as_str(),
            gc_id = gc_id.0
        )
        .entered()
    }

    /// Create a span for a GC phase.
    pub fn trace_phase(phase: GcPhase) -> span::EnteredSpan {
        span!(Level::DEBUG, "gc_phase", phase = ?phase).entered()
    }

    /// Log the start of a GC phase.
    pub fn log_phase_start(phase: GcPhase, live_before: usize) {
        tracing::debug!(phase = ?phase, live_before, "phase_start");
    }

    /// Log the end of the mark phase.
    pub fn log_phase_end_mark(objects_marked: usize) {
        tracing::debug!(phase = ?GcPhase::Mark, objects_marked, "phase_end");
    }

    /// Log the end of the sweep phase.
    pub fn log_phase_end_sweep(objects_reclaimed: usize) {
        tracing::debug!(phase = ?GcPhase::Sweep, objects_reclaimed, "phase_end");
    }

    /// Log a threshold change.
    pub fn log_threshold(old: usize, new: usize) {
        tracing::debug!(old, new, "threshold_rescheduled");
    }

    /// Log an allocation that failed after a full collection.
    pub fn log_heap_exhausted(limit: usize) {
        tracing::warn!(limit, "heap_exhausted");
    }
}
