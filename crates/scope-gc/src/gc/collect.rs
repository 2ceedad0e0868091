//! Full-collection driver.

use std::time::Instant;

use super::{clear_marks, mark_from, reschedule_threshold, sweep};
use crate::heap::Heap;
use crate::metrics::{gc_history, global_metrics, CollectionTrigger, GcMetrics, PhaseTimer};
use crate::object::ObjRef;

#[cfg(feature = "tracing")]
use crate::tracing::internal::{
    log_phase_end_mark, log_phase_end_sweep, log_phase_start, next_gc_id, trace_gc_collection,
    trace_phase, GcPhase,
};

/// Run mark, sweep and reschedule to completion, treating `roots` as the
/// root set.
pub(crate) fn collect_with<I>(heap: &mut Heap, roots: I, trigger: CollectionTrigger) -> GcMetrics
where
    I: IntoIterator<Item = ObjRef>,
{
    #[cfg(feature = "tracing")]
    let gc_id = next_gc_id();
    #[cfg(feature = "tracing")]
    let _gc_span = trace_gc_collection(trigger, gc_id);

    let start = Instant::now();
    let threshold_before = heap.threshold;
    let mut timer = PhaseTimer::new();

    // Marks left by a standalone mark pass may be out of date.
    if heap.marks_dirty {
        clear_marks(heap);
    }

    timer.start();
    let objects_marked = {
        #[cfg(feature = "tracing")]
        let _mark_span = trace_phase(GcPhase::Mark);
        #[cfg(feature = "tracing")]
        log_phase_start(GcPhase::Mark, heap.live);

        let marked = mark_from(heap, roots);

        #[cfg(feature = "tracing")]
        log_phase_end_mark(marked);
        marked
    };
    timer.end_mark();

    timer.start();
    let objects_reclaimed = {
        #[cfg(feature = "tracing")]
        let _sweep_span = trace_phase(GcPhase::Sweep);
        #[cfg(feature = "tracing")]
        log_phase_start(GcPhase::Sweep, heap.live);

        let reclaimed = sweep(heap);

        #[cfg(feature = "tracing")]
        log_phase_end_sweep(reclaimed);
        reclaimed
    };
    timer.end_sweep();

    let threshold_after = reschedule_threshold(heap);
    heap.collections += 1;

    let metrics = GcMetrics {
        duration: start.elapsed(),
        mark_duration: timer.mark,
        sweep_duration: timer.sweep,
        objects_marked,
        objects_reclaimed,
        objects_surviving: heap.live,
        threshold_before,
        threshold_after,
        trigger,
        total_collections: heap.collections,
    };
    heap.last_metrics = metrics;
    global_metrics().record(&metrics);
    gc_history().push(metrics);
    metrics
}
