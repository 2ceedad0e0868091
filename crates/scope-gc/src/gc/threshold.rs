//! Collection trigger scheduling.

use crate::heap::Heap;

/// Set the next collection trigger from the surviving object count and
/// return it.
///
/// The threshold becomes `growth_factor * live`, floored at the configured
/// `min_threshold`. With the default configuration that is `2 * live`: a
/// mostly-live heap collects less and less often as it grows, while a heap
/// whose live set shrinks pulls its trigger back in on the next cycle.
pub fn reschedule_threshold(heap: &mut Heap) -> usize {
    let factor = heap.config.growth_factor.max(1);
    let next = heap
        .live
        .saturating_mul(factor)
        .max(heap.config.min_threshold);

    #[cfg(feature = "tracing")]
    crate::tracing::internal::log_threshold(heap.threshold, next);

    heap.threshold = next;
    next
}
