//! Heap configuration.

/// Live-object count at which the first collection is triggered.
pub const DEFAULT_INITIAL_THRESHOLD: usize = 8;
/// Multiplier applied to the surviving object count after each sweep.
pub const DEFAULT_GROWTH_FACTOR: usize = 2;
/// Lower bound for the rescheduled threshold.
pub const DEFAULT_MIN_THRESHOLD: usize = 0;

/// Tuning knobs for a [`Heap`](crate::Heap).
///
/// # Example
///
/// ```
/// use scope_gc::{Heap, HeapConfig};
///
/// let config = HeapConfig::new()
///     .initial_threshold(64)
///     .growth_factor(3)
///     .max_objects(Some(4096));
/// let heap = Heap::with_config(config);
/// assert_eq!(heap.current_threshold(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
    /// Threshold in effect before the first collection.
    pub initial_threshold: usize,
    /// After each sweep the threshold becomes `growth_factor * live`.
    pub growth_factor: usize,
    /// The rescheduled threshold never drops below this value.
    pub min_threshold: usize,
    /// Size of the heap's memory domain, in objects. `None` is unbounded.
    pub max_objects: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapConfig {
    /// The default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_threshold: DEFAULT_INITIAL_THRESHOLD,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            max_objects: None,
        }
    }

    /// Sets the threshold used until the first collection.
    #[must_use]
    pub const fn initial_threshold(mut self, threshold: usize) -> Self {
        self.initial_threshold = threshold;
        self
    }

    /// Sets the growth factor. Values below 1 are raised to 1 so the
    /// threshold can never fall under the surviving object count.
    #[must_use]
    pub const fn growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = if factor == 0 { 1 } else { factor };
        self
    }

    /// Sets the floor for the rescheduled threshold.
    #[must_use]
    pub const fn min_threshold(mut self, threshold: usize) -> Self {
        self.min_threshold = threshold;
        self
    }

    /// Bounds the number of objects the heap may hold at once.
    #[must_use]
    pub const fn max_objects(mut self, limit: Option<usize>) -> Self {
        self.max_objects = limit;
        self
    }
}
