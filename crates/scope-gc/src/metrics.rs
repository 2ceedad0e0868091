//! GC metrics and statistics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Statistics from a single garbage collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcMetrics {
    /// Duration of the whole collection.
    pub duration: Duration,
    /// Duration of the mark phase.
    pub mark_duration: Duration,
    /// Duration of the sweep phase.
    pub sweep_duration: Duration,
    /// Number of objects marked reachable.
    pub objects_marked: usize,
    /// Number of objects reclaimed.
    pub objects_reclaimed: usize,
    /// Number of objects surviving.
    pub objects_surviving: usize,
    /// Threshold in effect when the collection started.
    pub threshold_before: usize,
    /// Threshold scheduled by this collection.
    pub threshold_after: usize,
    /// What caused the collection.
    pub trigger: CollectionTrigger,
    /// Collections run by this heap so far, including this one.
    pub total_collections: usize,
}

impl Default for GcMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GcMetrics {
    /// Create a new `GcMetrics` with all fields set to zero/defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duration: Duration::ZERO,
            mark_duration: Duration::ZERO,
            sweep_duration: Duration::ZERO,
            objects_marked: 0,
            objects_reclaimed: 0,
            objects_surviving: 0,
            threshold_before: 0,
            threshold_after: 0,
            trigger: CollectionTrigger::None,
            total_collections: 0,
        }
    }
}

/// Why a collection ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CollectionTrigger {
    /// No collection has run yet.
    #[default]
    None = 0,
    /// An allocation found the live count at the threshold.
    Allocation = 1,
    /// An allocation found the heap's memory domain full.
    Exhaustion = 2,
    /// The host asked for a collection.
    Explicit = 3,
}

impl CollectionTrigger {
    /// Short lowercase name, used as a tracing field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Allocation => "allocation",
            Self::Exhaustion => "exhaustion",
            Self::Explicit => "explicit",
        }
    }
}

/// Internal helper for capturing phase durations.
///
/// # Example
///
/// ```
/// use scope_gc::metrics::PhaseTimer;
///
/// let mut timer = PhaseTimer::new();
/// timer.start();
/// // ... mark phase work ...
/// timer.end_mark();
///
/// timer.start();
/// // ... sweep phase work ...
/// timer.end_sweep();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimer {
    /// Accumulated mark phase time.
    pub mark: Duration,
    /// Accumulated sweep phase time.
    pub sweep: Duration,
    current_start: Option<Instant>,
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTimer {
    /// Create a new `PhaseTimer` with all durations set to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mark: Duration::ZERO,
            sweep: Duration::ZERO,
            current_start: None,
        }
    }

    /// Start timing a phase.
    pub fn start(&mut self) {
        self.current_start = Some(Instant::now());
    }

    /// End the mark phase and record its duration.
    pub fn end_mark(&mut self) {
        if let Some(start) = self.current_start.take() {
            self.mark = start.elapsed();
        }
    }

    /// End the sweep phase and record its duration.
    pub fn end_sweep(&mut self) {
        if let Some(start) = self.current_start.take() {
            self.sweep = start.elapsed();
        }
    }
}

/// Process-level cumulative GC statistics.
///
/// Every heap in the process reports into the same counters.
///
/// # Example
///
/// ```
/// use scope_gc::global_metrics;
///
/// let metrics = global_metrics();
/// println!("Total collections: {}", metrics.total_collections());
/// ```
#[derive(Debug)]
pub struct GlobalMetrics {
    collections: AtomicUsize,
    explicit_collections: AtomicUsize,
    objects_reclaimed: AtomicUsize,
    pause_ns: AtomicU64,
    exhaustions: AtomicUsize,
}

impl Default for GlobalMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalMetrics {
    /// Create a new `GlobalMetrics` with all counters initialized to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            collections: AtomicUsize::new(0),
            explicit_collections: AtomicUsize::new(0),
            objects_reclaimed: AtomicUsize::new(0),
            pause_ns: AtomicU64::new(0),
            exhaustions: AtomicUsize::new(0),
        }
    }

    /// Returns the total number of collections performed.
    #[inline]
    #[must_use]
    pub fn total_collections(&self) -> usize {
        self.collections.load(Ordering::Relaxed)
    }

    /// Returns the number of collections the host requested explicitly.
    #[inline]
    #[must_use]
    pub fn total_explicit_collections(&self) -> usize {
        self.explicit_collections.load(Ordering::Relaxed)
    }

    /// Returns the total number of objects reclaimed.
    #[inline]
    #[must_use]
    pub fn total_objects_reclaimed(&self) -> usize {
        self.objects_reclaimed.load(Ordering::Relaxed)
    }

    /// Returns the total pause time in nanoseconds.
    #[inline]
    #[must_use]
    pub fn total_pause_ns(&self) -> u64 {
        self.pause_ns.load(Ordering::Relaxed)
    }

    /// Returns how many allocations failed with `HeapExhausted`.
    #[inline]
    #[must_use]
    pub fn total_exhaustions(&self) -> usize {
        self.exhaustions.load(Ordering::Relaxed)
    }

    pub(crate) fn record(&self, metrics: &GcMetrics) {
        self.collections.fetch_add(1, Ordering::Relaxed);
        if metrics.trigger == CollectionTrigger::Explicit {
            self.explicit_collections.fetch_add(1, Ordering::Relaxed);
        }
        self.objects_reclaimed
            .fetch_add(metrics.objects_reclaimed, Ordering::Relaxed);
        let nanos = u64::try_from(metrics.duration.as_nanos()).unwrap_or(u64::MAX);
        self.pause_ns.fetch_add(nanos, Ordering::Relaxed);
    }

    pub(crate) fn record_exhaustion(&self) {
        self.exhaustions.fetch_add(1, Ordering::Relaxed);
    }
}

static GLOBAL_METRICS: GlobalMetrics = GlobalMetrics::new();

/// Get the global cumulative GC metrics.
#[must_use]
pub fn global_metrics() -> &'static GlobalMetrics {
    &GLOBAL_METRICS
}

/// Ring buffer size for GC history.
pub const HISTORY_SIZE: usize = 64;

/// Ring buffer of the most recent `GcMetrics` snapshots across all heaps.
///
/// # Example
///
/// ```
/// use scope_gc::gc_history;
///
/// let history = gc_history();
/// println!("Total recorded: {}", history.total_recorded());
/// ```
#[derive(Debug)]
pub struct GcHistory {
    buffer: Mutex<VecDeque<GcMetrics>>,
    recorded: AtomicUsize,
}

impl Default for GcHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(HISTORY_SIZE)),
            recorded: AtomicUsize::new(0),
        }
    }

    /// Append a snapshot, evicting the oldest once full.
    pub fn push(&self, metrics: GcMetrics) {
        let mut buffer = self.buffer.lock();
        if buffer.len() == HISTORY_SIZE {
            buffer.pop_front();
        }
        buffer.push_back(metrics);
        self.recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of snapshots ever pushed, including evicted ones.
    #[must_use]
    pub fn total_recorded(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }

    /// The retained snapshots, oldest first.
    #[must_use]
    pub fn recent(&self) -> Vec<GcMetrics> {
        self.buffer.lock().iter().copied().collect()
    }

    /// The most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<GcMetrics> {
        self.buffer.lock().back().copied()
    }

    /// Average pause over the retained snapshots.
    #[must_use]
    pub fn average_pause(&self) -> Duration {
        let buffer = self.buffer.lock();
        let Ok(count) = u32::try_from(buffer.len()) else {
            return Duration::ZERO;
        };
        if count == 0 {
            return Duration::ZERO;
        }
        buffer.iter().map(|m| m.duration).sum::<Duration>() / count
    }
}

static GC_HISTORY: LazyLock<GcHistory> = LazyLock::new(GcHistory::new);

/// Get the process-wide history of recent collections.
#[must_use]
pub fn gc_history() -> &'static GcHistory {
    &GC_HISTORY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(reclaimed: usize, millis: u64) -> GcMetrics {
        GcMetrics {
            duration: Duration::from_millis(millis),
            objects_reclaimed: reclaimed,
            trigger: CollectionTrigger::Explicit,
            ..GcMetrics::new()
        }
    }

    #[test]
    fn test_new_metrics_are_empty() {
        let m = GcMetrics::default();
        assert_eq!(m.trigger, CollectionTrigger::None);
        assert_eq!(m.total_collections, 0);
        assert_eq!(m.duration, Duration::ZERO);
    }

    #[test]
    fn test_phase_timer_records_each_phase() {
        let mut timer = PhaseTimer::new();
        timer.end_mark();
        assert_eq!(timer.mark, Duration::ZERO);

        timer.start();
        timer.end_mark();
        timer.start();
        timer.end_sweep();
        assert!(timer.current_start.is_none());
    }

    #[test]
    fn test_global_metrics_record() {
        let metrics = GlobalMetrics::new();
        metrics.record(&sample(5, 1));
        metrics.record(&GcMetrics {
            trigger: CollectionTrigger::Allocation,
            ..sample(2, 1)
        });
        metrics.record_exhaustion();

        assert_eq!(metrics.total_collections(), 2);
        assert_eq!(metrics.total_explicit_collections(), 1);
        assert_eq!(metrics.total_objects_reclaimed(), 7);
        assert_eq!(metrics.total_pause_ns(), 2_000_000);
        assert_eq!(metrics.total_exhaustions(), 1);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let history = GcHistory::new();
        for i in 0..HISTORY_SIZE + 3 {
            history.push(sample(i, 2));
        }
        let recent = history.recent();
        assert_eq!(recent.len(), HISTORY_SIZE);
        assert_eq!(recent[0].objects_reclaimed, 3);
        assert_eq!(
            history.latest().map(|m| m.objects_reclaimed),
            Some(HISTORY_SIZE + 2)
        );
        assert_eq!(history.total_recorded(), HISTORY_SIZE + 3);
        assert_eq!(history.average_pause(), Duration::from_millis(2));
    }

    #[test]
    fn test_empty_history() {
        let history = GcHistory::new();
        assert!(history.latest().is_none());
        assert_eq!(history.average_pause(), Duration::ZERO);
    }

    #[test]
    fn test_trigger_names() {
        assert_eq!(CollectionTrigger::Allocation.as_str(), "allocation");
        assert_eq!(CollectionTrigger::Exhaustion.as_str(), "exhaustion");
        assert_eq!(CollectionTrigger::Explicit.as_str(), "explicit");
    }
}
