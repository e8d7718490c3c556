//! Logger metrics for observability
//!
//! Counters cover both sides of the queue: what producers handed over and what
//! the dispatcher worker did with it. Sink failures are counted here rather
//! than propagated to producers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline counters
///
/// # Example
///
/// ```
/// use multisink_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_dispatched();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.pending(), 0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records accepted into the queue
    enqueued: AtomicU64,

    /// Records below the logger's minimum severity, never queued
    filtered: AtomicU64,

    /// Records emitted while the logger was not running
    rejected: AtomicU64,

    /// Records taken off the queue and routed
    dispatched: AtomicU64,

    /// Successful sink writes (one record may count several times)
    delivered: AtomicU64,

    /// Failed sink operations
    sink_failures: AtomicU64,

    /// Records that every matching sink failed to write
    discarded: AtomicU64,

    /// Records left in the queue when a shutdown timed out
    abandoned: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn abandoned(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    /// Records queued but not yet routed or abandoned
    pub fn pending(&self) -> u64 {
        self.enqueued()
            .saturating_sub(self.dispatched())
            .saturating_sub(self.abandoned())
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self, count: u64) -> u64 {
        self.delivered.fetch_add(count, Ordering::Relaxed)
    }

    /// Returns the previous failure count
    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_discarded(&self) -> u64 {
        self.discarded.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_abandoned(&self, count: u64) -> u64 {
        self.abandoned.fetch_add(count, Ordering::Relaxed)
    }

    /// Share of routed records that no sink managed to write (0.0 - 100.0)
    pub fn discard_rate(&self) -> f64 {
        let dispatched = self.dispatched() as f64;
        if dispatched == 0.0 {
            0.0
        } else {
            (self.discarded() as f64 / dispatched) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            filtered: AtomicU64::new(self.filtered()),
            rejected: AtomicU64::new(self.rejected()),
            dispatched: AtomicU64::new(self.dispatched()),
            delivered: AtomicU64::new(self.delivered()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            discarded: AtomicU64::new(self.discarded()),
            abandoned: AtomicU64::new(self.abandoned()),
        }
    }
}
