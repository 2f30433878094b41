//! Buffered stream metrics for observability
//!
//! Counts admitted entries, flushes per trigger, and transmission outcomes so
//! operators can see how often a sink is failing without wiring a callback.

use std::sync::atomic::{AtomicU64, Ordering};

/// What caused a buffer generation to be swapped out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Fill count reached the capacity limit on write
    Capacity,
    /// Scheduling interval elapsed
    Interval,
    /// Base capacity reconfigured
    Resize,
    /// Explicit flush request or final flush on drop
    Manual,
}

/// Metrics for buffered stream observability
///
/// # Example
///
/// ```
/// use rust_stream_logger::core::{FlushTrigger, StreamMetrics};
///
/// let metrics = StreamMetrics::new();
/// metrics.record_buffered();
/// metrics.record_flush(FlushTrigger::Capacity);
/// metrics.record_transmitted(1, 42);
///
/// assert_eq!(metrics.entries_buffered(), 1);
/// assert_eq!(metrics.capacity_flushes(), 1);
/// assert_eq!(metrics.bytes_transmitted(), 42);
/// ```
#[derive(Debug)]
pub struct StreamMetrics {
    /// Entries admitted into the buffer
    entries_buffered: AtomicU64,

    capacity_flushes: AtomicU64,
    interval_flushes: AtomicU64,
    resize_flushes: AtomicU64,
    manual_flushes: AtomicU64,

    /// Blobs accepted by the target stream
    transmissions: AtomicU64,

    /// Blobs the target stream rejected, or that had no stream to go to
    failed_transmissions: AtomicU64,

    /// Entries contained in successful transmissions
    entries_transmitted: AtomicU64,

    /// Flattened bytes handed to the target stream successfully
    bytes_transmitted: AtomicU64,
}

impl StreamMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            entries_buffered: AtomicU64::new(0),
            capacity_flushes: AtomicU64::new(0),
            interval_flushes: AtomicU64::new(0),
            resize_flushes: AtomicU64::new(0),
            manual_flushes: AtomicU64::new(0),
            transmissions: AtomicU64::new(0),
            failed_transmissions: AtomicU64::new(0),
            entries_transmitted: AtomicU64::new(0),
            bytes_transmitted: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn entries_buffered(&self) -> u64 {
        self.entries_buffered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn capacity_flushes(&self) -> u64 {
        self.capacity_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn interval_flushes(&self) -> u64 {
        self.interval_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn resize_flushes(&self) -> u64 {
        self.resize_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn manual_flushes(&self) -> u64 {
        self.manual_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transmissions(&self) -> u64 {
        self.transmissions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_transmissions(&self) -> u64 {
        self.failed_transmissions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn entries_transmitted(&self) -> u64 {
        self.entries_transmitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_transmitted(&self) -> u64 {
        self.bytes_transmitted.load(Ordering::Relaxed)
    }

    /// Total flushes across all triggers
    pub fn total_flushes(&self) -> u64 {
        self.capacity_flushes()
            + self.interval_flushes()
            + self.resize_flushes()
            + self.manual_flushes()
    }

    /// Record an admitted entry
    #[inline]
    pub fn record_buffered(&self) -> u64 {
        self.entries_buffered.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a non-empty buffer swap
    #[inline]
    pub fn record_flush(&self, trigger: FlushTrigger) -> u64 {
        let counter = match trigger {
            FlushTrigger::Capacity => &self.capacity_flushes,
            FlushTrigger::Interval => &self.interval_flushes,
            FlushTrigger::Resize => &self.resize_flushes,
            FlushTrigger::Manual => &self.manual_flushes,
        };
        counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a successful transmission
    #[inline]
    pub fn record_transmitted(&self, entries: u64, bytes: u64) -> u64 {
        self.entries_transmitted.fetch_add(entries, Ordering::Relaxed);
        self.bytes_transmitted.fetch_add(bytes, Ordering::Relaxed);
        self.transmissions.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed transmission
    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed_transmissions.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been transmitted yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_transmissions() as f64;
        let total = self.transmissions() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.entries_buffered.store(0, Ordering::Relaxed);
        self.capacity_flushes.store(0, Ordering::Relaxed);
        self.interval_flushes.store(0, Ordering::Relaxed);
        self.resize_flushes.store(0, Ordering::Relaxed);
        self.manual_flushes.store(0, Ordering::Relaxed);
        self.transmissions.store(0, Ordering::Relaxed);
        self.failed_transmissions.store(0, Ordering::Relaxed);
        self.entries_transmitted.store(0, Ordering::Relaxed);
        self.bytes_transmitted.store(0, Ordering::Relaxed);
    }
}

impl Default for StreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StreamMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            entries_buffered: AtomicU64::new(self.entries_buffered()),
            capacity_flushes: AtomicU64::new(self.capacity_flushes()),
            interval_flushes: AtomicU64::new(self.interval_flushes()),
            resize_flushes: AtomicU64::new(self.resize_flushes()),
            manual_flushes: AtomicU64::new(self.manual_flushes()),
            transmissions: AtomicU64::new(self.transmissions()),
            failed_transmissions: AtomicU64::new(self.failed_transmissions()),
            entries_transmitted: AtomicU64::new(self.entries_transmitted()),
            bytes_transmitted: AtomicU64::new(self.bytes_transmitted()),
        }
    }
}
