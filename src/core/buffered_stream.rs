//! Buffering dispatcher for a target stream
//!
//! A [`BufferedStream`] collects entries in memory and hands them to its
//! target stream as one flattened blob when either trigger fires:
//!
//! - **limit reached**: a write that finds `capacity_limit` entries pending
//!   swaps the buffer out and transmits it on a background thread. Disabled
//!   when the limit is 0.
//! - **time interval**: the autonomous routine swaps the buffer out on every
//!   tick of `flush_interval` and transmits it on the routine's own thread.
//!   Disabled when the interval is zero.
//!
//! The buffer lock and the routine lock are separate; neither is held while
//! talking to the target stream.

use super::{
    buffer::Buffer,
    config::{default_fatal_callback, BufferedStreamConfig, FatalCallback},
    error::{Result, StreamError},
    flatten::flatten,
    metrics::{FlushTrigger, StreamMetrics},
    stream::{write_isolated, Stream},
};
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct RoutineState {
    running: bool,
    interval: Duration,
    /// Bumped on every start so a routine left over from an earlier start
    /// exits instead of flushing alongside the new one.
    generation: u64,
}

struct Shared {
    stream: Option<Arc<dyn Stream>>,
    buffer: Mutex<Buffer>,
    capacity_limit: AtomicUsize,
    separator: AtomicU8,
    routine: Mutex<RoutineState>,
    fatal: RwLock<Option<FatalCallback>>,
    metrics: StreamMetrics,
}

impl Shared {
    /// Swap the current generation out, recording the flush if it had content
    fn take(&self, trigger: FlushTrigger) -> Vec<Vec<u8>> {
        let entries = self.buffer.lock().flush();
        if !entries.is_empty() {
            self.metrics.record_flush(trigger);
        }
        entries
    }

    /// Flatten a captured generation and write it to the target stream
    fn transmit(&self, entries: &[Vec<u8>]) -> Result<()> {
        let Some(stream) = self.stream.as_ref() else {
            self.metrics.record_failed();
            return Err(StreamError::NoStream);
        };

        let blob = flatten(entries, self.separator.load(Ordering::Relaxed));
        match write_isolated(stream.as_ref(), &blob) {
            Ok(written) => {
                self.metrics
                    .record_transmitted(entries.len() as u64, written as u64);
                Ok(())
            }
            Err(e) => {
                self.metrics.record_failed();
                Err(StreamError::transmission(
                    stream.name(),
                    entries.len(),
                    e.to_string(),
                ))
            }
        }
    }

    fn report_fatal(&self, err: StreamError) {
        // Clone out so a concurrent set_fatal_fn never waits on the callback
        let callback = self.fatal.read().clone();
        if let Some(callback) = callback {
            callback(err);
        }
    }

    fn is_current_routine(&self, generation: u64) -> bool {
        let routine = self.routine.lock();
        routine.running && routine.generation == generation
    }

    /// Body of the autonomous routine. Returns `Ok` when stopped, `Err` on
    /// the first failed transmission.
    fn run_routine(&self, ticker: Receiver<Instant>, generation: u64) -> Result<()> {
        for _ in ticker.iter() {
            if !self.is_current_routine(generation) {
                return Ok(());
            }

            let entries = self.take(FlushTrigger::Interval);
            if entries.is_empty() {
                continue;
            }

            if let Err(e) = self.transmit(&entries) {
                let mut routine = self.routine.lock();
                if routine.generation == generation {
                    routine.running = false;
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Wrapper over a [`Stream`] that buffers entries before transmission
///
/// # Example
///
/// ```
/// use rust_stream_logger::core::BufferedStream;
/// use rust_stream_logger::streams::MemoryStream;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemoryStream::new());
/// let buffered = BufferedStream::new(Arc::clone(&sink));
/// buffered.set_buffer_limit(2);
///
/// buffered.write_entry("first");
/// buffered.write_entry("second");
/// // The third write finds the limit reached and ships the first two
/// assert_eq!(buffered.write_entry("third"), 1);
/// ```
pub struct BufferedStream {
    shared: Arc<Shared>,
}

impl BufferedStream {
    /// Create a buffered stream over `stream` with default settings
    #[must_use]
    pub fn new(stream: impl Stream + 'static) -> Self {
        Self::from_parts(
            Some(Arc::new(stream) as Arc<dyn Stream>),
            BufferedStreamConfig::default(),
            Some(default_fatal_callback()),
        )
    }

    /// Create a buffered stream with no target
    ///
    /// Every transmission fails with [`StreamError::NoStream`].
    #[must_use]
    pub fn detached() -> Self {
        Self::from_parts(
            None,
            BufferedStreamConfig::default(),
            Some(default_fatal_callback()),
        )
    }

    #[must_use]
    pub fn builder() -> BufferedStreamBuilder {
        BufferedStreamBuilder::new()
    }

    fn from_parts(
        stream: Option<Arc<dyn Stream>>,
        config: BufferedStreamConfig,
        fatal: Option<FatalCallback>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                stream,
                buffer: Mutex::new(Buffer::new(config.base_capacity)),
                capacity_limit: AtomicUsize::new(config.capacity_limit),
                separator: AtomicU8::new(config.separator),
                routine: Mutex::new(RoutineState {
                    interval: config.flush_interval,
                    ..Default::default()
                }),
                fatal: RwLock::new(fatal),
                metrics: StreamMetrics::new(),
            }),
        }
    }

    /// Admit an entry and return the number of entries now pending.
    ///
    /// If the capacity limit is enabled and already reached, the pending
    /// generation is swapped out first and transmitted on a background
    /// thread; transmission failures go to the fatal callback only.
    pub fn write_entry(&self, entry: impl Into<Vec<u8>>) -> usize {
        let entry = entry.into();
        let (flushed, count) = {
            let mut buffer = self.shared.buffer.lock();
            let limit = self.shared.capacity_limit.load(Ordering::Relaxed);

            let flushed = if limit > 0 && buffer.fill_count() >= limit {
                Some(buffer.flush())
            } else {
                None
            };

            (flushed, buffer.append(entry))
        };

        self.shared.metrics.record_buffered();

        if let Some(entries) = flushed.filter(|entries| !entries.is_empty()) {
            self.shared.metrics.record_flush(FlushTrigger::Capacity);
            self.spawn_transmission(entries);
        }

        count
    }

    fn spawn_transmission(&self, entries: Vec<Vec<u8>>) {
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("buffered-stream-transmit".to_string())
            .spawn(move || {
                if let Err(e) = shared.transmit(&entries) {
                    shared.report_fatal(e);
                }
            });

        if let Err(e) = spawned {
            self.shared.metrics.record_failed();
            self.shared.report_fatal(StreamError::from(e));
        }
    }

    /// Set the capacity limit; 0 disables the capacity trigger
    pub fn set_buffer_limit(&self, limit: usize) {
        self.shared.capacity_limit.store(limit, Ordering::Relaxed);
    }

    pub fn buffer_limit(&self) -> usize {
        self.shared.capacity_limit.load(Ordering::Relaxed)
    }

    /// Set the separator placed between entries when flattening
    ///
    /// Entries are not checked for the separator byte.
    pub fn set_separator(&self, separator: u8) {
        self.shared.separator.store(separator, Ordering::Relaxed);
    }

    pub fn separator(&self) -> u8 {
        self.shared.separator.load(Ordering::Relaxed)
    }

    /// Replace the fatal callback
    pub fn set_fatal_fn(&self, callback: FatalCallback) {
        *self.shared.fatal.write() = Some(callback);
    }

    /// Remove the fatal callback; background failures are then only counted
    pub fn clear_fatal_fn(&self) {
        *self.shared.fatal.write() = None;
    }

    /// Change the allocation size for fresh buffer generations.
    ///
    /// Returns `Ok(false)` if `base_capacity` is unchanged. Otherwise the
    /// pending generation is flushed; with `send` it is transmitted
    /// synchronously, without it the content is discarded.
    ///
    /// # Errors
    ///
    /// Transmission failures of the flushed content. The new base capacity
    /// is applied regardless, and the content is lost.
    pub fn set_base_capacity(&self, base_capacity: usize, send: bool) -> Result<bool> {
        let entries = {
            let mut buffer = self.shared.buffer.lock();
            if !buffer.set_base_capacity(base_capacity) {
                return Ok(false);
            }
            buffer.flush()
        };

        if entries.is_empty() {
            return Ok(true);
        }
        self.shared.metrics.record_flush(FlushTrigger::Resize);

        if send {
            self.shared.transmit(&entries)?;
        }
        Ok(true)
    }

    pub fn base_capacity(&self) -> usize {
        self.shared.buffer.lock().base_capacity()
    }

    /// Set the scheduling interval for autonomous transmission.
    ///
    /// A zero interval disables the feature and stops the routine on its
    /// next tick. Otherwise the interval is stored and, if `start` is set,
    /// the routine is started.
    pub fn set_scheduling_interval(&self, interval: Duration, start: bool) -> Result<()> {
        {
            let mut routine = self.shared.routine.lock();
            if interval.is_zero() {
                routine.interval = Duration::ZERO;
                routine.running = false;
                return Ok(());
            }
            routine.interval = interval;
        }

        if !start {
            return Ok(());
        }

        self.start_autonomous_transmission()
            .map_err(|e| StreamError::RoutineStart(Box::new(e)))
    }

    pub fn scheduling_interval(&self) -> Duration {
        self.shared.routine.lock().interval
    }

    /// Start the autonomous transmission routine on its own thread.
    ///
    /// # Errors
    ///
    /// [`StreamError::AlreadyRunning`] if a routine is active,
    /// [`StreamError::NoInterval`] if no scheduling interval is set.
    pub fn start_autonomous_transmission(&self) -> Result<()> {
        let (generation, interval) = {
            let mut routine = self.shared.routine.lock();
            if routine.running {
                return Err(StreamError::AlreadyRunning);
            }
            if routine.interval.is_zero() {
                return Err(StreamError::NoInterval);
            }
            routine.running = true;
            routine.generation += 1;
            (routine.generation, routine.interval)
        };

        let ticker = crossbeam_channel::tick(interval);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("buffered-stream-routine".to_string())
            .spawn(move || {
                if let Err(e) = shared.run_routine(ticker, generation) {
                    shared.report_fatal(StreamError::RoutineFailed(Box::new(e)));
                }
            });

        if let Err(e) = spawned {
            let mut routine = self.shared.routine.lock();
            if routine.generation == generation {
                routine.running = false;
            }
            return Err(StreamError::from(e));
        }
        Ok(())
    }

    /// Ask the routine to stop; it exits on its next tick
    pub fn stop_autonomous_transmission(&self) {
        self.shared.routine.lock().running = false;
    }

    pub fn is_routine_running(&self) -> bool {
        self.shared.routine.lock().running
    }

    /// Swap the pending generation out and transmit it on the calling thread.
    ///
    /// Returns the number of entries transmitted.
    pub fn flush_now(&self) -> Result<usize> {
        let entries = self.shared.take(FlushTrigger::Manual);
        if entries.is_empty() {
            return Ok(0);
        }
        self.shared.transmit(&entries)?;
        Ok(entries.len())
    }

    /// Number of entries waiting for the next flush
    pub fn fill_count(&self) -> usize {
        self.shared.buffer.lock().fill_count()
    }

    /// Copy of the entries waiting for the next flush, in admission order
    pub fn pending_entries(&self) -> Vec<Vec<u8>> {
        self.shared.buffer.lock().entries().to_vec()
    }

    pub fn metrics(&self) -> &StreamMetrics {
        &self.shared.metrics
    }
}

impl Stream for BufferedStream {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        Ok(self.write_entry(bytes))
    }

    fn name(&self) -> &str {
        "buffered"
    }
}

impl Default for BufferedStream {
    fn default() -> Self {
        Self::detached()
    }
}

impl Drop for BufferedStream {
    fn drop(&mut self) {
        self.stop_autonomous_transmission();

        // Final flush of anything still pending
        if self.shared.stream.is_none() {
            return;
        }
        if let Err(e) = self.flush_now() {
            eprintln!("[STREAM ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

/// Builder for constructing a [`BufferedStream`] with a fluent API
///
/// # Example
/// ```
/// use rust_stream_logger::core::BufferedStream;
/// use rust_stream_logger::streams::MemoryStream;
/// use std::time::Duration;
///
/// let buffered = BufferedStream::builder()
///     .stream(MemoryStream::new())
///     .capacity_limit(100)
///     .flush_interval(Duration::from_secs(60))
///     .separator(b'\n')
///     .build()
///     .expect("valid configuration");
/// assert_eq!(buffered.buffer_limit(), 100);
/// ```
pub struct BufferedStreamBuilder {
    stream: Option<Arc<dyn Stream>>,
    config: BufferedStreamConfig,
    fatal: Option<FatalCallback>,
    autostart: bool,
}

impl BufferedStreamBuilder {
    pub fn new() -> Self {
        Self {
            stream: None,
            config: BufferedStreamConfig::default(),
            fatal: Some(default_fatal_callback()),
            autostart: false,
        }
    }

    /// Set the target stream
    #[must_use = "builder methods return a new value"]
    pub fn stream<S: Stream + 'static>(mut self, stream: S) -> Self {
        self.stream = Some(Arc::new(stream) as Arc<dyn Stream>);
        self
    }

    /// Set an already shared target stream
    #[must_use = "builder methods return a new value"]
    pub fn shared_stream(mut self, stream: Arc<dyn Stream>) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Replace every setting at once
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: BufferedStreamConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn capacity_limit(mut self, limit: usize) -> Self {
        self.config.capacity_limit = limit;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn base_capacity(mut self, base_capacity: usize) -> Self {
        self.config.base_capacity = base_capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn separator(mut self, separator: u8) -> Self {
        self.config.separator = separator;
        self
    }

    /// Set the callback for background transmission failures
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal(mut self, callback: FatalCallback) -> Self {
        self.fatal = Some(callback);
        self
    }

    /// Drop the default stderr fatal callback
    #[must_use = "builder methods return a new value"]
    pub fn silent(mut self) -> Self {
        self.fatal = None;
        self
    }

    /// Start the autonomous routine as part of `build`
    #[must_use = "builder methods return a new value"]
    pub fn autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Build the BufferedStream
    ///
    /// # Errors
    ///
    /// Invalid configuration, or a failed routine start when `autostart` is set.
    pub fn build(self) -> Result<BufferedStream> {
        self.config.validate()?;

        let buffered = BufferedStream::from_parts(self.stream, self.config, self.fatal);
        if self.autostart {
            buffered.start_autonomous_transmission()?;
        }
        Ok(buffered)
    }
}

impl Default for BufferedStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}
