//! In-memory stream that records every blob it receives

use crate::core::{Result, Stream, StreamError};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Stream that keeps every written blob in memory
///
/// Useful for tests and for inspecting what a buffered stream would send.
/// A failing stream rejects writes without recording them.
#[derive(Debug, Default)]
pub struct MemoryStream {
    writes: Mutex<Vec<Vec<u8>>>,
    written: Condvar,
    failing: AtomicBool,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stream that rejects every write until `set_failing(false)`
    pub fn failing() -> Self {
        let stream = Self::new();
        stream.set_failing(true);
        stream
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Copy of every recorded blob, oldest first
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn clear(&self) {
        self.writes.lock().clear();
    }

    /// Block until at least `count` blobs are recorded or `timeout` elapses.
    ///
    /// Returns whether the count was reached.
    pub fn wait_for_writes(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut writes = self.writes.lock();
        while writes.len() < count {
            if self.written.wait_until(&mut writes, deadline).timed_out() {
                return writes.len() >= count;
            }
        }
        true
    }
}

impl Stream for MemoryStream {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StreamError::writer("memory stream rejected write"));
        }

        self.writes.lock().push(bytes.to_vec());
        self.written.notify_all();
        Ok(bytes.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
