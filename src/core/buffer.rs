//! Accumulation buffer for pending log entries
//!
//! The buffer itself is not synchronized. [`BufferedStream`] keeps it behind a
//! mutex, and `flush` takes `&mut self`, so a generation can only be swapped
//! out while that lock is held.
//!
//! [`BufferedStream`]: crate::core::BufferedStream

/// Default number of slots allocated for a fresh buffer generation
pub const DEFAULT_BASE_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct Buffer {
    entries: Vec<Vec<u8>>,
    base_capacity: usize,
}

impl Buffer {
    pub fn new(base_capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(base_capacity),
            base_capacity,
        }
    }

    /// Store an entry after the last admitted one and return the new fill count.
    ///
    /// Grows past the base capacity when full; the next flush brings the
    /// allocation back to `base_capacity`.
    pub fn append(&mut self, entry: Vec<u8>) -> usize {
        self.entries.push(entry);
        self.entries.len()
    }

    /// Swap the current generation out for a fresh, empty one.
    pub fn flush(&mut self) -> Vec<Vec<u8>> {
        std::mem::replace(&mut self.entries, Vec::with_capacity(self.base_capacity))
    }

    /// Number of admitted entries in the current generation
    #[inline]
    pub fn fill_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots currently allocated
    #[inline]
    pub fn slots(&self) -> usize {
        self.entries.capacity()
    }

    #[inline]
    pub fn base_capacity(&self) -> usize {
        self.base_capacity
    }

    /// Change the allocation size used for future generations.
    ///
    /// Returns `false` without touching anything if `base_capacity` is
    /// unchanged. The caller decides when to flush.
    pub fn set_base_capacity(&mut self, base_capacity: usize) -> bool {
        if base_capacity == self.base_capacity {
            return false;
        }
        self.base_capacity = base_capacity;
        true
    }

    /// Entries of the current generation, in admission order
    pub fn entries(&self) -> &[Vec<u8>] {
        &self.entries
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_CAPACITY)
    }
}
