use std::sync::Arc;

use parking_lot::Mutex;

use droidscope_types::LogEntry;

use crate::error::LogError;

/// Default number of entries retained
pub const DEFAULT_CAPACITY: usize = 20_000;

/// Ring storage: one fixed array plus a start index and a count
struct Ring {
    slots: Vec<Option<LogEntry>>,
    start: usize,
    count: usize,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Physical slot of the `i`th oldest entry
    fn slot(&self, i: usize) -> usize {
        (self.start + i) % self.capacity()
    }

    fn push(&mut self, entry: LogEntry) {
        if self.count < self.capacity() {
            let index = self.slot(self.count);
            self.slots[index] = Some(entry);
            self.count += 1;
        } else {
            // Full: overwrite the oldest and advance
            self.slots[self.start] = Some(entry);
            self.start = (self.start + 1) % self.capacity();
        }
    }

    fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        (0..self.count).filter_map(move |i| self.slots[self.slot(i)].as_ref())
    }
}

/// Thread-safe ring buffer for log entries
///
/// When full, adding an entry silently discards the oldest one. Clones share
/// the same storage.
#[derive(Clone)]
pub struct LogBuffer {
    ring: Arc<Mutex<Ring>>,

    /// Maximum capacity
    capacity: usize,
}

impl LogBuffer {
    /// Create a new log buffer with the given capacity
    pub fn new(capacity: usize) -> Result<Self, LogError> {
        if capacity == 0 {
            return Err(LogError::InvalidArgument(
                "buffer capacity must be greater than zero",
            ));
        }

        Ok(Self::allocate(capacity))
    }

    pub fn with_default_capacity() -> Self {
        Self::allocate(DEFAULT_CAPACITY)
    }

    fn allocate(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            ring: Arc::new(Mutex::new(Ring {
                slots,
                start: 0,
                count: 0,
            })),
            capacity,
        }
    }

    /// Push a new entry, overwriting the oldest if at capacity
    pub fn push(&self, entry: LogEntry) {
        self.ring.lock().push(entry);
    }

    /// Point-in-time copy of all entries, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        let ring = self.ring.lock();
        let mut out = Vec::with_capacity(ring.count);
        out.extend(ring.iter().cloned());
        out
    }

    /// Clear all entries, keeping the allocated storage
    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        ring.slots.iter_mut().for_each(|slot| *slot = None);
        ring.start = 0;
        ring.count = 0;
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
