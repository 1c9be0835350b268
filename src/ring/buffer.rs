//! Shared sample ring.
//!
//! The ring is the only mutable state the two tasks share, and no lock
//! guards it. Each slot is a single `AtomicU64` holding a packed
//! [`Sample`], so an individual read or write is tear-free, and the
//! producer publishes a monotonically increasing cursor after every write;
//! the consumer never observes a slot that was not published first.
//!
//! There is deliberately no backpressure: when the consumer lags, the
//! producer keeps wrapping and overwrites unread slots. Silently dropping
//! unread samples is the pipeline's stated data-loss policy. The
//! configured margin (`capacity >= 2 * batch_size`) plus the producer's
//! sample pacing keep the overwrite window away from the batch currently
//! being displayed.

use crate::types::Sample;
use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-capacity circular array of sample slots.
pub struct SampleRing {
    slots: Box<[AtomicU64]>,
    /// Total samples ever written by the producer (Release on store).
    published: AtomicU64,
    /// Total samples the consumer has displayed.
    consumed: AtomicU64,
}

impl SampleRing {
    /// Creates a ring of `capacity` zeroed slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        let slots: Vec<AtomicU64> = (0..capacity).map(|_| AtomicU64::new(0)).collect();
        Self {
            slots: slots.into_boxed_slice(),
            published: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
        }
    }

    /// Creates a ring sized from a requested byte size.
    ///
    /// Returns `None` if the size is zero or not a whole number of slots.
    #[must_use]
    pub fn from_byte_size(bytes: usize) -> Option<Self> {
        if bytes == 0 || bytes % Sample::SLOT_BYTES != 0 {
            return None;
        }
        Some(Self::new(bytes / Sample::SLOT_BYTES))
    }

    /// Number of sample slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Size of the backing region in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.capacity() * Sample::SLOT_BYTES
    }

    /// Producer side: stores `sample` at `slot` and publishes it.
    ///
    /// Indices are taken modulo the capacity, matching the addressing
    /// scheme both tasks use.
    pub fn write(&self, slot: usize, sample: Sample) {
        self.slots[slot % self.capacity()].store(sample.pack(), Ordering::Relaxed);
        self.published.fetch_add(1, Ordering::Release);
    }

    /// Consumer side: reads the sample at `slot`.
    ///
    /// The value is tear-free but may have been overwritten by a newer
    /// sample if the producer lapped the ring since it was announced.
    #[must_use]
    pub fn read(&self, slot: usize) -> Sample {
        Sample::unpack(self.slots[slot % self.capacity()].load(Ordering::Acquire))
    }

    /// Total samples the producer has published.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Marks `n` further samples as consumed.
    pub fn mark_consumed(&self, n: u64) {
        self.consumed.fetch_add(n, Ordering::Release);
    }

    /// Total samples the consumer has displayed.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::Acquire)
    }

    /// Samples published but not yet displayed.
    #[must_use]
    pub fn lag(&self) -> u64 {
        self.published().saturating_sub(self.consumed())
    }
}

impl fmt::Debug for SampleRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleRing")
            .field("capacity", &self.capacity())
            .field("published", &self.published())
            .field("consumed", &self.consumed())
            .finish()
    }
}
