//! Pipeline configuration.
//!
//! All tunables live here: a 128-slot ring, batches of 10 samples,
//! 1-second channel bounds and a 1.5-second post-handshake settle delay by
//! default. `validate` makes the timing assumption of the unsynchronized
//! ring explicit: the capacity must hold at least two full batches so a
//! batch being displayed is never the batch being overwritten under sane
//! pacing.

use crate::types::Sample;
use core::fmt;
use std::time::Duration;

/// Default ring capacity in slots (1 KiB of packed samples).
pub const DEFAULT_CAPACITY: usize = 128;

/// Default samples per notification batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Ring capacity in sample slots.
    pub capacity: usize,
    /// Samples written per `DataReady` notification.
    pub batch_size: usize,
    /// Bound on every mailbox send and receive.
    pub channel_timeout: Duration,
    /// Consumer sleep between handshake completion and the first receive,
    /// giving the producer time to fill the first batch.
    pub settle_delay: Duration,
    /// Producer delay after each sample; paces the ring's overwrite rate.
    pub sample_period: Duration,
    /// Queue depth per mailbox direction.
    pub mailbox_depth: usize,
    /// Offset added to each sample's integer part before publication.
    pub calibration: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            channel_timeout: Duration::from_millis(1000),
            settle_delay: Duration::from_millis(1500),
            sample_period: Duration::from_millis(20),
            mailbox_depth: 8,
            calibration: 0,
        }
    }
}

impl PipelineConfig {
    /// Byte size of the ring the consumer requests during the handshake.
    #[must_use]
    pub const fn request_bytes(&self) -> u16 {
        (self.capacity * Sample::SLOT_BYTES) as u16
    }

    /// Checks the configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.capacity < 2 * self.batch_size {
            return Err(ConfigError::InsufficientMargin {
                capacity: self.capacity,
                batch_size: self.batch_size,
            });
        }
        // The notification payload carries the start index in one byte;
        // this also keeps the byte size within the two-byte request encoding.
        if self.capacity > 256 {
            return Err(ConfigError::IndexWidthExceeded {
                capacity: self.capacity,
            });
        }
        if self.mailbox_depth == 0 {
            return Err(ConfigError::ZeroMailboxDepth);
        }
        Ok(())
    }
}

/// A configuration invariant violation. All are fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The ring must hold at least one slot.
    ZeroCapacity,
    /// Batches must contain at least one sample.
    ZeroBatchSize,
    /// The ring must hold at least two full batches, so the batch being
    /// displayed is never the batch being overwritten.
    InsufficientMargin {
        /// Configured capacity.
        capacity: usize,
        /// Configured batch size.
        batch_size: usize,
    },
    /// The start index must fit the notification's single payload byte
    /// (which also keeps the byte size within the two-byte request field).
    IndexWidthExceeded {
        /// Configured capacity.
        capacity: usize,
    },
    /// The mailbox must queue at least one frame per direction.
    ZeroMailboxDepth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "ring capacity must be non-zero"),
            Self::ZeroBatchSize => write!(f, "batch size must be non-zero"),
            Self::InsufficientMargin {
                capacity,
                batch_size,
            } => write!(
                f,
                "capacity {capacity} must be at least twice the batch size {batch_size}"
            ),
            Self::IndexWidthExceeded { capacity } => write!(
                f,
                "capacity {capacity} exceeds the one-byte start index (max 256)"
            ),
            Self::ZeroMailboxDepth => write!(f, "mailbox depth must be non-zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
