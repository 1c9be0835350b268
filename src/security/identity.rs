//! Pre-shared sender identity tags.
//!
//! Each task is identified by a fixed 4-byte tag known to both sides ahead
//! of time. The tag is prepended to every payload before hashing, so the
//! digest binds the sending identity as well as the bytes.

use core::fmt;

/// Length of a sender identity tag in bytes.
pub const SENDER_ID_LEN: usize = 4;

/// A fixed-size pre-shared identity tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId {
    bytes: [u8; SENDER_ID_LEN],
}

impl SenderId {
    /// The producer task's identity tag.
    pub const PRODUCER: Self = Self::new([0xde, 0xad, 0xbe, 0xef]);
    /// The consumer task's identity tag.
    pub const CONSUMER: Self = Self::new([0xba, 0xad, 0xbe, 0xef]);

    /// Creates an identity from its raw tag bytes.
    #[must_use]
    pub const fn new(bytes: [u8; SENDER_ID_LEN]) -> Self {
        Self { bytes }
    }

    /// Returns the raw tag bytes, as fed into the digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SENDER_ID_LEN] {
        &self.bytes
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SenderId({self})")
    }
}
