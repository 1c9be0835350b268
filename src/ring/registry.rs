//! Buffer handle registry.
//!
//! Raw memory addresses never cross the channel: the grant payload carries
//! an opaque [`BufferHandle`] into a registry owned by the pipeline
//! context, and each task resolves the handle to a shared reference
//! locally. Passing addresses as integers between independently scheduled
//! tasks would be memory-unsafe; a handle that fails to resolve is just a
//! handshake error.

use crate::ring::buffer::SampleRing;
use core::fmt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Opaque handle to a registered sample ring.
///
/// Encoded little-endian as the 4-byte `AllocationGranted` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    /// Encoded size of a handle on the wire.
    pub const ENCODED_LEN: usize = 4;

    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Encodes the handle as 4 little-endian bytes.
    #[must_use]
    pub const fn encode(self) -> [u8; Self::ENCODED_LEN] {
        self.0.to_le_bytes()
    }

    /// Decodes a handle from exactly 4 little-endian bytes.
    #[must_use]
    pub fn decode(payload: &[u8]) -> Option<Self> {
        let raw: [u8; Self::ENCODED_LEN] = payload.try_into().ok()?;
        Some(Self(u32::from_le_bytes(raw)))
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf#{}", self.0)
    }
}

/// Registry of allocated rings, owned by the pipeline context.
///
/// Registration happens once per pipeline (the producer's allocation);
/// entries live until the context is dropped. The ring is reserved once
/// and never freed while the pipeline lives.
pub struct BufferRegistry {
    entries: RwLock<HashMap<u32, Arc<SampleRing>>>,
    next: AtomicU32,
}

impl BufferRegistry {
    /// Creates an empty registry. Handle 0 is never issued, so a zeroed
    /// payload cannot resolve to a buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next: AtomicU32::new(1),
        }
    }

    /// Registers a ring and returns its handle.
    pub fn register(&self, ring: Arc<SampleRing>) -> BufferHandle {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(raw, ring);
        BufferHandle(raw)
    }

    /// Resolves a handle received from the peer.
    #[must_use]
    pub fn resolve(&self, handle: BufferHandle) -> Option<Arc<SampleRing>> {
        self.entries.read().get(&handle.0).cloned()
    }

    /// Number of registered rings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for BufferRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BufferRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferRegistry")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_resolve() {
        let registry = BufferRegistry::new();
        let ring = Arc::new(SampleRing::new(128));

        let handle = registry.register(Arc::clone(&ring));
        let resolved = registry.resolve(handle).unwrap();
        assert!(Arc::ptr_eq(&ring, &resolved));
    }

    #[test]
    fn unknown_handle_resolves_to_none() {
        let registry = BufferRegistry::new();
        assert!(registry.resolve(BufferHandle::from_raw(42)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn zero_handle_is_never_issued() {
        let registry = BufferRegistry::new();
        let handle = registry.register(Arc::new(SampleRing::new(16)));
        assert_ne!(handle.as_raw(), 0);
        assert!(registry.resolve(BufferHandle::from_raw(0)).is_none());
    }

    #[test]
    fn handles_are_distinct() {
        let registry = BufferRegistry::new();
        let first = registry.register(Arc::new(SampleRing::new(16)));
        let second = registry.register(Arc::new(SampleRing::new(16)));
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let handle = BufferHandle::from_raw(0x0403_0201);
        let encoded = handle.encode();
        assert_eq!(encoded, [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(BufferHandle::decode(&encoded), Some(handle));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(BufferHandle::decode(&[1, 2, 3]).is_none());
        assert!(BufferHandle::decode(&[1, 2, 3, 4, 5]).is_none());
    }
}
