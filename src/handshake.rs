//! One-shot buffer handshake.
//!
//! Executed exactly once at startup, strictly before either task enters
//! its steady-state loop:
//!
//! 1. The consumer sends `RequestAllocation` carrying the desired buffer
//!    byte size (2 bytes, little-endian).
//! 2. The producer's first action is receiving that request; it reserves
//!    the ring, registers it, and replies `AllocationGranted` carrying the
//!    ring's handle (4 bytes, little-endian).
//! 3. The consumer decodes the handle and resolves it through the shared
//!    registry.
//!
//! Both payload encodings are little-endian on both sides. Every receive
//! here is bounded and a timeout fails the handshake outright; the
//! pipeline reports a startup error instead of stalling silently.

use crate::channel::{ChannelError, SecureChannel};
use crate::error::{Error, Result};
use crate::mailbox::{Command, Mailbox};
use crate::ring::{BufferHandle, BufferRegistry, SampleRing};
use std::sync::Arc;

/// Encoded length of the allocation request payload (`u16`, little-endian).
pub const REQUEST_LEN: usize = 2;

/// Encoded length of the grant payload (`u32` handle, little-endian).
pub const GRANT_LEN: usize = BufferHandle::ENCODED_LEN;

/// Encodes a requested buffer byte size.
#[must_use]
pub const fn encode_request(byte_size: u16) -> [u8; REQUEST_LEN] {
    byte_size.to_le_bytes()
}

/// Decodes a requested buffer byte size.
#[must_use]
pub fn decode_request(payload: &[u8]) -> Option<u16> {
    let raw: [u8; REQUEST_LEN] = payload.try_into().ok()?;
    Some(u16::from_le_bytes(raw))
}

/// Consumer side: requests `byte_size` bytes and resolves the granted
/// handle to the shared ring.
pub fn request_buffer<M: Mailbox>(
    channel: &SecureChannel<M>,
    byte_size: u16,
    registry: &BufferRegistry,
) -> Result<Arc<SampleRing>> {
    channel.send(Command::RequestAllocation, &encode_request(byte_size))?;
    tracing::debug!(byte_size, "allocation requested");

    let inbound = channel.receive(GRANT_LEN).map_err(|err| match err {
        ChannelError::Timeout => {
            Error::Handshake("allocation grant never arrived (timed out)".into())
        }
        other => Error::from(other),
    })?;

    if inbound.command != Command::AllocationGranted {
        return Err(Error::Handshake(format!(
            "expected allocation grant, received {}",
            inbound.command
        )));
    }

    let handle = BufferHandle::decode(&inbound.payload)
        .ok_or_else(|| Error::Handshake("malformed grant payload".into()))?;
    tracing::debug!(%handle, "allocation granted");

    registry
        .resolve(handle)
        .ok_or_else(|| Error::Handshake(format!("grant named unknown handle {handle}")))
}

/// Producer side, first half: waits for the allocation request and decodes
/// the requested byte size.
pub fn await_request<M: Mailbox>(channel: &SecureChannel<M>) -> Result<u16> {
    let inbound = channel.receive(REQUEST_LEN).map_err(|err| match err {
        ChannelError::Timeout => {
            Error::Handshake("allocation request never arrived (timed out)".into())
        }
        other => Error::from(other),
    })?;

    if inbound.command != Command::RequestAllocation {
        return Err(Error::Handshake(format!(
            "expected allocation request, received {}",
            inbound.command
        )));
    }

    decode_request(&inbound.payload)
        .ok_or_else(|| Error::Handshake("malformed request payload".into()))
}

/// Producer side, second half: reserves the ring, registers it, and grants
/// its handle.
///
/// A zero-size request is a configuration fault: no grant is sent and the
/// handshake fails (the consumer then fails by bounded timeout). The
/// requested size must also decode to exactly `expected_capacity` slots;
/// capacity is a configuration constant on both sides, not negotiated.
pub fn grant_allocation<M: Mailbox>(
    channel: &SecureChannel<M>,
    registry: &BufferRegistry,
    byte_size: u16,
    expected_capacity: usize,
) -> Result<Arc<SampleRing>> {
    if byte_size == 0 {
        return Err(Error::Handshake(
            "zero-size allocation request; nothing granted".into(),
        ));
    }

    let ring = SampleRing::from_byte_size(usize::from(byte_size)).ok_or_else(|| {
        Error::Handshake(format!("requested size {byte_size} is not a whole number of slots"))
    })?;

    if ring.capacity() != expected_capacity {
        return Err(Error::Handshake(format!(
            "requested capacity {} does not match configured capacity {expected_capacity}",
            ring.capacity()
        )));
    }

    let ring = Arc::new(ring);
    let handle = registry.register(Arc::clone(&ring));
    tracing::debug!(%handle, byte_size, "ring reserved, granting");

    channel.send(Command::AllocationGranted, &handle.encode())?;
    Ok(ring)
}

/// Producer side, both halves in one call.
pub fn serve_allocation<M: Mailbox>(
    channel: &SecureChannel<M>,
    registry: &BufferRegistry,
    expected_capacity: usize,
) -> Result<Arc<SampleRing>> {
    let byte_size = await_request(channel)?;
    grant_allocation(channel, registry, byte_size, expected_capacity)
}
