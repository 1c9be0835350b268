//! Secure channel: digest framing over the bounded mailbox.
//!
//! On send, the channel computes the digest over the local identity plus
//! the payload and transmits `digest ‖ payload` with the command code as
//! mailbox metadata. On receive it checks the frame length against the
//! size expected for that protocol step, splits off the digest, and
//! verifies it against the peer identity before the payload is released to
//! the caller.
//!
//! Failures are graded: a timeout or a rejected frame means "no new data"
//! and the caller's loop continues; only a vanished peer ends the
//! conversation.

use crate::mailbox::{Command, MAX_FRAME_LEN, MailFrame, Mailbox, MailboxError};
use crate::security::{DIGEST_LEN, MessageDigest, SenderId};
use core::fmt;
use std::time::Duration;

/// Maximum payload length in bytes (frame minus digest).
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - DIGEST_LEN;

/// Error from a secure channel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The bounded wait elapsed with nothing sent or received.
    Timeout,
    /// The peer endpoint no longer exists.
    Disconnected,
    /// The payload exceeds [`MAX_PAYLOAD_LEN`].
    PayloadTooLarge {
        /// Offending payload length.
        len: usize,
    },
    /// The received frame length does not match the expected size.
    FrameMismatch {
        /// Expected total frame length.
        expected: usize,
        /// Actual received frame length.
        actual: usize,
    },
    /// The received command code names no known command.
    UnknownCommand {
        /// Offending wire code.
        code: u8,
    },
    /// Digest verification failed; the payload was discarded.
    Integrity,
}

impl ChannelError {
    /// Returns `true` if the caller should treat this as "no new data" and
    /// keep looping, rather than tear anything down.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::FrameMismatch { .. } | Self::UnknownCommand { .. } | Self::Integrity
        )
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "channel operation timed out"),
            Self::Disconnected => write!(f, "channel peer disconnected"),
            Self::PayloadTooLarge { len } => {
                write!(f, "payload of {len} bytes exceeds {MAX_PAYLOAD_LEN}")
            }
            Self::FrameMismatch { expected, actual } => {
                write!(f, "expected a {expected}-byte frame, received {actual}")
            }
            Self::UnknownCommand { code } => write!(f, "unknown command code {code}"),
            Self::Integrity => write!(f, "data invalid: digest verification failed"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<MailboxError> for ChannelError {
    fn from(err: MailboxError) -> Self {
        match err {
            MailboxError::Timeout => Self::Timeout,
            MailboxError::Disconnected => Self::Disconnected,
        }
    }
}

/// An authenticated message released to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// The command the frame arrived under.
    pub command: Command,
    /// The verified payload ([`Command::Nop`] payloads are unverified).
    pub payload: Vec<u8>,
}

/// Digest-authenticated wrapper around one mailbox endpoint.
///
/// Each side constructs its channel with its own identity and the identity
/// it expects frames from; the two are never negotiated at runtime.
pub struct SecureChannel<M> {
    mailbox: M,
    local: SenderId,
    peer: SenderId,
    timeout: Duration,
}

impl<M: Mailbox> SecureChannel<M> {
    /// Wraps `mailbox` with digest framing.
    #[must_use]
    pub const fn new(mailbox: M, local: SenderId, peer: SenderId, timeout: Duration) -> Self {
        Self {
            mailbox,
            local,
            peer,
            timeout,
        }
    }

    /// Sends `payload` under `command`, prefixed with its digest.
    ///
    /// Blocking beyond the channel's bounded wait is a timeout failure,
    /// reported to the caller and not retried internally.
    pub fn send(&self, command: Command, payload: &[u8]) -> Result<(), ChannelError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ChannelError::PayloadTooLarge {
                len: payload.len(),
            });
        }

        let digest = MessageDigest::compute(self.local, payload);
        let mut bytes = Vec::with_capacity(DIGEST_LEN + payload.len());
        bytes.extend_from_slice(digest.as_bytes());
        bytes.extend_from_slice(payload);

        tracing::trace!(command = %command, len = payload.len(), "sending frame");
        self.mailbox
            .send(
                MailFrame {
                    info: command.code(),
                    bytes,
                },
                self.timeout,
            )
            .map_err(ChannelError::from)
    }

    /// Receives a frame whose payload is exactly `expected_len` bytes.
    ///
    /// [`Command::Nop`] frames are returned as-is without verification
    /// (protocol bootstrapping sentinel). For every other command the
    /// digest must verify against the peer identity; on mismatch the
    /// payload is discarded and [`ChannelError::Integrity`] is returned;
    /// the caller must treat this as "no new data", not a crash.
    pub fn receive(&self, expected_len: usize) -> Result<Inbound, ChannelError> {
        let frame = self.mailbox.receive(self.timeout)?;

        let expected = DIGEST_LEN + expected_len;
        if frame.bytes.len() != expected {
            tracing::warn!(
                expected,
                actual = frame.bytes.len(),
                "discarding frame of unexpected size"
            );
            return Err(ChannelError::FrameMismatch {
                expected,
                actual: frame.bytes.len(),
            });
        }

        let Some(command) = Command::from_code(frame.info) else {
            tracing::warn!(code = frame.info, "discarding frame with unknown command");
            return Err(ChannelError::UnknownCommand { code: frame.info });
        };

        let (digest_bytes, payload) = frame.bytes.split_at(DIGEST_LEN);

        if command == Command::Nop {
            return Ok(Inbound {
                command,
                payload: payload.to_vec(),
            });
        }

        // The digest slice is exactly DIGEST_LEN, so this cannot fail; the
        // TryFrom path keeps the malformed-digest error for other callers.
        let digest =
            MessageDigest::try_from(digest_bytes).map_err(|_| ChannelError::Integrity)?;
        if let Err(err) = digest.authenticate(self.peer, payload) {
            tracing::warn!(command = %command, error = %err, "data invalid, discarding frame");
            return Err(ChannelError::Integrity);
        }

        Ok(Inbound {
            command,
            payload: payload.to_vec(),
        })
    }
}

impl<M> fmt::Debug for SecureChannel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureChannel")
            .field("local", &self.local)
            .field("peer", &self.peer)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
