//! Bounded mailbox collaborator.
//!
//! The mailbox is the external message transport between the two tasks. It
//! is assumed to provide blocking send/receive with a timeout, exactly-once
//! delivery per call, FIFO ordering per direction, and a small-integer
//! command code carried natively alongside the frame bytes.
//!
//! The [`Mailbox`] trait is the seam; [`duplex`] builds the in-process
//! implementation from a pair of bounded channels, one per direction.

use core::fmt;
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded};
use std::time::Duration;

/// Maximum transmitted frame length in bytes (digest plus payload).
pub const MAX_FRAME_LEN: usize = 64;

/// Command code carried as mailbox metadata, distinct from the frame bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// No-op sentinel; the payload is not authenticated (bootstrapping).
    Nop = 0,
    /// Consumer → producer: reserve the shared sample buffer.
    RequestAllocation = 1,
    /// Producer → consumer: buffer reserved, payload carries its handle.
    AllocationGranted = 2,
    /// Producer → consumer: a batch is ready at the carried start index.
    DataReady = 3,
}

impl Command {
    /// Returns the wire code for this command.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a wire code, if it names a known command.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Nop),
            1 => Some(Self::RequestAllocation),
            2 => Some(Self::AllocationGranted),
            3 => Some(Self::DataReady),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => write!(f, "nop"),
            Self::RequestAllocation => write!(f, "request-allocation"),
            Self::AllocationGranted => write!(f, "allocation-granted"),
            Self::DataReady => write!(f, "data-ready"),
        }
    }
}

/// A framed mailbox message: command code plus raw frame bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailFrame {
    /// Wire command code (mailbox metadata, managed natively by the channel).
    pub info: u8,
    /// Frame bytes (digest followed by payload).
    pub bytes: Vec<u8>,
}

/// Error from a mailbox operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    /// The bounded wait elapsed with nothing sent or received.
    Timeout,
    /// The peer endpoint no longer exists.
    Disconnected,
}

impl fmt::Display for MailboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "mailbox operation timed out"),
            Self::Disconnected => write!(f, "mailbox peer disconnected"),
        }
    }
}

impl std::error::Error for MailboxError {}

/// Bounded, FIFO-per-direction message transport between the two tasks.
///
/// Implementations must deliver each frame exactly once per receive call
/// and preserve send order within a direction. Cross-direction ordering is
/// unconstrained.
pub trait Mailbox: Send {
    /// Sends a frame, waiting at most `timeout` for queue space.
    fn send(&self, frame: MailFrame, timeout: Duration) -> Result<(), MailboxError>;

    /// Receives the next frame, waiting at most `timeout` for one to arrive.
    fn receive(&self, timeout: Duration) -> Result<MailFrame, MailboxError>;
}

impl<M: Mailbox + Sync> Mailbox for &M {
    fn send(&self, frame: MailFrame, timeout: Duration) -> Result<(), MailboxError> {
        (**self).send(frame, timeout)
    }

    fn receive(&self, timeout: Duration) -> Result<MailFrame, MailboxError> {
        (**self).receive(timeout)
    }
}

/// One end of an in-process duplex mailbox.
pub struct MailboxEndpoint {
    tx: Sender<MailFrame>,
    rx: Receiver<MailFrame>,
}

impl Mailbox for MailboxEndpoint {
    fn send(&self, frame: MailFrame, timeout: Duration) -> Result<(), MailboxError> {
        self.tx.send_timeout(frame, timeout).map_err(|err| match err {
            SendTimeoutError::Timeout(_) => MailboxError::Timeout,
            SendTimeoutError::Disconnected(_) => MailboxError::Disconnected,
        })
    }

    fn receive(&self, timeout: Duration) -> Result<MailFrame, MailboxError> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => MailboxError::Timeout,
            RecvTimeoutError::Disconnected => MailboxError::Disconnected,
        })
    }
}

impl fmt::Debug for MailboxEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxEndpoint")
            .field("queued", &self.rx.len())
            .finish()
    }
}

/// Creates a connected pair of endpoints with `depth` slots per direction.
#[must_use]
pub fn duplex(depth: usize) -> (MailboxEndpoint, MailboxEndpoint) {
    let (left_tx, right_rx) = bounded(depth);
    let (right_tx, left_rx) = bounded(depth);
    (
        MailboxEndpoint {
            tx: left_tx,
            rx: left_rx,
        },
        MailboxEndpoint {
            tx: right_tx,
            rx: right_rx,
        },
    )
}
