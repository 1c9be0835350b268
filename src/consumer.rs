//! Consumer task.
//!
//! Drives the allocation handshake, settles, then loops: block on a
//! `DataReady` notification, read one batch of slots starting at the
//! carried index, emit each reading through the observation sink, go back
//! to idle.
//!
//! The read range is derived purely from the last received start index;
//! the consumer keeps no cursor of its own across notifications. A failed
//! verification or a timeout means "no new batch"; the loop continues and
//! the displayed state does not advance.

use crate::channel::{ChannelError, SecureChannel};
use crate::error::Result;
use crate::handshake;
use crate::mailbox::{Command, Mailbox};
use crate::pipeline::PipelineContext;
use crate::ring::RingIndex;
use crate::sink::ObservationSink;
use crate::types::Observation;
use core::fmt;
use std::sync::Arc;
use std::thread;

/// Consumer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Driving the allocation handshake.
    Handshaking,
    /// Waiting out the settle delay before the first receive.
    Settling,
    /// Blocked on the next notification.
    Idle,
    /// Reading and emitting one batch.
    Displaying,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshaking => write!(f, "handshaking"),
            Self::Settling => write!(f, "settling"),
            Self::Idle => write!(f, "idle"),
            Self::Displaying => write!(f, "displaying"),
        }
    }
}

/// The displaying half of the pipeline.
pub struct ConsumerTask<M, K> {
    channel: SecureChannel<M>,
    sink: K,
    ctx: Arc<PipelineContext>,
    state: ConsumerState,
}

impl<M: Mailbox, K: ObservationSink> ConsumerTask<M, K> {
    /// Creates the task; nothing runs until [`run`](Self::run).
    #[must_use]
    pub const fn new(channel: SecureChannel<M>, sink: K, ctx: Arc<PipelineContext>) -> Self {
        Self {
            channel,
            sink,
            ctx,
            state: ConsumerState::Handshaking,
        }
    }

    /// Runs until shutdown is raised or the producer goes away.
    pub fn run(mut self) -> Result<()> {
        let config = self.ctx.config().clone();

        tracing::debug!(state = %self.state, "consumer starting");
        let ring = handshake::request_buffer(
            &self.channel,
            config.request_bytes(),
            self.ctx.registry(),
        )?;

        self.state = ConsumerState::Settling;
        tracing::debug!(state = %self.state, "handshake complete");
        if !config.settle_delay.is_zero() {
            thread::sleep(config.settle_delay);
        }

        loop {
            self.state = ConsumerState::Idle;
            if self.ctx.shutdown().is_raised() {
                break;
            }

            let inbound = match self.channel.receive(1) {
                Ok(inbound) => inbound,
                Err(ChannelError::Timeout) => {
                    tracing::trace!("no notification within the bound");
                    continue;
                }
                Err(ChannelError::Disconnected) => {
                    tracing::debug!("producer gone, consumer stopping");
                    break;
                }
                Err(err) if err.is_recoverable() => {
                    // Rejected frame; already logged by the channel.
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if inbound.command != Command::DataReady {
                tracing::warn!(command = %inbound.command, "unexpected command, ignoring");
                continue;
            }
            let Some(&start) = inbound.payload.first() else {
                continue;
            };

            self.state = ConsumerState::Displaying;
            let head = RingIndex::at(usize::from(start), config.capacity);
            for i in 0..config.batch_size {
                let slot = head.offset(i);
                let sample = ring.read(slot);
                self.sink.observe(Observation { slot, sample });
            }
            ring.mark_consumed(config.batch_size as u64);
            tracing::trace!(start, lag = ring.lag(), "batch displayed");
        }

        tracing::debug!("consumer exited");
        Ok(())
    }
}

impl<M, K> fmt::Debug for ConsumerTask<M, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerTask")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
