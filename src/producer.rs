//! Producer task.
//!
//! Serves the allocation handshake, then streams forever: sample the
//! sensor one batch at a time into the ring, announce each batch with a
//! `DataReady` notification carrying the batch's starting index, repeat.
//!
//! There is no backpressure. A notification that cannot be delivered is
//! logged and the batch is lost to the consumer; the ring keeps wrapping
//! regardless. The shutdown signal is polled once per batch.

use crate::channel::{ChannelError, SecureChannel};
use crate::error::Result;
use crate::handshake;
use crate::mailbox::{Command, Mailbox};
use crate::pipeline::PipelineContext;
use crate::ring::RingIndex;
use crate::sensor::Sensor;
use core::fmt;
use std::sync::Arc;
use std::thread;

/// Producer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    /// Blocked on the consumer's allocation request.
    AwaitingAllocationRequest,
    /// Reserving and granting the ring.
    Allocating,
    /// Steady state: sampling and announcing batches.
    Streaming,
}

impl fmt::Display for ProducerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingAllocationRequest => write!(f, "awaiting-allocation-request"),
            Self::Allocating => write!(f, "allocating"),
            Self::Streaming => write!(f, "streaming"),
        }
    }
}

/// The sampling half of the pipeline.
pub struct ProducerTask<M, S> {
    channel: SecureChannel<M>,
    sensor: S,
    ctx: Arc<PipelineContext>,
    state: ProducerState,
}

impl<M: Mailbox, S: Sensor> ProducerTask<M, S> {
    /// Creates the task; nothing runs until [`run`](Self::run).
    #[must_use]
    pub const fn new(channel: SecureChannel<M>, sensor: S, ctx: Arc<PipelineContext>) -> Self {
        Self {
            channel,
            sensor,
            ctx,
            state: ProducerState::AwaitingAllocationRequest,
        }
    }

    /// Runs until shutdown is raised or the consumer goes away.
    ///
    /// The first action is receiving the allocation request; the handshake
    /// failing is a startup error and ends the task.
    pub fn run(mut self) -> Result<()> {
        let config = self.ctx.config().clone();

        tracing::debug!(state = %self.state, "producer starting");
        let byte_size = handshake::await_request(&self.channel)?;

        self.state = ProducerState::Allocating;
        tracing::debug!(state = %self.state, byte_size, "allocation request received");
        let ring = handshake::grant_allocation(
            &self.channel,
            self.ctx.registry(),
            byte_size,
            config.capacity,
        )?;

        self.state = ProducerState::Streaming;
        tracing::debug!(state = %self.state, capacity = ring.capacity(), "producer streaming");

        let mut tail = RingIndex::new(config.capacity);
        let mut head = tail;

        while !self.ctx.shutdown().is_raised() {
            for _ in 0..config.batch_size {
                let sample = self.sensor.sample().calibrated(config.calibration);
                ring.write(tail.get(), sample);
                tail.advance();

                if !config.sample_period.is_zero() {
                    thread::sleep(config.sample_period);
                }
            }

            let start = head.get() as u8;
            match self.channel.send(Command::DataReady, &[start]) {
                Ok(()) => {
                    tracing::trace!(start, lag = ring.lag(), "batch announced");
                }
                Err(ChannelError::Disconnected) => {
                    tracing::debug!("consumer gone, producer stopping");
                    break;
                }
                Err(err) if err.is_recoverable() => {
                    // The batch stays in the ring but the consumer will
                    // never hear about it; accepted data loss.
                    tracing::warn!(start, error = %err, "data-ready notification dropped");
                }
                Err(err) => return Err(err.into()),
            }

            head = tail;
        }

        tracing::debug!("producer exited");
        Ok(())
    }
}

impl<M, S> fmt::Debug for ProducerTask<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerTask")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::SecureChannel;
    use crate::config::PipelineConfig;
    use crate::mailbox::duplex;
    use crate::security::SenderId;
    use crate::sensor::SyntheticSensor;
    use std::time::Duration;

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            channel_timeout: Duration::from_millis(100),
            settle_delay: Duration::ZERO,
            sample_period: Duration::ZERO,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn handshake_timeout_ends_the_task() {
        let ctx = Arc::new(PipelineContext::new(fast_config()).unwrap());
        let (producer_end, _consumer_end) = duplex(4);
        let channel = SecureChannel::new(
            producer_end,
            SenderId::PRODUCER,
            SenderId::CONSUMER,
            Duration::from_millis(50),
        );

        let task = ProducerTask::new(channel, SyntheticSensor::new(20), ctx);
        let err = task.run().unwrap_err();
        assert!(err.to_string().contains("request never arrived"));
    }

    #[test]
    fn streams_batches_after_the_handshake() {
        let ctx = Arc::new(PipelineContext::new(fast_config()).unwrap());
        let (producer_end, consumer_end) = duplex(8);
        let timeout = Duration::from_millis(200);
        let producer_channel =
            SecureChannel::new(producer_end, SenderId::PRODUCER, SenderId::CONSUMER, timeout);
        let consumer_channel =
            SecureChannel::new(consumer_end, SenderId::CONSUMER, SenderId::PRODUCER, timeout);

        let task_ctx = Arc::clone(&ctx);
        let producer = std::thread::spawn(move || {
            ProducerTask::new(producer_channel, SyntheticSensor::new(20), task_ctx).run()
        });

        let ring =
            crate::handshake::request_buffer(&consumer_channel, 1024, ctx.registry()).unwrap();

        // First notification names the start of the first batch.
        let inbound = consumer_channel.receive(1).unwrap();
        assert_eq!(inbound.command, Command::DataReady);
        assert_eq!(inbound.payload, vec![0]);

        // Second batch starts right after the first.
        let inbound = consumer_channel.receive(1).unwrap();
        assert_eq!(inbound.payload, vec![10]);
        assert!(ring.published() >= 20);

        ctx.shutdown().raise();
        // Drain so the producer is never parked on a full queue.
        while consumer_channel.receive(1).is_ok() {}
        producer.join().unwrap().unwrap();
    }
}
