//! Process context and task wiring.
//!
//! Everything the two tasks share (configuration, the buffer registry and
//! the shutdown signal) lives in one [`PipelineContext`], created once at
//! startup and passed explicitly to both tasks. There is no module-level
//! state: dropping the context drops the registry and every ring in it.

use crate::channel::SecureChannel;
use crate::config::PipelineConfig;
use crate::consumer::ConsumerTask;
use crate::error::{Error, Result};
use crate::mailbox::duplex;
use crate::producer::ProducerTask;
use crate::ring::BufferRegistry;
use crate::security::SenderId;
use crate::sensor::Sensor;
use crate::sink::ObservationSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Cooperative shutdown flag, polled by both tasks at loop boundaries.
///
/// The steady-state loops are designed to run forever; this signal exists
/// so a test suite (or the demo binary) can terminate both tasks
/// deterministically.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    raised: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Creates a signal in the not-raised state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

/// Shared state for one pipeline instance.
#[derive(Debug)]
pub struct PipelineContext {
    config: PipelineConfig,
    registry: BufferRegistry,
    shutdown: ShutdownSignal,
}

impl PipelineContext {
    /// Validates `config` and builds the context around it.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: BufferRegistry::new(),
            shutdown: ShutdownSignal::new(),
        })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The buffer registry both tasks resolve handles through.
    #[must_use]
    pub const fn registry(&self) -> &BufferRegistry {
        &self.registry
    }

    /// The shutdown signal both tasks poll.
    #[must_use]
    pub const fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    ctx: Arc<PipelineContext>,
    producer: JoinHandle<Result<()>>,
    consumer: JoinHandle<Result<()>>,
}

impl PipelineHandle {
    /// The shared context, for inspecting the registry or configuration.
    #[must_use]
    pub fn context(&self) -> &Arc<PipelineContext> {
        &self.ctx
    }

    /// Requests shutdown; both tasks exit at their next loop boundary.
    pub fn shutdown(&self) {
        self.ctx.shutdown().raise();
    }

    /// Waits for both tasks, reporting the producer's failure first.
    pub fn join(self) -> Result<()> {
        let producer = self
            .producer
            .join()
            .map_err(|_| Error::Join("producer task panicked".into()))?;
        let consumer = self
            .consumer
            .join()
            .map_err(|_| Error::Join("consumer task panicked".into()))?;
        producer.and(consumer)
    }

    /// Convenience: [`shutdown`](Self::shutdown) then [`join`](Self::join).
    pub fn shutdown_and_join(self) -> Result<()> {
        self.shutdown();
        self.join()
    }
}

/// Spawns the producer and consumer threads around a fresh context.
///
/// The consumer drives the handshake; the producer's first action is
/// receiving the allocation request. Returns once both threads are
/// running.
pub fn spawn<S, K>(config: PipelineConfig, sensor: S, sink: K) -> Result<PipelineHandle>
where
    S: Sensor + 'static,
    K: ObservationSink + 'static,
{
    let ctx = Arc::new(PipelineContext::new(config)?);
    let timeout = ctx.config().channel_timeout;
    let (producer_end, consumer_end) = duplex(ctx.config().mailbox_depth);

    let producer_channel =
        SecureChannel::new(producer_end, SenderId::PRODUCER, SenderId::CONSUMER, timeout);
    let consumer_channel =
        SecureChannel::new(consumer_end, SenderId::CONSUMER, SenderId::PRODUCER, timeout);

    let producer_task = ProducerTask::new(producer_channel, sensor, Arc::clone(&ctx));
    let consumer_task = ConsumerTask::new(consumer_channel, sink, Arc::clone(&ctx));

    let producer = thread::Builder::new()
        .name("ringlink-producer".into())
        .spawn(move || producer_task.run())?;

    let consumer = match thread::Builder::new()
        .name("ringlink-consumer".into())
        .spawn(move || consumer_task.run())
    {
        Ok(handle) => handle,
        Err(err) => {
            // The producer is parked in its bounded handshake receive; it
            // exits on its own once the wait elapses.
            ctx.shutdown().raise();
            let _ = producer.join();
            return Err(Error::Spawn(err));
        }
    };

    Ok(PipelineHandle {
        ctx,
        producer,
        consumer,
    })
}
