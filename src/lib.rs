//! Ringlink: a digest-authenticated two-task sensor pipeline.
//!
//! # Overview
//!
//! Two independently scheduled tasks share one fixed-capacity ring buffer.
//! The producer samples a sensor and writes batches into the ring; the
//! consumer reads each announced batch and displays it. The tasks never
//! share the buffer statically: the producer reserves it at startup and
//! hands the consumer an opaque handle over the message channel, and every
//! inter-task message carries a 32-byte digest over
//! `(sender identity ‖ payload)` so corruption or spoofing is detected
//! before a payload is trusted.
//!
//! # Protocol
//!
//! ```text
//!  Consumer                                   Producer
//!     │  RequestAllocation(size, LE u16)         │
//!     ├──────────────────────────────────────────▶  reserve ring,
//!     │         AllocationGranted(handle, LE u32) │  register handle
//!     ◀──────────────────────────────────────────┤
//!     │  (settle delay)                           │  sample batch,
//!     │               DataReady(start index, u8)  │  write ring[tail..]
//!     ◀──────────────────────────────────────────┤
//!     │  read ring[start .. start+batch), emit    │  ...forever
//! ```
//!
//! # Core Guarantees
//!
//! - **Tamper-evident messaging**: every non-sentinel frame is verified
//!   against the expected sender identity before its payload is released.
//! - **Bounded blocking**: every channel operation has a timeout; no
//!   steady-state loop blocks unboundedly, so liveness survives message
//!   loss.
//! - **Tear-free lock-free sharing**: ring slots are single atomic cells
//!   and the producer publishes a cursor after every write; the explicit
//!   capacity margin (`capacity >= 2 × batch`) keeps displayed batches
//!   away from the overwrite front.
//! - **Accepted data loss**: a lagging consumer is lapped, never blocked
//!   on. Unread samples are silently overwritten by design.
//!
//! # Module Structure
//!
//! - [`security`]: identity tags, message digests
//! - [`mailbox`]: bounded transport collaborator (trait + in-process impl)
//! - [`channel`]: digest framing over the mailbox
//! - [`handshake`]: one-shot buffer negotiation
//! - [`ring`]: modulo index, atomic sample ring, handle registry
//! - [`producer`] / [`consumer`]: the two task state machines
//! - [`pipeline`]: context, shutdown signal, thread wiring
//! - [`sensor`] / [`sink`]: hardware and display seams
//! - [`config`] / [`error`] / [`types`]: ambient surface
//!
//! # Example
//!
//! ```
//! use ringlink::{PipelineConfig, sensor::SyntheticSensor, sink::MemorySink};
//! use std::time::Duration;
//!
//! let config = PipelineConfig {
//!     channel_timeout: Duration::from_millis(100),
//!     settle_delay: Duration::from_millis(10),
//!     sample_period: Duration::ZERO,
//!     ..PipelineConfig::default()
//! };
//!
//! let sink = MemorySink::new();
//! let handle = ringlink::spawn(config, SyntheticSensor::new(21), sink.clone()).unwrap();
//!
//! // Give the pipeline a moment to display its first batch.
//! for _ in 0..1000 {
//!     if !sink.is_empty() {
//!         break;
//!     }
//!     std::thread::sleep(Duration::from_millis(5));
//! }
//!
//! handle.shutdown_and_join().unwrap();
//! assert!(sink.len() >= 10);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod consumer;
pub mod error;
pub mod handshake;
pub mod mailbox;
pub mod pipeline;
pub mod producer;
pub mod ring;
pub mod security;
pub mod sensor;
pub mod sink;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{PipelineContext, PipelineHandle, ShutdownSignal, spawn};
pub use types::{Observation, Sample};
