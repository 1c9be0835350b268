//! Shared ring buffer: modulo index, atomic sample slots, handle registry.
//!
//! The ring is written by the producer and read by the consumer with no
//! lock; coordination happens through the notification payload (which
//! carries a batch's start index) plus the ring's published cursor. See
//! [`buffer::SampleRing`] for the memory model and the accepted
//! overwrite-on-lap policy.

pub mod buffer;
pub mod index;
pub mod registry;

pub use buffer::SampleRing;
pub use index::RingIndex;
pub use registry::{BufferHandle, BufferRegistry};
