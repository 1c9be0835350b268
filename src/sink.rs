//! Observation sink seam.
//!
//! The consumer emits every displayed reading through this trait. The
//! tracing sink is the production display surface; the memory sink exists
//! so tests and the demo binary can inspect what was displayed.

use crate::types::Observation;
use parking_lot::Mutex;
use std::sync::Arc;

/// Receives displayed readings from the consumer task.
pub trait ObservationSink: Send {
    /// Emits one displayed reading.
    fn observe(&mut self, observation: Observation);
}

/// Logs each observation at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ObservationSink for TracingSink {
    fn observe(&mut self, observation: Observation) {
        tracing::info!(
            index = observation.slot,
            value = %observation.sample,
            "observation"
        );
    }
}

/// Collects observations in memory behind a shared handle.
///
/// Clones share the same store, so a test can keep one handle while the
/// consumer task owns another.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    store: Arc<Mutex<Vec<Observation>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observations collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns `true` if nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Copies out everything observed so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Observation> {
        self.store.lock().clone()
    }
}

impl ObservationSink for MemorySink {
    fn observe(&mut self, observation: Observation) {
        self.store.lock().push(observation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    #[test]
    fn memory_sink_clones_share_a_store() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.observe(Observation {
            slot: 3,
            sample: Sample::new(21, 0),
        });

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.snapshot()[0].slot, 3);
    }
}
