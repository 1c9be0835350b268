//! Crate-level error type.

use crate::channel::ChannelError;
use crate::config::ConfigError;
use thiserror::Error;

/// Unified pipeline error.
///
/// Steady-state loops never surface these for recoverable conditions
/// (timeouts, rejected frames); those are logged and the loop continues.
/// An `Error` reaching a task's return value means startup failed or the
/// task cannot meaningfully continue.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid pipeline configuration.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// A channel operation failed unrecoverably.
    #[error("channel: {0}")]
    Channel(#[from] ChannelError),

    /// The startup handshake failed.
    #[error("handshake: {0}")]
    Handshake(String),

    /// A task thread could not be spawned.
    #[error("spawn: {0}")]
    Spawn(#[from] std::io::Error),

    /// A task thread panicked before it could report a result.
    #[error("join: {0}")]
    Join(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
