//! # Detection Error Types
//!
//! Host-collaborator failures are non-fatal by design: the event layer skips
//! the affected heuristic update and the next tick self-corrects. Nothing in
//! this crate panics on a failed world query or a dropped message.

use thiserror::Error;
use vigil_shared::{BlockPos, PlayerId};

/// Failures reported by the host environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The world could not answer a block query (chunk not loaded, shutdown).
    #[error("world query failed at {0:?}")]
    WorldUnavailable(BlockPos),

    /// A message could not be delivered to a player.
    #[error("message delivery to {0} failed")]
    SendFailed(PlayerId),

    /// The host refused to spawn an actor.
    #[error("actor spawn rejected by host")]
    SpawnRejected,
}

/// Result type for host-facing operations.
pub type HostResult<T> = Result<T, HostError>;

/// Invalid configuration detected at load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its meaningful range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;
