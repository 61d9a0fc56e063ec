//! # Error Taxonomy
//!
//! Every failure a session or an agent can observe maps to one [`WarError`]
//! kind. None of them is retried: the protocol has no resend semantics, so the
//! first error ends that one game.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the codec, the connection wrapper, sessions and agents.
#[derive(Debug, Error)]
pub enum WarError {
    /// A frame carried an unexpected tag or a malformed payload for the
    /// current protocol phase.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The peer closed the stream before a complete frame arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    /// A read or connect did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// OS-level read, write, accept or connect failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WarError {
    pub(crate) fn violation(reason: impl Into<String>) -> Self {
        WarError::ProtocolViolation(reason.into())
    }

    /// Short, stable label used to group failures in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WarError::ProtocolViolation(_) => "protocol_violation",
            WarError::ConnectionClosed { .. } => "connection_closed",
            WarError::Timeout(_) => "timeout",
            WarError::Io(_) => "io",
        }
    }
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, WarError>;
