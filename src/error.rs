//! Error types for the encoding engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding pages or advancing sessions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid setup value (alphabet, parent, browser, host URL)
    #[error("configuration error: {0}")]
    Config(String),

    /// Requested step is beyond the session's step map
    #[error("step {step} out of range: step map holds {max} steps")]
    StepOutOfRange {
        /// The step (or `idx_max`) that was requested
        step: usize,
        /// Number of steps the map actually holds
        max: usize,
    },

    /// Observation step does not match the session's current step
    #[error("step mismatch: observed {observed}, session at {expected}")]
    StepMismatch {
        /// Step carried by the observation
        observed: usize,
        /// Step the session is currently at
        expected: usize,
    },

    /// Observed character index addresses no alphabet slot
    #[error("character index {index} out of range for alphabet of {alphabet_size}")]
    IndexOutOfRange {
        /// The index that was observed
        index: usize,
        /// Size of the candidate alphabet (the sentinel slot sits at this value)
        alphabet_size: usize,
    },

    /// No session with the given id
    #[error("unknown session {0}")]
    SessionNotFound(String),

    /// Session already reached a terminal state
    #[error("session {0} is already complete")]
    SessionComplete(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Check if the offending observation can be dropped with the session
    /// left intact.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::StepMismatch { .. } | Error::IndexOutOfRange { .. }
        )
    }

    /// Check if this error means the session has no more steps to issue.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::StepOutOfRange { .. })
    }
}
