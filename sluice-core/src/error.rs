//! Error types for sluice

use crate::types::{BlockId, GeneratorState};
use thiserror::Error;

/// Result type alias for sluice operations
pub type Result<T> = std::result::Result<T, SluiceError>;

/// Sluice error types
#[derive(Error, Debug)]
pub enum SluiceError {
    /// Lifecycle operation invoked from the wrong state
    #[error("illegal state for {operation}: expected {expected:?}, generator is {actual:?}")]
    IllegalState {
        operation: &'static str,
        expected: GeneratorState,
        actual: GeneratorState,
    },

    /// Data offered after the generator stopped accepting it
    #[error("cannot add data, generator is {0:?}")]
    DataRejected(GeneratorState),

    /// The push thread is gone and the hand-off queue is disconnected
    #[error("block queue disconnected, dropping block {0}")]
    QueueDisconnected(BlockId),

    /// A listener callback reported a failure
    #[error("listener error: {0}")]
    Listener(String),

    /// Invalid construction parameters
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl SluiceError {
    /// Check if the error is an admission rejection (expected once a stop
    /// has begun, as opposed to a caller bug)
    pub fn is_rejection(&self) -> bool {
        matches!(self, SluiceError::DataRejected(_))
    }

    /// Check if the error indicates a dead background thread
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SluiceError::QueueDisconnected(_) | SluiceError::Listener(_)
        )
    }
}
