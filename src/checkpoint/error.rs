//! Checkpoint error types.

use thiserror::Error;

/// Errors raised while encoding, decoding or restoring a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint could not be encoded: {0}")]
    SerializationFailed(String),

    #[error("Checkpoint could not be decoded: {0}")]
    DeserializationFailed(String),

    #[error("Checkpoint format version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The checkpoint does not fit the machine it is restored into. The
    /// machine is left untouched.
    #[error("Checkpoint rejected: {0}")]
    ValidationFailed(String),
}
