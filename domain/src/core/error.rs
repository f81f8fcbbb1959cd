//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Command sequence must contain at least one token")]
    EmptyCommandSequence,

    #[error("Invalid command token: {0:?}")]
    InvalidCommandToken(String),

    #[error("Invalid fingerprint: {0:?} (expected 8 hex digits)")]
    InvalidFingerprint(String),

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unknown decode error policy: {0} (expected strict, ignore or replace)")]
    UnknownErrorPolicy(String),

    #[error("Output is not valid {encoding} at byte {offset}")]
    Decode { encoding: String, offset: usize },
}

impl DomainError {
    /// Check if this error came from decoding captured output
    pub fn is_decode(&self) -> bool {
        matches!(self, DomainError::Decode { .. })
    }
}
