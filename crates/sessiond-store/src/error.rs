//! Error types for session store operations.

use sessiond_types::{DecodeError, EncodeError};

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Session identity creation failed (entropy source unavailable).
    /// Fatal to the create operation; never retried with degraded
    /// randomness.
    #[error("failed to generate session id: {0}")]
    Generation(String),

    /// Any failure communicating with or decoding from the external
    /// engine: connection failure, protocol error, malformed stored
    /// payload.
    #[error("backend error: {0}")]
    Backend(String),

    /// The session does not exist. Only returned for field writes under
    /// [`crate::CreatePolicy::Reject`]; reads of absent sessions return an
    /// empty field set instead.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The field key is empty or reserved for internal bookkeeping.
    #[error("invalid field key: {0:?}")]
    InvalidKey(String),
}

// Codec failures surface as backend errors: the store cannot distinguish
// storage corruption from transport corruption.
impl From<DecodeError> for StoreError {
    fn from(e: DecodeError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<EncodeError> for StoreError {
    fn from(e: EncodeError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
