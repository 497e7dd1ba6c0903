//! Error types for the value codec.

/// Error produced when encoding a [`crate::Value`] to text.
///
/// Encoding is total for every finite tree; the only rejected input is a
/// float with no textual representation.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The tree contains a NaN or infinite float.
    #[error("value contains a non-finite float ({0}) which has no encoding")]
    NonFiniteFloat(f64),

    /// Serialization failed below the codec.
    #[error("failed to encode value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error produced when decoding persisted text back into a [`crate::Value`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input is not a valid encoding (malformed or truncated text).
    #[error("malformed value encoding: {0}")]
    Malformed(#[from] serde_json::Error),
}
