//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors produced while reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but its value does not parse.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}
