//! Core error types and traits for modgate

use thiserror::Error;

/// Result type alias for modgate operations
pub type GateResult<T> = Result<T, GateError>;

/// Unified error trait implemented by [`GateError`].
///
/// Gives hosts a stable code to branch on without matching variants:
/// - error_code(): Unique code for programmatic error identification
/// - message(): Human-readable error message
/// - context(): Optional additional context
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<String> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Main error type for modgate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The permissions stream does not match the selected schema.
    /// The store keeps its previous contents when this is returned.
    #[error("Malformed permissions config: {message}")]
    MalformedConfig {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// Gate settings could not be read or are invalid
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// IO errors while reading a permissions or settings file
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// A decision could not be delivered to its observer
    #[error("Notification error: {message}")]
    Notification {
        message: String,
        channel: Option<String>,
    },

    /// The permissions file watcher failed
    #[error("Watch error: {message}")]
    Watch { message: String },
}
