//! Constructor methods for GateError

use super::types::GateError;

impl GateError {
    /// Create a malformed config error without position information
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedConfig {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a malformed config error pointing at a line and column
    pub fn malformed_at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MalformedConfig {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error with the offending path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a new notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
            channel: None,
        }
    }

    /// Create a notification error naming the channel that failed
    pub fn notification_on(message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
            channel: Some(channel.into()),
        }
    }

    /// Create a new watcher error
    pub fn watch(message: impl Into<String>) -> Self {
        Self::Watch {
            message: message.into(),
        }
    }

    /// Whether this is a schema violation of the permissions stream
    pub fn is_malformed_config(&self) -> bool {
        matches!(self, Self::MalformedConfig { .. })
    }
}
