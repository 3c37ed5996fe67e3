//! UnifiedError trait implementation for GateError

use super::types::{GateError, UnifiedError};

impl UnifiedError for GateError {
    fn error_code(&self) -> &str {
        match self {
            Self::MalformedConfig { .. } => "GATE_MALFORMED_CONFIG",
            Self::Config { .. } => "GATE_CONFIG",
            Self::Io { .. } => "GATE_IO",
            Self::Notification { .. } => "GATE_NOTIFICATION",
            Self::Watch { .. } => "GATE_WATCH",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::MalformedConfig { message, .. } => message,
            Self::Config { message, .. } => message,
            Self::Io { message, .. } => message,
            Self::Notification { message, .. } => message,
            Self::Watch { message } => message,
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::MalformedConfig {
                line: Some(line),
                column: Some(column),
                ..
            } => Some(format!("line {}, column {}", line, column)),
            Self::MalformedConfig { .. } => None,
            Self::Config { context, .. } => context.clone(),
            Self::Io { path, .. } => path.clone(),
            Self::Notification { channel, .. } => channel.clone(),
            Self::Watch { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        // A file caught mid-write by the watcher reads fine a moment later
        matches!(self, Self::Io { .. })
    }
}
