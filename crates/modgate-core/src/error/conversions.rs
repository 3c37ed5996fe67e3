//! From trait implementations for GateError conversions

use super::types::GateError;

impl From<std::io::Error> for GateError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

/// Classify a serde_json failure raised while reading a permissions stream.
///
/// A failing reader is an IO problem; anything else means the bytes did not
/// match the schema.
impl From<serde_json::Error> for GateError {
    fn from(error: serde_json::Error) -> Self {
        if error.is_io() {
            return Self::io(error.to_string());
        }
        Self::malformed_at(error.to_string(), error.line(), error.column())
    }
}

impl From<toml::de::Error> for GateError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.message().to_string(), "settings file")
    }
}

impl From<notify::Error> for GateError {
    fn from(error: notify::Error) -> Self {
        Self::watch(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("[{").unwrap_err();
        let gate_err: GateError = err.into();
        match gate_err {
            GateError::MalformedConfig { line, column, .. } => {
                assert_eq!(line, Some(1));
                assert!(column.is_some());
            }
            other => panic!("Expected MalformedConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let gate_err: GateError = err.into();
        assert!(matches!(gate_err, GateError::Io { .. }));
        assert!(!gate_err.is_malformed_config());
    }

    #[test]
    fn test_toml_error_conversion() {
        let err = toml::from_str::<toml::Value>("schema = ").unwrap_err();
        let gate_err: GateError = err.into();
        assert!(matches!(gate_err, GateError::Config { .. }));
    }
}
