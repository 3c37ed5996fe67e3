//! Gate settings
//!
//! Settings are read from a TOML file and can be overridden from the
//! environment:
//!
//! ```toml
//! permissions_file = "permissions.json"
//! schema = "v2"
//! heuristic_fallback = true
//! notification_capacity = 256
//! watch = false
//! watch_debounce_ms = 500
//! ```
//!
//! A relative `permissions_file` is taken relative to the settings file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::SchemaVersion;
use crate::error::{GateError, GateResult};

pub const ENV_PERMISSIONS_FILE: &str = "MODGATE_PERMISSIONS_FILE";
pub const ENV_SCHEMA: &str = "MODGATE_SCHEMA";
pub const ENV_HEURISTIC: &str = "MODGATE_HEURISTIC";
pub const ENV_NOTIFICATION_CAPACITY: &str = "MODGATE_NOTIFICATION_CAPACITY";
pub const ENV_WATCH: &str = "MODGATE_WATCH";

/// Settings controlling how a gate is assembled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateSettings {
    /// Permissions file loaded at startup (and watched when `watch` is set)
    pub permissions_file: Option<PathBuf>,
    /// Record shape of the permissions file
    pub schema: SchemaVersion,
    /// Derive identities from the module path when the host cannot
    pub heuristic_fallback: bool,
    /// Buffered decisions per broadcast subscriber
    pub notification_capacity: usize,
    /// Reload the permissions file when it changes
    pub watch: bool,
    pub watch_debounce_ms: u64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            permissions_file: None,
            schema: SchemaVersion::default(),
            heuristic_fallback: true,
            notification_capacity: 256,
            watch: false,
            watch_debounce_ms: 500,
        }
    }
}

impl GateSettings {
    /// Load settings from a TOML file and validate them
    pub fn load(path: impl AsRef<Path>) -> GateResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GateError::io_with_path(e.to_string(), path.display().to_string()))?;

        let mut settings = Self::parse(&content)?;
        if let (Some(file), Some(base)) = (&settings.permissions_file, path.parent()) {
            if file.is_relative() {
                settings.permissions_file = Some(base.join(file));
            }
        }

        tracing::debug!("Loaded gate settings from {:?}", path);
        Ok(settings)
    }

    /// Parse settings from TOML text and validate them
    pub fn parse(content: &str) -> GateResult<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Layer `MODGATE_*` environment variables over these settings
    pub fn apply_env(self) -> GateResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Layer overrides from `lookup` (keyed by environment variable name)
    pub fn apply_env_from<F>(mut self, lookup: F) -> GateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PERMISSIONS_FILE) {
            self.permissions_file = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_SCHEMA) {
            self.schema = value
                .parse()
                .map_err(|e: GateError| GateError::config_with_context(e.to_string(), ENV_SCHEMA))?;
        }
        if let Some(value) = lookup(ENV_HEURISTIC) {
            self.heuristic_fallback = parse_flag(ENV_HEURISTIC, &value)?;
        }
        if let Some(value) = lookup(ENV_NOTIFICATION_CAPACITY) {
            self.notification_capacity = value.trim().parse().map_err(|_| {
                GateError::config_with_context(
                    format!("'{}' is not a valid capacity", value),
                    ENV_NOTIFICATION_CAPACITY,
                )
            })?;
        }
        if let Some(value) = lookup(ENV_WATCH) {
            self.watch = parse_flag(ENV_WATCH, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> GateResult<()> {
        if self.notification_capacity == 0 {
            return Err(GateError::config_with_context(
                "notification_capacity must be greater than zero",
                "notification_capacity",
            ));
        }
        if self.watch && self.permissions_file.is_none() {
            return Err(GateError::config_with_context(
                "watch requires a permissions_file",
                "watch",
            ));
        }
        Ok(())
    }

    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}

fn parse_flag(key: &str, value: &str) -> GateResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GateError::config_with_context(
            format!("'{}' is not a boolean", value),
            key,
        )),
    }
}
