//! Schema versions of the permissions configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GateError;

/// Record shape of a permissions stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `packages` is an object of target name to grant flag
    V1,
    /// `packages` is an array of granted target names
    V2,
}

impl Default for SchemaVersion {
    fn default() -> Self {
        SchemaVersion::V2
    }
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" | "map" => Ok(SchemaVersion::V1),
            "v2" | "2" | "set" => Ok(SchemaVersion::V2),
            other => Err(GateError::config_with_context(
                format!("unknown schema version '{}'", other),
                "expected v1 or v2",
            )),
        }
    }
}

/// v1 record as it appears on the wire
#[derive(Debug, Deserialize)]
pub(super) struct FlagRecord {
    pub name: String,
    pub packages: HashMap<String, bool>,
}

/// v2 record as it appears on the wire
#[derive(Debug, Deserialize)]
pub(super) struct ListRecord {
    pub name: String,
    pub packages: Vec<String>,
}
