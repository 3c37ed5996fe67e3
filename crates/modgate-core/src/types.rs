//! Shared value types for the permission gate

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Stable name of an injected module, the sole key into the permission store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleIdentity(String);

impl ModuleIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModuleIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModuleIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ModuleIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of a permission lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The module is granted access to the target
    Allowed,
    /// The module has a record but the target is not granted
    Denied,
    /// No record exists for the module
    Unknown,
}

impl Verdict {
    /// Only an explicit grant lets a hook run
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Allowed => "allowed",
            Verdict::Denied => "denied",
            Verdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Targets a module may affect, in the shape of the schema they were read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPermissions {
    /// Presence grants access
    Set(HashSet<String>),
    /// Explicit per-target grant flag
    Map(HashMap<String, bool>),
}

impl TargetPermissions {
    /// Grant state for a target; anything not explicitly granted is denied
    pub fn verdict_for(&self, target: &str) -> Verdict {
        let granted = match self {
            TargetPermissions::Set(targets) => targets.contains(target),
            TargetPermissions::Map(flags) => flags.get(target).copied().unwrap_or(false),
        };
        if granted {
            Verdict::Allowed
        } else {
            Verdict::Denied
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TargetPermissions::Set(targets) => targets.len(),
            TargetPermissions::Map(flags) => flags.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TargetPermissions {
    fn default() -> Self {
        TargetPermissions::Set(HashSet::new())
    }
}

/// One parsed entry of the permissions configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    pub module: ModuleIdentity,
    pub permissions: TargetPermissions,
}

impl PermissionRecord {
    pub fn new(module: impl Into<ModuleIdentity>, permissions: TargetPermissions) -> Self {
        Self {
            module: module.into(),
            permissions,
        }
    }

    /// Convenience for the set schema
    pub fn allowing<I, S>(module: impl Into<ModuleIdentity>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            module,
            TargetPermissions::Set(targets.into_iter().map(Into::into).collect()),
        )
    }
}
