//! Decision notification
//!
//! Every non-internal permission decision is reported to a
//! [`DecisionNotifier`]. Delivery is best effort: the decision engine logs
//! failures and carries on, so a notifier can never change a verdict or
//! block a check on an error.

mod broadcast;
mod callback;
mod json_lines;

pub use broadcast::BroadcastNotifier;
pub use callback::CallbackNotifier;
pub use json_lines::JsonLinesNotifier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GateResult;
use crate::types::{ModuleIdentity, Verdict};

/// A single permission decision as reported to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEvent {
    /// `None` when the module path could not be resolved
    pub module_identity: Option<ModuleIdentity>,
    pub target_package: String,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

impl DecisionEvent {
    pub fn new(
        module_identity: Option<ModuleIdentity>,
        target_package: impl Into<String>,
        verdict: Verdict,
    ) -> Self {
        Self {
            module_identity,
            target_package: target_package.into(),
            verdict,
            timestamp: Utc::now(),
        }
    }
}

/// What happened to a notification that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to this many observers
    Delivered(usize),
    /// Nobody is listening; the event was dropped
    Unobserved,
}

/// Sink for permission decisions
pub trait DecisionNotifier: Send + Sync {
    /// Report a decision. Must not block for long; errors are logged by the
    /// caller and never propagated.
    fn notify(&self, event: &DecisionEvent) -> GateResult<Delivery>;
}

/// Notifier that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl DecisionNotifier for NoopNotifier {
    fn notify(&self, _event: &DecisionEvent) -> GateResult<Delivery> {
        Ok(Delivery::Unobserved)
    }
}
