//! CLI command implementations

pub mod check;
pub mod resolve;
pub mod serve;
pub mod validate;

use modgate_core::Decision;

/// JSON form of a decision as printed by `check --json` and `serve`
pub fn decision_json(decision: &Decision) -> serde_json::Value {
    serde_json::json!({
        "moduleIdentity": decision.module_identity,
        "targetPackage": decision.target_package,
        "verdict": decision.verdict,
        "internal": decision.internal,
    })
}
