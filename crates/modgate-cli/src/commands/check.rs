//! Check command implementation

use modgate_core::{GateBuilder, GateSettings, NoopNotifier};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::decision_json;
use crate::console::CliConsole;

/// Load `file` and decide one (module path, target) pair.
/// Succeeds only when the hook would be allowed to run.
pub fn run(
    console: &CliConsole,
    settings: &GateSettings,
    file: &Path,
    module_path: Option<&str>,
    target: &str,
    json: bool,
) -> anyhow::Result<bool> {
    let gate = GateBuilder::from_settings(settings)
        .notifier(Arc::new(NoopNotifier))
        .build();
    let records = gate.load_permissions_file(file)?;
    info!("Loaded {} module records from {}", records, file.display());

    let decision = gate.evaluate(module_path, target);

    if json {
        println!("{}", decision_json(&decision));
    } else {
        let module = match (&decision.module_identity, decision.internal) {
            (_, true) => "framework-internal hook".to_string(),
            (Some(identity), false) => identity.to_string(),
            (None, false) => "unresolved module".to_string(),
        };
        let message = format!("{} -> {}: {}", module, target, decision.verdict);
        console.print_verdict(decision.verdict, &message);
    }

    Ok(decision.is_allowed())
}
