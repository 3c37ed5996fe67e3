//! Resolve command implementation

use modgate_core::{GateBuilder, GateSettings, NoopNotifier};
use std::sync::Arc;

use crate::console::CliConsole;

/// Print the identity the gate would use for `module_path`. No package
/// inspector exists outside the host, so only the path fallback applies.
pub fn run(console: &CliConsole, settings: &GateSettings, module_path: &str) -> anyhow::Result<bool> {
    let gate = GateBuilder::from_settings(settings)
        .notifier(Arc::new(NoopNotifier))
        .build();

    match gate.resolver().resolve(module_path) {
        Some(identity) => {
            println!("{}", identity);
            Ok(true)
        }
        None => {
            console.error(&format!("No module identity for {}", module_path));
            Ok(false)
        }
    }
}
