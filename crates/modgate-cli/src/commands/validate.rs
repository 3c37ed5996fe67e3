//! Validate command implementation

use modgate_core::config;
use modgate_core::{GateError, SchemaVersion, TargetPermissions, UnifiedError};
use std::path::Path;

use crate::console::CliConsole;

/// Parse `file` and list what each module is granted
pub fn run(console: &CliConsole, file: &Path, schema: SchemaVersion) -> anyhow::Result<bool> {
    let records = match config::parse_file(file, schema) {
        Ok(records) => records,
        Err(e @ GateError::MalformedConfig { .. }) => {
            let location = e.context().map(|c| format!(" at {}", c)).unwrap_or_default();
            console.error(&format!(
                "{} is not a valid {} permissions file{}: {}",
                file.display(),
                schema,
                location,
                e.message()
            ));
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    console.print_header(&format!("Permissions ({} schema)", schema));
    console.print_table_row(&["Module", "Granted targets"]);
    for record in &records {
        console.print_table_row(&[record.module.as_str(), &describe(&record.permissions)]);
    }

    console.success(&format!(
        "{} is valid: {} module records",
        file.display(),
        records.len()
    ));
    Ok(true)
}

fn describe(permissions: &TargetPermissions) -> String {
    let mut granted: Vec<&str> = match permissions {
        TargetPermissions::Set(targets) => targets.iter().map(String::as_str).collect(),
        TargetPermissions::Map(flags) => flags
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(target, _)| target.as_str())
            .collect(),
    };
    if granted.is_empty() {
        return "(none)".to_string();
    }
    granted.sort_unstable();
    granted.join(", ")
}
