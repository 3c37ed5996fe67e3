//! Command routing logic for CLI

use anyhow::Context;
use modgate_core::GateSettings;
use std::process::ExitCode;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::console::CliConsole;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = load_settings(&cli)?;
    let console = CliConsole::new();

    let succeeded = match cli.command {
        Commands::Validate { file, schema } => {
            commands::validate::run(&console, &file, schema.unwrap_or(settings.schema))?
        }
        Commands::Check {
            file,
            target,
            module_path,
            schema,
            json,
        } => {
            let settings = GateSettings {
                schema: schema.unwrap_or(settings.schema),
                ..settings
            };
            commands::check::run(
                &console,
                &settings,
                &file,
                module_path.as_deref(),
                &target,
                json,
            )?
        }
        Commands::Resolve { module_path } => {
            commands::resolve::run(&console, &settings, &module_path)?
        }
        Commands::Serve {
            file,
            watch,
            events,
        } => {
            let settings = GateSettings {
                permissions_file: file.or(settings.permissions_file),
                watch: watch || settings.watch,
                ..settings
            };
            settings.validate()?;
            commands::serve::run(settings, events).await?
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Settings file (if any) with environment overrides applied
fn load_settings(cli: &Cli) -> anyhow::Result<GateSettings> {
    let settings = match &cli.settings {
        Some(path) => GateSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => GateSettings::default(),
    };
    Ok(settings.apply_env()?)
}
