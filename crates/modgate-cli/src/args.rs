//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use modgate_core::SchemaVersion;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modgate")]
#[command(about = "Modgate - permission gate for hook-injected modules")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Gate settings file (TOML)
    #[arg(long, global = true, env = "MODGATE_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a permissions file and report what it grants
    Validate {
        /// Permissions file (JSON)
        file: PathBuf,

        /// Record shape: v1 (object of flags) or v2 (array of names)
        #[arg(long)]
        schema: Option<SchemaVersion>,
    },

    /// Decide whether a module may act on a target package
    Check {
        /// Permissions file (JSON)
        file: PathBuf,

        /// Package whose methods the module hooks
        target: String,

        /// Path the module was loaded from (omit for a framework-internal hook)
        #[arg(long)]
        module_path: Option<String>,

        /// Record shape: v1 (object of flags) or v2 (array of names)
        #[arg(long)]
        schema: Option<SchemaVersion>,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the module identity derived from a module path
    Resolve {
        /// Path the module was loaded from
        module_path: String,
    },

    /// Answer `<module-path>\t<target>` queries read from stdin
    #[command(verbatim_doc_comment)]
    Serve {
        /// Permissions file, overriding the settings file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Reload the permissions file when it changes
        #[arg(long)]
        watch: bool,

        /// Also write every decision event to stderr as JSON
        #[arg(long)]
        events: bool,
    },
}
