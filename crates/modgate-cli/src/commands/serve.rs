//! Serve command implementation
//!
//! Reads one query per line from stdin and writes one JSON answer per line
//! to stdout:
//!
//! ```text
//! /data/app/com.example.mod-1/base.apk<TAB>com.target.app
//! -<TAB>com.target.app            (framework-internal hook)
//! ```

use modgate_core::{GateBuilder, GateSettings, JsonLinesNotifier, PermissionsWatcher, ResolverStats};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use super::decision_json;

/// Serve queries until stdin closes or ctrl-c
pub async fn run(settings: GateSettings, events: bool) -> anyhow::Result<bool> {
    let mut builder = GateBuilder::from_settings(&settings);
    if events {
        builder = builder.notifier(Arc::new(JsonLinesNotifier::new(std::io::stderr())));
    }
    let gate = builder.build();

    match &settings.permissions_file {
        Some(path) => {
            let records = gate.load_permissions_file(path)?;
            info!("Serving {} module records from {:?}", records, path);
        }
        None => warn!("No permissions file given; every module hook will be refused"),
    }

    let watcher = match (&settings.permissions_file, settings.watch) {
        (Some(path), true) => Some(PermissionsWatcher::start(
            gate.clone(),
            path,
            settings.watch_debounce(),
        )?),
        _ => None,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }

                let answer = match parse_query(&line) {
                    Some((module_path, target)) => decision_json(&gate.evaluate(module_path, target)),
                    None => serde_json::json!({
                        "error": "expected <module-path>\\t<target>",
                        "query": line,
                    }),
                };
                stdout.write_all(format!("{}\n", answer).as_bytes()).await?;
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    info!("{}", resolution_summary(gate.resolver().stats()));
    if let Some(watcher) = &watcher {
        info!(
            "Watched {:?}: {} reloads, {} rejected",
            watcher.path(),
            watcher.reloads(),
            watcher.failures()
        );
    }

    Ok(true)
}

fn resolution_summary(stats: &ResolverStats) -> String {
    format!(
        "Module identities: {} cached, {} from inspector, {} from path, {} unresolved",
        stats.cache_hits.load(Ordering::Relaxed),
        stats.inspector_hits.load(Ordering::Relaxed),
        stats.fallback_hits.load(Ordering::Relaxed),
        stats.misses.load(Ordering::Relaxed),
    )
}

/// Split a query line into module path and target. A module path of `-`
/// stands for a framework-internal hook.
fn parse_query(line: &str) -> Option<(Option<&str>, &str)> {
    let line = line.trim();
    let (path, target) = line
        .split_once('\t')
        .or_else(|| line.rsplit_once(char::is_whitespace))?;
    let (path, target) = (path.trim(), target.trim());
    if path.is_empty() || target.is_empty() {
        return None;
    }

    let module_path = (path != "-").then_some(path);
    Some((module_path, target))
}
