//! Permissions file watcher for hot reload
//!
//! Watches the directory holding the permissions file (editors and config
//! managers usually replace files rather than write them in place) and
//! reloads the gate whenever the file itself changes.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebouncedEvent, Debouncer, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::engine::PermissionGate;
use crate::error::{GateError, GateResult, UnifiedError};

/// Pause before the single retry of a reload that failed with a retryable error
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Reload counters shared with the watcher callback
#[derive(Debug, Default)]
pub struct WatchStats {
    pub reloads: AtomicU64,
    pub failures: AtomicU64,
}

/// Keeps a gate in sync with its permissions file until dropped
pub struct PermissionsWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    path: PathBuf,
    active: Arc<AtomicBool>,
    stats: Arc<WatchStats>,
}

impl PermissionsWatcher {
    /// Start watching `path` and reload `gate` on every change to it
    pub fn start(gate: PermissionGate, path: impl Into<PathBuf>, debounce: Duration) -> GateResult<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| GateError::watch(format!("{:?} does not name a file", path)))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !directory.is_dir() {
            return Err(GateError::watch(format!(
                "watch directory {:?} does not exist",
                directory
            )));
        }

        let active = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(WatchStats::default());

        let active_clone = Arc::clone(&active);
        let stats_clone = Arc::clone(&stats);
        let target = path.clone();

        let mut debouncer = new_debouncer(
            debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                if !active_clone.load(Ordering::SeqCst) {
                    return;
                }

                match result {
                    Ok(events) => {
                        let touched = events
                            .iter()
                            .any(|e| e.path.file_name() == Some(file_name.as_os_str()));
                        if !touched {
                            return;
                        }

                        debug!("Permissions file changed: {:?}", target);
                        match reload_with_retry(|| gate.load_permissions_file(&target), RETRY_DELAY) {
                            Ok(records) => {
                                stats_clone.reloads.fetch_add(1, Ordering::SeqCst);
                                info!("Reloaded {} permission records from {:?}", records, target);
                            }
                            Err(e) => {
                                stats_clone.failures.fetch_add(1, Ordering::SeqCst);
                                warn!("Keeping previous permissions, reload of {:?} failed: {}", target, e);
                            }
                        }
                    }
                    Err(e) => {
                        error!("Watch error: {:?}", e);
                    }
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(&directory, RecursiveMode::NonRecursive)?;
        info!("Watching permissions file: {:?}", path);

        Ok(Self {
            _debouncer: debouncer,
            path,
            active,
            stats,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ignore changes until [`resume`](Self::resume)
    pub fn pause(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn reloads(&self) -> u64 {
        self.stats.reloads.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u64 {
        self.stats.failures.load(Ordering::SeqCst)
    }
}

/// Run `attempt`, retrying once after `delay` when it fails with a retryable
/// error (e.g. the file was caught between an editor's unlink and rename)
fn reload_with_retry<F>(mut attempt: F, delay: Duration) -> GateResult<usize>
where
    F: FnMut() -> GateResult<usize>,
{
    match attempt() {
        Err(e) if e.is_retryable() => {
            debug!("Retrying permissions reload after: {}", e);
            std::thread::sleep(delay);
            attempt()
        }
        result => result,
    }
}
