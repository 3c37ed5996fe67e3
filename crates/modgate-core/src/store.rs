//! Permission store with whole-table replacement
//!
//! Readers grab the current [`PermissionTable`] behind an `Arc` and drop the
//! lock before touching it, so a reload never blocks on a slow reader and a
//! reader never sees a half-built table.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{ModuleIdentity, PermissionRecord, TargetPermissions, Verdict};

/// Immutable snapshot of every module's permissions
#[derive(Debug, Default)]
pub struct PermissionTable {
    modules: HashMap<ModuleIdentity, TargetPermissions>,
    generation: u64,
}

impl PermissionTable {
    /// Build a table from parsed records. A later record for the same
    /// module replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = PermissionRecord>, generation: u64) -> Self {
        let modules = records
            .into_iter()
            .map(|r| (r.module, r.permissions))
            .collect();
        Self {
            modules,
            generation,
        }
    }

    pub fn lookup(&self, identity: Option<&ModuleIdentity>, target: &str) -> Verdict {
        let Some(identity) = identity else {
            return Verdict::Unknown;
        };
        match self.modules.get(identity) {
            Some(permissions) => permissions.verdict_for(target),
            None => Verdict::Unknown,
        }
    }

    pub fn permissions(&self, identity: &ModuleIdentity) -> Option<&TargetPermissions> {
        self.modules.get(identity)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleIdentity> {
        self.modules.keys()
    }
}

/// Concurrently readable store of module permissions
#[derive(Debug)]
pub struct PermissionStore {
    current: RwLock<Arc<PermissionTable>>,
    next_generation: AtomicU64,
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStore {
    /// Create an empty store (generation 0, every lookup is `Unknown`)
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(PermissionTable::default())),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Replace the whole mapping with `records`.
    ///
    /// The new table is built before the write lock is taken; the lock only
    /// covers the pointer swap. Returns the generation that was installed.
    pub fn reload(&self, records: impl IntoIterator<Item = PermissionRecord>) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let table = Arc::new(PermissionTable::from_records(records, generation));
        let modules = table.len();

        let previous = {
            let mut current = self.current.write();
            // Concurrent reloads may finish out of order; never step backwards
            if current.generation > generation {
                tracing::debug!(
                    "Discarding permission table generation {} (generation {} already installed)",
                    generation,
                    current.generation
                );
                return current.generation;
            }
            std::mem::replace(&mut *current, table)
        };

        tracing::info!(
            "Installed permission table generation {} with {} modules (replaced generation {})",
            generation,
            modules,
            previous.generation
        );
        generation
    }

    pub fn lookup(&self, identity: Option<&ModuleIdentity>, target: &str) -> Verdict {
        self.snapshot().lookup(identity, target)
    }

    /// Current table; stays valid and unchanged even if a reload follows
    pub fn snapshot(&self) -> Arc<PermissionTable> {
        Arc::clone(&*self.current.read())
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    pub fn module_count(&self) -> usize {
        self.current.read().len()
    }

    pub fn contains_module(&self, identity: &ModuleIdentity) -> bool {
        self.current.read().modules.contains_key(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn id(s: &str) -> ModuleIdentity {
        ModuleIdentity::from(s)
    }

    #[test]
    fn test_empty_store_is_unknown() {
        let store = PermissionStore::new();
        assert_eq!(store.generation(), 0);
        assert_eq!(store.lookup(Some(&id("m")), "t"), Verdict::Unknown);
        assert_eq!(store.lookup(None, "t"), Verdict::Unknown);
    }

    #[test]
    fn test_reload_and_lookup() {
        let store = PermissionStore::new();
        let generation = store.reload(vec![
            PermissionRecord::allowing("com.example.mod", ["com.target.app"]),
            PermissionRecord::new("com.empty.mod", TargetPermissions::Set(HashSet::new())),
        ]);

        assert_eq!(generation, 1);
        assert_eq!(store.module_count(), 2);
        assert_eq!(
            store.lookup(Some(&id("com.example.mod")), "com.target.app"),
            Verdict::Allowed
        );
        assert_eq!(
            store.lookup(Some(&id("com.example.mod")), "com.other.app"),
            Verdict::Denied
        );
        // Present with no grants is distinguishable from absent
        assert_eq!(
            store.lookup(Some(&id("com.empty.mod")), "com.target.app"),
            Verdict::Denied
        );
        assert_eq!(
            store.lookup(Some(&id("com.absent.mod")), "com.target.app"),
            Verdict::Unknown
        );
    }

    #[test]
    fn test_reload_replaces_everything() {
        let store = PermissionStore::new();
        store.reload(vec![PermissionRecord::allowing("old", ["t"])]);
        store.reload(vec![PermissionRecord::allowing("new", ["t"])]);

        assert_eq!(store.generation(), 2);
        assert!(!store.contains_module(&id("old")));
        assert_eq!(store.lookup(Some(&id("old")), "t"), Verdict::Unknown);
        assert_eq!(store.lookup(Some(&id("new")), "t"), Verdict::Allowed);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let store = PermissionStore::new();
        store.reload(vec![
            PermissionRecord::allowing("m", ["first"]),
            PermissionRecord::allowing("m", ["second"]),
        ]);
        assert_eq!(store.module_count(), 1);
        assert_eq!(store.lookup(Some(&id("m")), "first"), Verdict::Denied);
        assert_eq!(store.lookup(Some(&id("m")), "second"), Verdict::Allowed);
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let store = PermissionStore::new();
        store.reload(vec![PermissionRecord::allowing("m", ["t"])]);
        let before = store.snapshot();

        store.reload(Vec::new());

        assert_eq!(before.lookup(Some(&id("m")), "t"), Verdict::Allowed);
        assert_eq!(store.lookup(Some(&id("m")), "t"), Verdict::Unknown);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_reload_never_tears() {
        // Every table pairs module `a` and module `b` with the same target,
        // so a reader must always see both granted the same target.
        let store = PermissionStore::new();
        store.reload(vec![
            PermissionRecord::allowing("a", ["t0"]),
            PermissionRecord::allowing("b", ["t0"]),
        ]);

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 1..500 {
                    let target = format!("t{}", i);
                    store.reload(vec![
                        PermissionRecord::allowing("a", [target.clone()]),
                        PermissionRecord::allowing("b", [target]),
                    ]);
                }
            });

            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..2000 {
                        let table = store.snapshot();
                        let a = table.permissions(&id("a")).cloned();
                        let b = table.permissions(&id("b")).cloned();
                        assert_eq!(a, b, "torn table at generation {}", table.generation());
                    }
                });
            }
        });

        assert_eq!(store.generation(), 500);
    }
}
