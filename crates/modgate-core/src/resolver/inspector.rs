//! Host-side collaborators used to resolve a module path to a package name

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Reads the package name out of a module archive (the OS package manager)
pub trait PackageInspector: Send + Sync {
    /// Package name declared by the archive at `path`, if it can be read
    fn package_name(&self, path: &str) -> Option<String>;
}

impl<F> PackageInspector for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn package_name(&self, path: &str) -> Option<String> {
        self(path)
    }
}

/// Running host application that can hand out a package inspector.
///
/// Returns `None` while the host has not finished starting; callers ask again
/// on a later resolve.
pub trait ApplicationContext: Send + Sync {
    fn package_inspector(&self) -> Option<Arc<dyn PackageInspector>>;
}

/// Context that becomes available once the host installs its inspector
#[derive(Default)]
pub struct DeferredContext {
    inspector: OnceLock<Arc<dyn PackageInspector>>,
}

impl DeferredContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the inspector available. Returns false if one was already set.
    pub fn install(&self, inspector: Arc<dyn PackageInspector>) -> bool {
        self.inspector.set(inspector).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.inspector.get().is_some()
    }
}

impl ApplicationContext for DeferredContext {
    fn package_inspector(&self) -> Option<Arc<dyn PackageInspector>> {
        self.inspector.get().cloned()
    }
}

impl fmt::Debug for DeferredContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredContext")
            .field("ready", &self.is_ready())
            .finish()
    }
}
