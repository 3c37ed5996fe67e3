//! Module identity resolution
//!
//! Turns the opaque path a hook was installed from into the module identity
//! used as the permission key. Sources are tried in order, first hit wins:
//!
//! 1. the per-path cache
//! 2. the host's package inspector, when the host application is up
//! 3. a [`FallbackStrategy`] (by default [`PathSegmentHeuristic`])
//!
//! Successful resolutions are cached for the life of the resolver. Failures
//! are not, so a path that fails before the host is ready resolves properly
//! once the inspector shows up.

mod heuristic;
mod inspector;

pub use heuristic::{FallbackStrategy, PathSegmentHeuristic};
pub use inspector::{ApplicationContext, DeferredContext, PackageInspector};

use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::types::ModuleIdentity;

/// Where a resolved identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Inspector,
    Fallback,
}

/// Resolver counters
#[derive(Debug, Default)]
pub struct ResolverStats {
    pub cache_hits: AtomicU64,
    pub inspector_hits: AtomicU64,
    pub fallback_hits: AtomicU64,
    pub misses: AtomicU64,
}

impl ResolverStats {
    fn record(&self, source: Option<ResolutionSource>) {
        let counter = match source {
            Some(ResolutionSource::Cache) => &self.cache_hits,
            Some(ResolutionSource::Inspector) => &self.inspector_hits,
            Some(ResolutionSource::Fallback) => &self.fallback_hits,
            None => &self.misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Maps module path tokens to module identities
pub struct IdentityResolver {
    cache: DashMap<String, ModuleIdentity>,
    context: Option<Arc<dyn ApplicationContext>>,
    inspector: RwLock<Option<Arc<dyn PackageInspector>>>,
    fallback: Option<Arc<dyn FallbackStrategy>>,
    stats: ResolverStats,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver {
    /// Resolver with no host context and the path heuristic as fallback
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            context: None,
            inspector: RwLock::new(None),
            fallback: Some(Arc::new(PathSegmentHeuristic)),
            stats: ResolverStats::default(),
        }
    }

    /// Acquire the package inspector from `context` on first need
    pub fn with_context(mut self, context: Arc<dyn ApplicationContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Use an inspector that is available right away
    pub fn with_inspector(self, inspector: Arc<dyn PackageInspector>) -> Self {
        *self.inspector.write() = Some(inspector);
        self
    }

    /// Replace the fallback, or pass `None` to disable it
    pub fn with_fallback(mut self, fallback: Option<Arc<dyn FallbackStrategy>>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Resolve `token` to a module identity, or `None` if nothing could
    pub fn resolve(&self, token: &str) -> Option<ModuleIdentity> {
        self.resolve_with_source(token).map(|(identity, _)| identity)
    }

    /// Like [`resolve`](Self::resolve) but also reports which step answered
    pub fn resolve_with_source(&self, token: &str) -> Option<(ModuleIdentity, ResolutionSource)> {
        let result = self.lookup_uncounted(token);
        self.stats.record(result.as_ref().map(|(_, source)| *source));
        result
    }

    fn lookup_uncounted(&self, token: &str) -> Option<(ModuleIdentity, ResolutionSource)> {
        let cached = self.cache.get(token).map(|entry| entry.value().clone());
        if let Some(identity) = cached {
            return Some((identity, ResolutionSource::Cache));
        }

        // No map guard or lock is held past this point while host code runs
        if let Some(inspector) = self.inspector() {
            match inspector.package_name(token) {
                Some(name) if !name.is_empty() => {
                    debug!("Resolved {} to {} via package inspector", token, name);
                    return Some((self.remember(token, name), ResolutionSource::Inspector));
                }
                _ => debug!("Package inspector could not read {}", token),
            }
        }

        if let Some(fallback) = &self.fallback {
            if let Some(name) = fallback.identity_for(token) {
                debug!("Resolved {} to {} via path fallback", token, name);
                return Some((self.remember(token, name), ResolutionSource::Fallback));
            }
        }

        debug!("No module identity for {}", token);
        None
    }

    /// Cache a fresh resolution. When two threads race on the same token the
    /// first insert wins and both callers get the stored value.
    fn remember(&self, token: &str, name: String) -> ModuleIdentity {
        self.cache
            .entry(token.to_string())
            .or_insert_with(|| ModuleIdentity::from(name))
            .value()
            .clone()
    }

    /// Current inspector, asking the context again while none is known
    fn inspector(&self) -> Option<Arc<dyn PackageInspector>> {
        if let Some(inspector) = self.inspector.read().clone() {
            return Some(inspector);
        }

        let acquired = self.context.as_ref()?.package_inspector()?;
        debug!("Package inspector became available");
        let mut slot = self.inspector.write();
        Some(Arc::clone(slot.get_or_insert(acquired)))
    }

    /// Cached identity for `token`, without resolving
    pub fn cached(&self, token: &str) -> Option<ModuleIdentity> {
        self.cache.get(token).map(|entry| entry.value().clone())
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn has_inspector(&self) -> bool {
        self.inspector.read().is_some()
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("cached", &self.cache.len())
            .field("has_context", &self.context.is_some())
            .field("has_inspector", &self.has_inspector())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const TOKEN: &str = "/data/app/com.example.mod-1/base.apk";

    /// Inspector that answers from a fixed name and counts its calls
    struct CountingInspector {
        answer: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingInspector {
        fn new(answer: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PackageInspector for CountingInspector {
        fn package_name(&self, _path: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn test_heuristic_without_inspector() {
        let resolver = IdentityResolver::new();
        let (identity, source) = resolver.resolve_with_source(TOKEN).unwrap();
        assert_eq!(identity.as_str(), "com.example.mod");
        assert_eq!(source, ResolutionSource::Fallback);
    }

    #[test]
    fn test_second_resolution_hits_cache() {
        let inspector = CountingInspector::new(Some("com.real.package"));
        let resolver = IdentityResolver::new().with_inspector(inspector.clone());

        let first = resolver.resolve_with_source(TOKEN).unwrap();
        let second = resolver.resolve_with_source(TOKEN).unwrap();

        assert_eq!(first.0, second.0);
        assert_eq!(first.1, ResolutionSource::Inspector);
        assert_eq!(second.1, ResolutionSource::Cache);
        assert_eq!(inspector.calls(), 1);
        assert_eq!(resolver.stats().cache_hits.load(Ordering::Relaxed), 1);
        assert_eq!(resolver.stats().inspector_hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_inspector_beats_heuristic() {
        let inspector = CountingInspector::new(Some("com.declared.name"));
        let resolver = IdentityResolver::new().with_inspector(inspector);
        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "com.declared.name");
    }

    #[test]
    fn test_inspector_miss_falls_back() {
        let inspector = CountingInspector::new(None);
        let resolver = IdentityResolver::new().with_inspector(inspector.clone());
        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "com.example.mod");
        assert_eq!(inspector.calls(), 1);
    }

    #[test]
    fn test_empty_inspector_answer_is_a_miss() {
        let inspector = CountingInspector::new(Some(""));
        let resolver = IdentityResolver::new().with_inspector(inspector);
        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "com.example.mod");
    }

    #[test]
    fn test_failures_are_not_cached() {
        let resolver = IdentityResolver::new();
        assert!(resolver.resolve("base.apk").is_none());
        assert_eq!(resolver.cached_len(), 0);
        assert_eq!(resolver.stats().misses.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let resolver = IdentityResolver::new().with_fallback(None);
        assert!(resolver.resolve(TOKEN).is_none());
    }

    #[test]
    fn test_custom_fallback() {
        struct FileStem;
        impl FallbackStrategy for FileStem {
            fn identity_for(&self, token: &str) -> Option<String> {
                token.rsplit('/').next().map(|f| f.trim_end_matches(".apk").to_string())
            }
        }

        let resolver = IdentityResolver::new().with_fallback(Some(Arc::new(FileStem)));
        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "base");
    }

    #[test]
    fn test_context_acquired_once_available() {
        let context = Arc::new(DeferredContext::new());
        let resolver = IdentityResolver::new()
            .with_context(context.clone())
            .with_fallback(None);

        // Host not up yet: no inspector, nothing resolves, nothing cached
        assert!(resolver.resolve(TOKEN).is_none());
        assert!(!resolver.has_inspector());

        let inspector = CountingInspector::new(Some("com.late.package"));
        context.install(inspector.clone());

        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "com.late.package");
        assert!(resolver.has_inspector());
        assert_eq!(inspector.calls(), 1);
    }

    #[test]
    fn test_cached_identity_is_never_recomputed() {
        let context = Arc::new(DeferredContext::new());
        let resolver = IdentityResolver::new().with_context(context.clone());

        // Resolved by heuristic before the host is ready
        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "com.example.mod");

        let inspector = CountingInspector::new(Some("com.other.name"));
        context.install(inspector.clone());

        assert_eq!(resolver.resolve(TOKEN).unwrap().as_str(), "com.example.mod");
        assert_eq!(inspector.calls(), 0);
        assert_eq!(
            resolver.cached(TOKEN),
            Some(ModuleIdentity::from("com.example.mod"))
        );
    }

    #[test]
    fn test_concurrent_resolution_agrees() {
        let resolver = IdentityResolver::new();
        let results: Vec<Option<ModuleIdentity>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| resolver.resolve(TOKEN)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results
            .iter()
            .all(|r| r.as_ref().map(ModuleIdentity::as_str) == Some("com.example.mod")));
        assert_eq!(resolver.cached_len(), 1);
    }
}
