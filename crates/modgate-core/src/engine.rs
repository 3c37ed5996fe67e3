//! Decision engine
//!
//! [`PermissionGate`] is what the hook machinery calls before running a
//! module's hook body against a target application. It resolves the
//! module's identity, looks the pair up in the current permission table,
//! reports the decision and answers with a plain boolean.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::{self, SchemaVersion};
use crate::error::{GateResult, UnifiedError};
use crate::notifier::{BroadcastNotifier, DecisionEvent, DecisionNotifier, Delivery};
use crate::resolver::{
    ApplicationContext, FallbackStrategy, IdentityResolver, PackageInspector, PathSegmentHeuristic,
};
use crate::settings::GateSettings;
use crate::store::PermissionStore;
use crate::types::{ModuleIdentity, PermissionRecord, Verdict};

/// Full outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// `None` for internal calls and for paths that could not be resolved
    pub module_identity: Option<ModuleIdentity>,
    pub target_package: String,
    pub verdict: Verdict,
    /// Permission table generation that answered; `None` for internal calls
    pub generation: Option<u64>,
    /// The hook was installed by the framework itself, not by a module
    pub internal: bool,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        self.verdict.is_allowed()
    }
}

/// Shared, thread-safe permission gate
#[derive(Clone)]
pub struct PermissionGate {
    store: Arc<PermissionStore>,
    resolver: Arc<IdentityResolver>,
    notifier: Arc<dyn DecisionNotifier>,
    events: Option<BroadcastNotifier>,
    schema: SchemaVersion,
}

impl PermissionGate {
    pub fn builder() -> GateBuilder {
        GateBuilder::new()
    }

    /// Validate settings, build a gate from them and load its permissions
    /// file, if any
    pub fn from_settings(settings: &GateSettings) -> GateResult<Self> {
        settings.validate()?;
        let gate = GateBuilder::from_settings(settings).build();
        if let Some(path) = &settings.permissions_file {
            gate.load_permissions_file(path)?;
        }
        Ok(gate)
    }

    /// May the module installed from `module_path` act on `target_package`?
    ///
    /// A missing `module_path` marks a hook installed by the framework
    /// itself, which is always allowed. Only an explicit grant allows a
    /// module; unresolvable paths and unlisted modules are refused.
    pub fn check_permission(&self, module_path: Option<&str>, target_package: &str) -> bool {
        self.evaluate(module_path, target_package).is_allowed()
    }

    /// Same as [`check_permission`](Self::check_permission), returning the
    /// whole decision
    pub fn evaluate(&self, module_path: Option<&str>, target_package: &str) -> Decision {
        let Some(module_path) = module_path else {
            return Decision {
                module_identity: None,
                target_package: target_package.to_string(),
                verdict: Verdict::Allowed,
                generation: None,
                internal: true,
            };
        };

        let identity = self.resolver.resolve(module_path);
        let table = self.store.snapshot();
        let verdict = table.lookup(identity.as_ref(), target_package);

        debug!(
            "Permission for {} ({}) to {}: {}",
            identity.as_ref().map(ModuleIdentity::as_str).unwrap_or("<unresolved>"),
            module_path,
            target_package,
            verdict
        );

        let event = DecisionEvent::new(identity.clone(), target_package, verdict);
        self.report(&event);

        Decision {
            module_identity: identity,
            target_package: target_package.to_string(),
            verdict,
            generation: Some(table.generation()),
            internal: false,
        }
    }

    fn report(&self, event: &DecisionEvent) {
        match self.notifier.notify(event) {
            Ok(Delivery::Delivered(observers)) => {
                debug!("Decision delivered to {} observers", observers)
            }
            Ok(Delivery::Unobserved) => debug!("No observers for decision"),
            Err(e) => warn!(
                "Failed to report decision for {}: {} ({})",
                event.target_package,
                e,
                e.error_code()
            ),
        }
    }

    /// Replace all permissions with the records read from `reader`.
    ///
    /// On error the previous permissions stay in force. Returns the number
    /// of records read.
    pub fn load_permissions<R: Read>(&self, reader: R) -> GateResult<usize> {
        let records = config::parse(reader, self.schema)
            .inspect_err(|e| warn!("Rejected permissions reload: {}", e))?;
        Ok(self.install(records))
    }

    /// Replace all permissions with the contents of the file at `path`
    pub fn load_permissions_file(&self, path: impl AsRef<Path>) -> GateResult<usize> {
        let path = path.as_ref();
        let records = config::parse_file(path, self.schema)
            .inspect_err(|e| warn!("Rejected permissions reload from {:?}: {}", path, e))?;
        Ok(self.install(records))
    }

    /// Install already-parsed records
    pub fn install(&self, records: Vec<PermissionRecord>) -> usize {
        let count = records.len();
        self.store.reload(records);
        count
    }

    /// Receive every decision made from now on. `None` when the gate was
    /// built with a custom notifier.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<DecisionEvent>> {
        self.events.as_ref().map(BroadcastNotifier::subscribe)
    }

    pub fn store(&self) -> &Arc<PermissionStore> {
        &self.store
    }

    pub fn resolver(&self) -> &Arc<IdentityResolver> {
        &self.resolver
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate")
            .field("schema", &self.schema)
            .field("generation", &self.store.generation())
            .field("modules", &self.store.module_count())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PermissionGate`]
pub struct GateBuilder {
    store: Option<Arc<PermissionStore>>,
    resolver: IdentityResolver,
    notifier: Option<Arc<dyn DecisionNotifier>>,
    notification_capacity: usize,
    schema: SchemaVersion,
}

impl Default for GateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GateBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            resolver: IdentityResolver::new(),
            notifier: None,
            notification_capacity: GateSettings::default().notification_capacity,
            schema: SchemaVersion::default(),
        }
    }

    /// Builder configured from settings. Does not load the permissions file.
    pub fn from_settings(settings: &GateSettings) -> Self {
        let fallback: Option<Arc<dyn FallbackStrategy>> = settings
            .heuristic_fallback
            .then(|| Arc::new(PathSegmentHeuristic) as Arc<dyn FallbackStrategy>);

        let mut builder = Self::new().schema(settings.schema).fallback(fallback);
        builder.notification_capacity = settings.notification_capacity;
        builder
    }

    /// Share an existing store, e.g. with another gate
    pub fn store(mut self, store: Arc<PermissionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Host context the package inspector is acquired from
    pub fn application_context(mut self, context: Arc<dyn ApplicationContext>) -> Self {
        self.resolver = self.resolver.with_context(context);
        self
    }

    pub fn inspector(mut self, inspector: Arc<dyn PackageInspector>) -> Self {
        self.resolver = self.resolver.with_inspector(inspector);
        self
    }

    pub fn fallback(mut self, fallback: Option<Arc<dyn FallbackStrategy>>) -> Self {
        self.resolver = self.resolver.with_fallback(fallback);
        self
    }

    /// Report decisions here instead of the built-in broadcast channel
    pub fn notifier(mut self, notifier: Arc<dyn DecisionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn schema(mut self, schema: SchemaVersion) -> Self {
        self.schema = schema;
        self
    }

    pub fn build(self) -> PermissionGate {
        let (notifier, events) = match self.notifier {
            Some(notifier) => (notifier, None),
            None => {
                let events = BroadcastNotifier::new(self.notification_capacity);
                (Arc::new(events.clone()) as Arc<dyn DecisionNotifier>, Some(events))
            }
        };

        PermissionGate {
            store: self.store.unwrap_or_default(),
            resolver: Arc::new(self.resolver),
            notifier,
            events,
            schema: self.schema,
        }
    }
}
