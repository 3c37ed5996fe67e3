//! Modgate Core Library
//!
//! Permission gate for hook-injected modules. Before a module's hook runs
//! against another application, the hook machinery asks the gate whether
//! that module was granted access to that application.
//!
//! Components, leaf first:
//! - [`config`]: parses the permissions configuration stream
//! - [`store`]: holds the current permission table, replaced wholesale on reload
//! - [`resolver`]: turns a module path into a module identity
//! - [`notifier`]: reports decisions to observers, best effort
//! - [`engine`]: ties the above together behind [`PermissionGate`]
//!
//! ```
//! use modgate_core::PermissionGate;
//!
//! let gate = PermissionGate::builder().build();
//! gate.load_permissions(
//!     r#"[{"name":"com.example.mod","packages":["com.target.app"]}]"#.as_bytes(),
//! )?;
//!
//! let module = Some("/data/app/com.example.mod-1/base.apk");
//! assert!(gate.check_permission(module, "com.target.app"));
//! assert!(!gate.check_permission(module, "com.other.app"));
//! # Ok::<(), modgate_core::GateError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod notifier;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod types;
pub mod watcher;

// Re-export commonly used types
pub use config::SchemaVersion;
pub use engine::{Decision, GateBuilder, PermissionGate};
pub use error::{GateError, GateResult, UnifiedError};
pub use notifier::{
    BroadcastNotifier, CallbackNotifier, DecisionEvent, DecisionNotifier, Delivery,
    JsonLinesNotifier, NoopNotifier,
};
pub use resolver::{
    ApplicationContext, DeferredContext, FallbackStrategy, IdentityResolver, PackageInspector,
    PathSegmentHeuristic, ResolutionSource, ResolverStats,
};
pub use settings::GateSettings;
pub use store::{PermissionStore, PermissionTable};
pub use types::{ModuleIdentity, PermissionRecord, TargetPermissions, Verdict};
pub use watcher::PermissionsWatcher;
