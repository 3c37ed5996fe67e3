//! Modgate
//!
//! Allow-list permission gate for hooks injected by modules into target
//! applications. The hook host keeps one [`PermissionGate`] for the whole
//! process and asks it before every module hook body runs:
//!
//! ```no_run
//! use modgate::PermissionGate;
//!
//! let gate = PermissionGate::builder().build();
//! gate.load_permissions_file("/etc/modgate/permissions.json")?;
//!
//! if gate.check_permission(Some("/data/app/com.example.mod-1/base.apk"), "com.target.app") {
//!     // run the hook body
//! }
//! # Ok::<(), modgate::GateError>(())
//! ```

pub use modgate_core::*;
