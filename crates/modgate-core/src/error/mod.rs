//! Error types for modgate
//!
//! Every fallible operation in the core returns [`GateResult`]. Only reload
//! and settings paths surface errors to callers; identity resolution and
//! decision notification absorb theirs so a permission check always ends in
//! a plain boolean.

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{GateError, GateResult, UnifiedError};
