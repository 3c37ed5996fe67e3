//! Permissions configuration parsing
//!
//! The configuration is a JSON array of module records. Two record shapes
//! exist and the caller must say which one a stream uses:
//!
//! ```json
//! // v2: presence of a target grants it
//! [{"name": "com.example.mod", "packages": ["com.target.app"]}]
//!
//! // v1: explicit grant flag per target
//! [{"name": "com.example.mod", "packages": {"com.target.app": true}}]
//! ```

mod parser;
mod schema;

pub use parser::{parse, parse_file, parse_str};
pub use schema::SchemaVersion;
