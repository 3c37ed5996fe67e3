//! Streaming parser for permission records

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::schema::{FlagRecord, ListRecord, SchemaVersion};
use crate::error::{GateError, GateResult};
use crate::types::{PermissionRecord, TargetPermissions};

/// Parse a complete permissions stream.
///
/// The whole stream is consumed; trailing bytes after the top-level array are
/// rejected. Nothing is returned unless every record is well formed.
pub fn parse<R: Read>(reader: R, schema: SchemaVersion) -> GateResult<Vec<PermissionRecord>> {
    let records: Vec<PermissionRecord> = match schema {
        SchemaVersion::V1 => serde_json::from_reader::<_, Vec<FlagRecord>>(reader)?
            .into_iter()
            .map(|r| PermissionRecord::new(r.name, TargetPermissions::Map(r.packages)))
            .collect(),
        SchemaVersion::V2 => serde_json::from_reader::<_, Vec<ListRecord>>(reader)?
            .into_iter()
            .map(|r| {
                let targets: HashSet<String> = r.packages.into_iter().collect();
                PermissionRecord::new(r.name, TargetPermissions::Set(targets))
            })
            .collect(),
    };

    if let Some(index) = records.iter().position(|r| r.module.as_str().is_empty()) {
        return Err(GateError::malformed(format!(
            "record {} has an empty `name`",
            index
        )));
    }

    tracing::debug!(
        "Parsed {} permission records ({} schema)",
        records.len(),
        schema
    );
    Ok(records)
}

/// Parse permissions from an in-memory string
pub fn parse_str(input: &str, schema: SchemaVersion) -> GateResult<Vec<PermissionRecord>> {
    parse(input.as_bytes(), schema)
}

/// Open and parse a permissions file
pub fn parse_file(path: impl AsRef<Path>, schema: SchemaVersion) -> GateResult<Vec<PermissionRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| GateError::io_with_path(e.to_string(), path.display().to_string()))?;
    parse(BufReader::new(file), schema)
}
