//! Artifact encoding: pretty JSON, sorted keys, four-space indent.

use crate::error::StorageError;
use crate::types::Fields;
use serde::Serialize;
use std::path::Path;

/// Encode fields as an artifact body. NaN and infinite floats are refused,
/// since JSON would turn them into `null`.
pub fn encode(fields: &Fields) -> Result<Vec<u8>, serde_json::Error> {
    if let Some((key, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
        return Err(serde::ser::Error::custom(format!(
            "field '{}' holds a non-finite float",
            key
        )));
    }
    let mut out = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    fields.serialize(&mut ser)?;
    Ok(out)
}

/// Decode an artifact; anything that is not a JSON object is corrupt
pub fn decode(path: &Path, bytes: &[u8]) -> Result<Fields, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::corrupt(path, e))
}
