//! Instance identity and version handles.

use crate::bag::stamp::VersionStamp;
use crate::error::StorageError;
use std::fmt;
use std::path::PathBuf;

/// Globally unique instance token, minted once per bag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    /// Mint a fresh id (32 lowercase hex characters)
    pub fn mint() -> Self {
        InstanceId(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Accept an existing token read back from a path
    pub fn parse(token: &str) -> Result<Self, StorageError> {
        if token.is_empty() || token.contains(['/', '\\']) || token.starts_with('.') {
            return Err(StorageError::InvalidHandle(format!(
                "bad instance id '{}'",
                token
            )));
        }
        Ok(InstanceId(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that a type tag names a single directory below the store root
pub fn validate_kind(kind: &str) -> Result<(), StorageError> {
    if kind.is_empty() || kind.contains(['/', '\\']) || kind.starts_with('.') {
        return Err(StorageError::InvalidHandle(format!("bad type tag '{}'", kind)));
    }
    Ok(())
}

/// Identifies one version of one instance: `<TypeTag>/<InstanceId>/<date>/<time>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: String,
    pub instance: InstanceId,
    pub version: VersionStamp,
}

impl Handle {
    pub fn new(kind: impl Into<String>, instance: InstanceId, version: VersionStamp) -> Self {
        Self {
            kind: kind.into(),
            instance,
            version,
        }
    }

    /// Parse a handle from any path ending in the handle layout.
    ///
    /// Only the last four components are used, so both relative handles and
    /// absolute artifact paths resolve.
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        let normalized = path.replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() < 4 {
            return Err(StorageError::InvalidHandle(path.to_string()));
        }
        let tail = &parts[parts.len() - 4..];
        let version = VersionStamp::from_segments(tail[2], tail[3])
            .ok_or_else(|| StorageError::InvalidHandle(path.to_string()))?;
        validate_kind(tail[0])?;
        Ok(Self {
            kind: tail[0].to_string(),
            instance: InstanceId::parse(tail[1])?,
            version,
        })
    }

    /// Path of the artifact relative to the store root
    pub fn relative_path(&self, colon_substitute: bool) -> PathBuf {
        PathBuf::from(&self.kind)
            .join(self.instance.as_str())
            .join(self.version.date_segment())
            .join(self.version.time_segment(colon_substitute))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.instance, self.version)
    }
}
