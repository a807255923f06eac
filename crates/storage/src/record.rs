use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tick_core::Declaration;

use crate::error::StorageError;

/// Lifecycle of a story version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Current,
    Archived,
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Current => "current",
            VersionStatus::Archived => "archived",
        })
    }
}

/// One immutable version of a story declaration.
///
/// The declaration is shared: conversations started on a version keep
/// their `Arc` after a newer version is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryVersionRecord {
    pub story_id: String,
    pub version: u32,
    pub status: VersionStatus,
    /// SHA-256 of the canonical declaration JSON.
    pub etag: String,
    pub declaration: Arc<Declaration>,
}

/// Kind of handling step persisted for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Action,
    Unknown,
}

/// Persisted shape of a conversation's current handling step.
///
/// `key` is the action name for action steps and the unknown answer
/// config key for unknown steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlingStepRecord {
    pub kind: StepKind,
    pub key: String,
    pub repeated: u32,
}

/// Compute the etag of a declaration.
///
/// Keys are serialized through `serde_json::Value`, whose map is sorted,
/// so equal declarations always hash equally.
pub fn compute_etag(declaration: &Declaration) -> Result<String, StorageError> {
    let canonical = serde_json::to_value(declaration)
        .and_then(|value| serde_json::to_string(&value))
        .map_err(|e| StorageError::Backend(format!("serialization error computing etag: {e}")))?;
    let hash = Sha256::digest(canonical.as_bytes());
    Ok(format!("{:x}", hash))
}
