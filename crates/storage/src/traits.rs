use std::sync::Arc;

use async_trait::async_trait;
use tick_core::Declaration;

use crate::error::StorageError;
use crate::record::{HandlingStepRecord, StoryVersionRecord};

/// The storage trait for tick story backends.
///
/// A `StoryStorage` implementation keeps the versions of every story and the
/// current handling step of every conversation.
///
/// ## Versions
///
/// Versions of a story are numbered from 1 in save order and never change
/// once saved. Each version is in one of three states:
///
/// 1. `save_draft()` stores a new `draft` version
/// 2. `publish()` turns a draft into the `current` version; the previous
///    current version, if any, becomes `archived`
/// 3. archived versions stay loadable for conversations still running on them
///
/// At most one version of a story is current at any time.
///
/// ## Handling steps
///
/// A conversation has at most one stored step, replaced as a whole on every
/// turn. Serializing turns of a conversation is the caller's responsibility.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be shared across
/// async task boundaries.
#[async_trait]
pub trait StoryStorage: Send + Sync + 'static {
    // ── Story versions ────────────────────────────────────────────────────────

    /// Store `declaration` as a new draft version of its story.
    async fn save_draft(
        &self,
        declaration: Arc<Declaration>,
    ) -> Result<StoryVersionRecord, StorageError>;

    /// Promote a draft to current, archiving the previous current version.
    ///
    /// Returns `Err(StorageError::NotADraft)` if the version is current or
    /// archived.
    async fn publish(&self, story_id: &str, version: u32)
        -> Result<StoryVersionRecord, StorageError>;

    /// Read one version of a story.
    async fn load(&self, story_id: &str, version: u32) -> Result<StoryVersionRecord, StorageError>;

    /// Read the current version of a story.
    ///
    /// Returns `Err(StorageError::StoryNotFound)` if the story was never
    /// published.
    async fn current(&self, story_id: &str) -> Result<StoryVersionRecord, StorageError>;

    /// Every version of a story, oldest first.
    async fn versions(&self, story_id: &str) -> Result<Vec<StoryVersionRecord>, StorageError>;

    // ── Handling steps ────────────────────────────────────────────────────────

    async fn load_step(
        &self,
        conversation_id: &str,
    ) -> Result<Option<HandlingStepRecord>, StorageError>;

    async fn save_step(
        &self,
        conversation_id: &str,
        record: HandlingStepRecord,
    ) -> Result<(), StorageError>;

    async fn clear_step(&self, conversation_id: &str) -> Result<(), StorageError>;
}
