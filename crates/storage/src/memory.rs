//! In-memory `StoryStorage` backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tick_core::Declaration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::record::{compute_etag, HandlingStepRecord, StoryVersionRecord, VersionStatus};
use crate::traits::StoryStorage;

/// Story versions and conversation steps held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    stories: RwLock<HashMap<String, Vec<StoryVersionRecord>>>,
    steps: RwLock<HashMap<String, HandlingStepRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn story_not_found(story_id: &str) -> StorageError {
    StorageError::StoryNotFound {
        story_id: story_id.to_string(),
    }
}

fn version_not_found(story_id: &str, version: u32) -> StorageError {
    StorageError::VersionNotFound {
        story_id: story_id.to_string(),
        version,
    }
}

#[async_trait]
impl StoryStorage for InMemoryStorage {
    async fn save_draft(
        &self,
        declaration: Arc<Declaration>,
    ) -> Result<StoryVersionRecord, StorageError> {
        let etag = compute_etag(&declaration)?;
        let mut stories = self.stories.write().await;
        let versions = stories.entry(declaration.story_id.clone()).or_default();
        let record = StoryVersionRecord {
            story_id: declaration.story_id.clone(),
            version: versions.len() as u32 + 1,
            status: VersionStatus::Draft,
            etag,
            declaration,
        };
        versions.push(record.clone());
        debug!(story = %record.story_id, version = record.version, "draft saved");
        Ok(record)
    }

    async fn publish(
        &self,
        story_id: &str,
        version: u32,
    ) -> Result<StoryVersionRecord, StorageError> {
        let mut stories = self.stories.write().await;
        let versions = stories
            .get_mut(story_id)
            .ok_or_else(|| story_not_found(story_id))?;

        let target = versions
            .iter()
            .position(|record| record.version == version)
            .ok_or_else(|| version_not_found(story_id, version))?;
        let status = versions[target].status;
        if status != VersionStatus::Draft {
            return Err(StorageError::NotADraft {
                story_id: story_id.to_string(),
                version,
                status,
            });
        }

        for record in versions.iter_mut() {
            if record.status == VersionStatus::Current {
                record.status = VersionStatus::Archived;
            }
        }
        versions[target].status = VersionStatus::Current;
        info!(story = %story_id, version, "story version published");
        Ok(versions[target].clone())
    }

    async fn load(&self, story_id: &str, version: u32) -> Result<StoryVersionRecord, StorageError> {
        let stories = self.stories.read().await;
        let versions = stories
            .get(story_id)
            .ok_or_else(|| story_not_found(story_id))?;
        versions
            .iter()
            .find(|record| record.version == version)
            .cloned()
            .ok_or_else(|| version_not_found(story_id, version))
    }

    async fn current(&self, story_id: &str) -> Result<StoryVersionRecord, StorageError> {
        let stories = self.stories.read().await;
        stories
            .get(story_id)
            .and_then(|versions| {
                versions
                    .iter()
                    .find(|record| record.status == VersionStatus::Current)
            })
            .cloned()
            .ok_or_else(|| story_not_found(story_id))
    }

    async fn versions(&self, story_id: &str) -> Result<Vec<StoryVersionRecord>, StorageError> {
        let stories = self.stories.read().await;
        stories
            .get(story_id)
            .cloned()
            .ok_or_else(|| story_not_found(story_id))
    }

    async fn load_step(
        &self,
        conversation_id: &str,
    ) -> Result<Option<HandlingStepRecord>, StorageError> {
        Ok(self.steps.read().await.get(conversation_id).cloned())
    }

    async fn save_step(
        &self,
        conversation_id: &str,
        record: HandlingStepRecord,
    ) -> Result<(), StorageError> {
        self.steps
            .write()
            .await
            .insert(conversation_id.to_string(), record);
        Ok(())
    }

    async fn clear_step(&self, conversation_id: &str) -> Result<(), StorageError> {
        self.steps.write().await.remove(conversation_id);
        Ok(())
    }
}
