use std::sync::Arc;

use tick_core::{Declaration, StateMachine, Validator};
use tick_storage::{StoryStorage, StoryVersionRecord};
use tracing::{info, warn};

use crate::error::PublishError;

/// Validate `declaration`, store it as a draft and make it current.
///
/// A declaration with any consistency violation is never stored.
pub async fn publish_story(
    storage: &dyn StoryStorage,
    validator: &Validator<'_>,
    declaration: Arc<Declaration>,
) -> Result<StoryVersionRecord, PublishError> {
    let machine = StateMachine::new(declaration.state_machine.clone());
    let violations = validator.validate(&declaration, &machine);
    if !violations.is_empty() {
        warn!(
            story = %declaration.story_id,
            violations = violations.len(),
            "refusing to publish inconsistent story"
        );
        return Err(PublishError::Inconsistent(violations));
    }

    let draft = storage.save_draft(declaration).await?;
    let record = storage.publish(&draft.story_id, draft.version).await?;
    info!(story = %record.story_id, version = record.version, etag = %record.etag, "story published");
    Ok(record)
}
