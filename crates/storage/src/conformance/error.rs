use std::future::Future;

use super::{make_declaration, TestResult};
use crate::{StorageError, StoryStorage, VersionStatus};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "error",
            "current_of_unknown_story",
            current_of_unknown_story(factory).await,
        ),
        TestResult::from_result(
            "error",
            "load_unknown_version",
            load_unknown_version(factory).await,
        ),
        TestResult::from_result(
            "error",
            "publish_unknown_story",
            publish_unknown_story(factory).await,
        ),
        TestResult::from_result(
            "error",
            "publish_twice_is_not_a_draft",
            publish_twice_is_not_a_draft(factory).await,
        ),
    ]
}

async fn current_of_unknown_story<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.current("nowhere").await {
        Err(StorageError::StoryNotFound { story_id }) if story_id == "nowhere" => Ok(()),
        other => Err(format!("expected StoryNotFound, got {:?}", other)),
    }
}

async fn load_unknown_version<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_draft(make_declaration("greeting", 1))
        .await
        .map_err(|e| e.to_string())?;
    match s.load("greeting", 7).await {
        Err(StorageError::VersionNotFound { story_id, version })
            if story_id == "greeting" && version == 7 =>
        {
            Ok(())
        }
        other => Err(format!("expected VersionNotFound, got {:?}", other)),
    }
}

async fn publish_unknown_story<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.publish("nowhere", 1).await {
        Err(StorageError::StoryNotFound { .. }) => Ok(()),
        other => Err(format!("expected StoryNotFound, got {:?}", other)),
    }
}

async fn publish_twice_is_not_a_draft<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_draft(make_declaration("greeting", 1))
        .await
        .map_err(|e| e.to_string())?;
    s.publish("greeting", 1).await.map_err(|e| e.to_string())?;
    match s.publish("greeting", 1).await {
        Err(StorageError::NotADraft {
            status: VersionStatus::Current,
            ..
        }) => Ok(()),
        other => Err(format!("expected NotADraft(current), got {:?}", other)),
    }
}
