use std::future::Future;

use super::{make_declaration, TestResult};
use crate::{compute_etag, StoryStorage, VersionStatus};

pub(super) async fn run_version_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "versions",
            "first_draft_is_version_1",
            first_draft_is_version_1(factory).await,
        ),
        TestResult::from_result(
            "versions",
            "drafts_number_sequentially",
            drafts_number_sequentially(factory).await,
        ),
        TestResult::from_result(
            "versions",
            "draft_carries_etag",
            draft_carries_etag(factory).await,
        ),
        TestResult::from_result(
            "versions",
            "publish_makes_draft_current",
            publish_makes_draft_current(factory).await,
        ),
        TestResult::from_result(
            "versions",
            "publish_archives_previous_current",
            publish_archives_previous_current(factory).await,
        ),
        TestResult::from_result(
            "versions",
            "archived_version_stays_loadable",
            archived_version_stays_loadable(factory).await,
        ),
        TestResult::from_result(
            "versions",
            "stories_are_independent",
            stories_are_independent(factory).await,
        ),
    ]
}

// ── 1. First draft of a story is version 1 ───────────────────────────────────

async fn first_draft_is_version_1<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let record = s
        .save_draft(make_declaration("greeting", 1))
        .await
        .map_err(|e| e.to_string())?;
    if record.version != 1 {
        return Err(format!("expected version 1, got {}", record.version));
    }
    if record.status != VersionStatus::Draft {
        return Err(format!("expected draft, got {}", record.status));
    }
    Ok(())
}

// ── 2. Later drafts get increasing version numbers ───────────────────────────

async fn drafts_number_sequentially<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for revision in 1..=3 {
        let record = s
            .save_draft(make_declaration("greeting", revision))
            .await
            .map_err(|e| e.to_string())?;
        if record.version != revision {
            return Err(format!(
                "expected version {}, got {}",
                revision, record.version
            ));
        }
    }
    let versions = s.versions("greeting").await.map_err(|e| e.to_string())?;
    let numbers: Vec<u32> = versions.iter().map(|r| r.version).collect();
    if numbers != vec![1, 2, 3] {
        return Err(format!("expected versions [1, 2, 3], got {:?}", numbers));
    }
    Ok(())
}

// ── 3. Draft etag is the declaration hash ────────────────────────────────────

async fn draft_carries_etag<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let declaration = make_declaration("greeting", 1);
    let expected = compute_etag(&declaration).map_err(|e| e.to_string())?;
    let record = s
        .save_draft(declaration)
        .await
        .map_err(|e| e.to_string())?;
    if record.etag != expected {
        return Err(format!("expected etag {}, got {}", expected, record.etag));
    }
    let loaded = s.load("greeting", 1).await.map_err(|e| e.to_string())?;
    if loaded.etag != expected {
        return Err(format!("loaded etag {} differs from {}", loaded.etag, expected));
    }
    Ok(())
}

// ── 4. Publishing a draft makes it the current version ───────────────────────

async fn publish_makes_draft_current<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_draft(make_declaration("greeting", 1))
        .await
        .map_err(|e| e.to_string())?;
    let published = s.publish("greeting", 1).await.map_err(|e| e.to_string())?;
    if published.status != VersionStatus::Current {
        return Err(format!("expected current, got {}", published.status));
    }
    let current = s.current("greeting").await.map_err(|e| e.to_string())?;
    if current.version != 1 {
        return Err(format!("expected current version 1, got {}", current.version));
    }
    Ok(())
}

// ── 5. Publishing archives the previous current version ──────────────────────

async fn publish_archives_previous_current<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for revision in 1..=2 {
        s.save_draft(make_declaration("greeting", revision))
            .await
            .map_err(|e| e.to_string())?;
    }
    s.publish("greeting", 1).await.map_err(|e| e.to_string())?;
    s.publish("greeting", 2).await.map_err(|e| e.to_string())?;

    let statuses: Vec<VersionStatus> = s
        .versions("greeting")
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(|r| r.status)
        .collect();
    if statuses != vec![VersionStatus::Archived, VersionStatus::Current] {
        return Err(format!(
            "expected [archived, current], got {:?}",
            statuses
        ));
    }
    Ok(())
}

// ── 6. Archived versions keep their declaration ──────────────────────────────

async fn archived_version_stays_loadable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let original = make_declaration("greeting", 1);
    s.save_draft(original.clone())
        .await
        .map_err(|e| e.to_string())?;
    s.save_draft(make_declaration("greeting", 2))
        .await
        .map_err(|e| e.to_string())?;
    s.publish("greeting", 1).await.map_err(|e| e.to_string())?;
    s.publish("greeting", 2).await.map_err(|e| e.to_string())?;

    let archived = s.load("greeting", 1).await.map_err(|e| e.to_string())?;
    if archived.status != VersionStatus::Archived {
        return Err(format!("expected archived, got {}", archived.status));
    }
    if *archived.declaration != *original {
        return Err("archived declaration differs from the saved one".to_string());
    }
    Ok(())
}

// ── 7. Versions of different stories do not interfere ────────────────────────

async fn stories_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_draft(make_declaration("greeting", 1))
        .await
        .map_err(|e| e.to_string())?;
    let other = s
        .save_draft(make_declaration("weather", 1))
        .await
        .map_err(|e| e.to_string())?;
    if other.version != 1 {
        return Err(format!(
            "expected weather version 1, got {}",
            other.version
        ));
    }
    s.publish("weather", 1).await.map_err(|e| e.to_string())?;
    if s.current("greeting").await.is_ok() {
        return Err("greeting has no published version but current() succeeded".to_string());
    }
    Ok(())
}
