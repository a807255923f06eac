use std::future::Future;

use super::TestResult;
use crate::{HandlingStepRecord, StepKind, StoryStorage};

pub(super) async fn run_step_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "steps",
            "missing_step_is_none",
            missing_step_is_none(factory).await,
        ),
        TestResult::from_result(
            "steps",
            "saved_step_round_trips",
            saved_step_round_trips(factory).await,
        ),
        TestResult::from_result(
            "steps",
            "save_replaces_previous_step",
            save_replaces_previous_step(factory).await,
        ),
        TestResult::from_result(
            "steps",
            "clear_removes_only_that_conversation",
            clear_removes_only_that_conversation(factory).await,
        ),
    ]
}

fn make_step(kind: StepKind, key: &str, repeated: u32) -> HandlingStepRecord {
    HandlingStepRecord {
        kind,
        key: key.to_string(),
        repeated,
    }
}

async fn missing_step_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.load_step("conv-1").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected Ok(None), got {:?}", other)),
    }
}

async fn saved_step_round_trips<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let step = make_step(StepKind::Action, "WELCOME", 1);
    s.save_step("conv-1", step.clone())
        .await
        .map_err(|e| e.to_string())?;
    match s.load_step("conv-1").await {
        Ok(Some(loaded)) if loaded == step => Ok(()),
        other => Err(format!("expected {:?}, got {:?}", step, other)),
    }
}

async fn save_replaces_previous_step<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_step("conv-1", make_step(StepKind::Action, "ASK_CITY", 1))
        .await
        .map_err(|e| e.to_string())?;
    let replacement = make_step(StepKind::Unknown, "ASK_CITY", 1);
    s.save_step("conv-1", replacement.clone())
        .await
        .map_err(|e| e.to_string())?;
    match s.load_step("conv-1").await {
        Ok(Some(loaded)) if loaded == replacement => Ok(()),
        other => Err(format!("expected {:?}, got {:?}", replacement, other)),
    }
}

async fn clear_removes_only_that_conversation<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_step("conv-1", make_step(StepKind::Action, "WELCOME", 2))
        .await
        .map_err(|e| e.to_string())?;
    s.save_step("conv-2", make_step(StepKind::Action, "WELCOME", 1))
        .await
        .map_err(|e| e.to_string())?;
    s.clear_step("conv-1").await.map_err(|e| e.to_string())?;

    if !matches!(s.load_step("conv-1").await, Ok(None)) {
        return Err("conv-1 step still present after clear".to_string());
    }
    if !matches!(s.load_step("conv-2").await, Ok(Some(_))) {
        return Err("conv-2 step removed by clearing conv-1".to_string());
    }
    // Clearing an absent step is not an error
    s.clear_step("conv-3").await.map_err(|e| e.to_string())
}
