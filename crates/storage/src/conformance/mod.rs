//! Conformance test suite for `StoryStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `StoryStorage` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Drafts**: version numbering, etags, loading
//! - **Publishing**: draft to current, archiving of the previous current
//! - **Handling steps**: save, replace, clear per conversation
//! - **Error handling**: correct error variants for invalid operations
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use tick_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn redis_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_redis_storage().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod error;
mod steps;
mod versions;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tick_core::{Declaration, State, TickAction};

use crate::StoryStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "versions", "steps").
    pub category: String,
    /// Test name (e.g. "first_draft_is_version_1").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: StoryStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(versions::run_version_tests(&factory).await);
    results.extend(steps::run_step_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Minimal consistent story whose welcome answer varies per revision.
fn make_declaration(story_id: &str, revision: u32) -> Arc<Declaration> {
    Arc::new(Declaration {
        story_id: story_id.to_string(),
        description: format!("revision {revision}"),
        state_machine: State::new("Global")
            .with_initial("WELCOME")
            .with_child(State::new("WELCOME"))
            .with_transition("greet", "#WELCOME"),
        main_intent: "greet".to_string(),
        actions: vec![TickAction::new("WELCOME").with_answer(format!("welcome_{revision}"))],
        ..Default::default()
    })
}
