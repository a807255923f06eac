//! tick-core: Tick story declaration model, state machine and consistency
//! validator.
//!
//! A tick story is a task-oriented conversation: a [`Declaration`] of
//! intents, triggers, contexts and actions bound to a hierarchical
//! [`StateMachine`]. Before a story is published the [`Validator`] proves
//! that both agree; the execution runtime (tick-eval) then walks the machine
//! turn by turn.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`State`], [`StateMachine`] -- the hierarchical state machine model
//! - [`Declaration`] and its parts ([`TickAction`], [`TickContext`],
//!   [`TickIntent`], [`UnknownAnswerConfig`], [`StorySettings`])
//! - [`Validator`], [`Violations`], [`Violation`], [`Rule`] -- consistency checks
//! - [`HandlerRegistry`], [`StoryCatalog`] -- external collaborators
//! - [`parse_declaration()`], [`load_declaration()`] -- story documents

/// Intent name reported by the NLP layer when nothing was understood.
pub const UNKNOWN_INTENT: &str = "unknown";

pub mod declaration;
pub mod document;
pub mod error;
pub mod registry;
pub mod statemachine;
pub mod validate;

// ── Convenience re-exports: key types ────────────────────────────────

pub use declaration::{
    Declaration, StorySettings, TickAction, TickContext, TickIntent, TickIntentAssociation,
    UnknownAnswerConfig,
};
pub use error::{DocumentError, MachineError};
pub use registry::{HandlerRegistry, StoryCatalog};
pub use statemachine::{State, StateMachine};
pub use validate::{Rule, Validator, Violation, Violations};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use document::{load_declaration, parse_declaration, STORY_SCHEMA};
pub use validate::validate;
