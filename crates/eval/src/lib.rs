//! Tick story execution runtime -- walks a published story turn by turn.
//!
//! The [`Runtime`] evaluates one turn at a time from the conversation's
//! current state, [`HandlingStep`] and [`ContextStore`]. It never performs
//! I/O: the [`Processor`] runs action handlers and follows triggers, and
//! the caller persists the resulting step (see [`HandlingStep::to_record`]).

pub mod context;
pub mod error;
pub mod handlers;
pub mod processor;
pub mod publish;
pub mod runtime;
pub mod step;

pub use context::ContextStore;
pub use error::{PublishError, RuntimeError};
pub use handlers::{ActionHandler, HandlerRepository};
pub use processor::{ExecutedAction, Processed, Processor};
pub use publish::publish_story;
pub use runtime::{Advance, FollowUp, Runtime, TurnInput, TurnOutcome, UnknownFallback};
pub use step::{ActionStep, HandlingStep, UnknownStep};
