//! Full turn processing: evaluate, run handlers, follow triggers.

use tracing::debug;

use crate::error::RuntimeError;
use crate::handlers::HandlerRepository;
use crate::runtime::{FollowUp, Runtime, TurnInput, TurnOutcome};

/// An action executed while processing a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedAction {
    pub action: String,
    pub answer_id: Option<String>,
    pub repeated: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    /// Outcome of the last evaluation of the turn.
    pub outcome: TurnOutcome,
    /// Actions run, in order.
    pub executed: Vec<ExecutedAction>,
}

/// Runs a user turn to completion.
///
/// After each action its handler runs and produced contexts are merged. An
/// action with a trigger re-enters evaluation with the trigger as event,
/// until an action waits for the user, ends, or hands the conversation off.
pub struct Processor<'a> {
    runtime: &'a Runtime,
    handlers: &'a HandlerRepository,
}

impl<'a> Processor<'a> {
    pub fn new(runtime: &'a Runtime, handlers: &'a HandlerRepository) -> Self {
        Processor { runtime, handlers }
    }

    pub fn process(&self, input: TurnInput) -> Result<Processed, RuntimeError> {
        let limit = self.runtime.declaration().actions.len() + 1;
        let mut input = input;
        let mut executed = Vec::new();

        loop {
            let mut outcome = self.runtime.step(&input)?;

            let mut trigger = None;
            if let TurnOutcome::Advance(advance) = &mut outcome {
                if let Some(handler) = advance.action.handler_name() {
                    let produced = self.handlers.invoke(handler, &advance.contexts)?;
                    advance.contexts.merge(produced);
                }
                executed.push(ExecutedAction {
                    action: advance.action.name.clone(),
                    answer_id: advance.action.answer_id.clone(),
                    repeated: advance.step.repeated(),
                });
                if let FollowUp::Trigger(name) = advance.follow_up() {
                    trigger = Some(name);
                }
            }

            let Some(trigger) = trigger else {
                return Ok(Processed { outcome, executed });
            };
            if executed.len() >= limit {
                return Err(RuntimeError::TriggerLoop { limit });
            }
            debug!(trigger = %trigger, "following action trigger");
            input = TurnInput::after(&outcome, Some(trigger));
        }
    }
}
