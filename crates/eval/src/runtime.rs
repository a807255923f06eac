//! Turn evaluation: walk the state machine for one recognized event.
//!
//! [`Runtime::step`] is pure. It reads the conversation's current state,
//! handling step and contexts, and returns what should happen next; running
//! handlers, answering and persisting the new step are the caller's job.
//!
//! A turn either advances to an action, falls back to an unknown answer,
//! or overflows: the same step would repeat more than `repetitionNb` times
//! and the conversation is redirected to another story.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tick_core::{Declaration, StateMachine, TickAction, UNKNOWN_INTENT};
use tracing::{debug, warn};

use crate::context::ContextStore;
use crate::error::RuntimeError;
use crate::step::{unknown_answer_for, HandlingStep};

// ──────────────────────────────────────────────
// Turn input and outcome
// ──────────────────────────────────────────────

/// Everything known about a conversation at the start of a turn.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub current_step: Option<HandlingStep>,
    /// Last state reached; the machine root when the conversation starts.
    pub current_state: Option<String>,
    /// Recognized intent or trigger; `None` when nothing was recognized.
    pub event: Option<String>,
    /// Entity role -> recognized value.
    pub entities: BTreeMap<String, String>,
    pub contexts: ContextStore,
}

impl TurnInput {
    pub fn event(event: impl Into<String>) -> Self {
        TurnInput {
            event: Some(event.into()),
            ..Default::default()
        }
    }

    /// Input for the turn following `outcome`, carrying its state, step
    /// and contexts over.
    pub fn after(outcome: &TurnOutcome, event: Option<String>) -> Self {
        let (current_state, current_step, contexts) = match outcome {
            TurnOutcome::Advance(advance) => (
                Some(advance.next_state.clone()),
                Some(advance.step.clone()),
                advance.contexts.clone(),
            ),
            TurnOutcome::Unknown(fallback) => (
                Some(fallback.state.clone()),
                Some(fallback.step.clone()),
                fallback.contexts.clone(),
            ),
            TurnOutcome::Unhandled { state, contexts } => {
                (Some(state.clone()), None, contexts.clone())
            }
            TurnOutcome::Overflow { .. } => (None, None, ContextStore::new()),
        };
        TurnInput {
            current_step,
            current_state,
            event,
            entities: BTreeMap::new(),
            contexts,
        }
    }

    pub fn with_entity(mut self, role: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(role.into(), value.into());
        self
    }
}

/// The action a turn moved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    /// Leaf state bound to `action`.
    pub next_state: String,
    pub step: HandlingStep,
    pub contexts: ContextStore,
    /// Inputs of `action` present but still unresolved.
    pub contexts_to_resolve: BTreeSet<String>,
    pub action: TickAction,
    /// Story the conversation is handed over to after `action`.
    pub handoff: Option<String>,
}

/// What the caller does once the action of an [`Advance`] ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Evaluate another turn with this trigger as event.
    Trigger(String),
    /// Hand the conversation over to another story.
    Handoff(String),
    /// The task is complete.
    End,
    AwaitUser,
}

impl Advance {
    pub fn follow_up(&self) -> FollowUp {
        if let Some(trigger) = self.action.trigger_name() {
            return FollowUp::Trigger(trigger.to_string());
        }
        if let Some(story) = self.handoff.as_deref().filter(|s| !s.trim().is_empty()) {
            return FollowUp::Handoff(story.to_string());
        }
        if self.action.is_final {
            return FollowUp::End;
        }
        FollowUp::AwaitUser
    }

    /// The action sends no answer by itself.
    pub fn is_silent(&self) -> bool {
        self.action.is_silent()
    }
}

/// The user was not understood, or the target action could not run.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownFallback {
    /// Unchanged current state.
    pub state: String,
    pub step: HandlingStep,
    pub answer_id: String,
    pub contexts: ContextStore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Advance(Advance),
    Unknown(UnknownFallback),
    /// Repetition limit exceeded; the task run ends here.
    Overflow { redirect_story: String },
    /// Not understood and no unknown answer applies; nothing changes.
    Unhandled { state: String, contexts: ContextStore },
}

// ──────────────────────────────────────────────
// Runtime
// ──────────────────────────────────────────────

/// Executes turns of one story version.
///
/// Cheap to clone; the declaration is shared with every conversation
/// running on this version.
#[derive(Debug, Clone)]
pub struct Runtime {
    declaration: Arc<Declaration>,
    machine: Arc<StateMachine>,
}

impl Runtime {
    /// Build the runtime of a validated declaration.
    ///
    /// Fails when the state machine has duplicate states or self-loops.
    pub fn new(declaration: Arc<Declaration>) -> Result<Self, RuntimeError> {
        let machine = StateMachine::try_new(declaration.state_machine.clone())?;
        Ok(Runtime {
            declaration,
            machine: Arc::new(machine),
        })
    }

    pub fn declaration(&self) -> &Arc<Declaration> {
        &self.declaration
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Evaluate one turn.
    pub fn step(&self, input: &TurnInput) -> Result<TurnOutcome, RuntimeError> {
        let state = match input.current_state.as_deref() {
            Some(id) => self
                .machine
                .state(id)
                .ok_or_else(|| RuntimeError::StateNotFound {
                    state: id.to_string(),
                })?,
            None => self.machine.root(),
        };
        let contexts = self.update_contexts(input);

        let Some(event) = input.event.as_deref() else {
            return self.unknown(&state.id, input.current_step.as_ref(), contexts);
        };
        if self.declaration.is_unknown_intent(event) {
            return self.unknown(&state.id, input.current_step.as_ref(), contexts);
        }
        let Some(target) = self.machine.next(&state.id, event) else {
            debug!(state = %state.id, event, "no transition for event");
            return self.unknown(&state.id, input.current_step.as_ref(), contexts);
        };

        let action = self.declaration.action(&target.id).ok_or_else(|| {
            RuntimeError::ActionNotDeclared {
                action: target.id.clone(),
            }
        })?;

        let missing: Vec<&str> = action
            .input_context_names
            .iter()
            .map(String::as_str)
            .filter(|name| !contexts.contains(name))
            .collect();
        if !missing.is_empty() {
            debug!(action = %action.name, ?missing, "input contexts missing");
            return self.unknown(&state.id, input.current_step.as_ref(), contexts);
        }

        let step = match &input.current_step {
            Some(current @ HandlingStep::Action(_)) if current.key() == action.name => {
                current.next()
            }
            _ => HandlingStep::action(action.name.clone()),
        };
        if let Some(overflow) = self.overflow(&step) {
            return Ok(overflow);
        }

        let contexts_to_resolve = action
            .input_context_names
            .iter()
            .filter(|name| !contexts.is_resolved(name))
            .cloned()
            .collect();

        debug!(
            state = %target.id,
            action = %action.name,
            repeated = step.repeated(),
            "turn advanced"
        );
        Ok(TurnOutcome::Advance(Advance {
            next_state: target.id.clone(),
            step,
            contexts,
            contexts_to_resolve,
            action: action.clone(),
            handoff: action.target_story.clone(),
        }))
    }

    /// Contexts after applying the turn's intent associations and entities.
    fn update_contexts(&self, input: &TurnInput) -> ContextStore {
        let mut contexts = input.contexts.clone();

        // Associations first: a value recognized in this turn must not be
        // masked by an unresolved association placeholder.
        if let (Some(event), Some(step)) = (input.event.as_deref(), &input.current_step) {
            for name in self
                .declaration
                .associated_contexts(event, step.action_name())
            {
                contexts.insert_unresolved(name);
            }
        }

        for context in &self.declaration.contexts {
            let Some(role) = context.entity_role.as_deref() else {
                continue;
            };
            if let Some(value) = input.entities.get(role) {
                contexts.insert(context.name.clone(), value.clone());
            }
        }
        contexts
    }

    fn unknown(
        &self,
        state: &str,
        current: Option<&HandlingStep>,
        contexts: ContextStore,
    ) -> Result<TurnOutcome, RuntimeError> {
        // The state is the conversation's position: when it is bound to an
        // action, that action is the active one.
        let active_action = if self.declaration.action(state).is_some() {
            state
        } else {
            current.map(HandlingStep::action_name).unwrap_or(state)
        };
        let Some(config) = unknown_answer_for(&self.declaration, active_action) else {
            debug!(state, "no unknown answer applies");
            return Ok(TurnOutcome::Unhandled {
                state: state.to_string(),
                contexts,
            });
        };

        let step = match current {
            Some(current @ HandlingStep::Unknown(_)) if current.key() == config.key() => {
                current.next()
            }
            _ => HandlingStep::unknown(config.clone()),
        };
        if let Some(overflow) = self.overflow(&step) {
            return Ok(overflow);
        }

        debug!(state, action = active_action, repeated = step.repeated(), "unknown answer");
        Ok(TurnOutcome::Unknown(UnknownFallback {
            state: state.to_string(),
            step,
            answer_id: config.answer_id,
            contexts,
        }))
    }

    /// Without a configured redirect story the conversation goes to the
    /// `unknown` story.
    fn overflow(&self, step: &HandlingStep) -> Option<TurnOutcome> {
        let settings = &self.declaration.settings;
        if step.repeated() <= settings.repetition_nb {
            return None;
        }
        let redirect_story = settings
            .redirect_story
            .clone()
            .filter(|story| !story.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_INTENT.to_string());
        warn!(
            story = %self.declaration.story_id,
            key = step.key(),
            redirect = %redirect_story,
            "repetition limit exceeded"
        );
        Some(TurnOutcome::Overflow { redirect_story })
    }
}
