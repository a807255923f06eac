//! Story declaration model.
//!
//! A [`Declaration`] is the aggregate root of a tick story: the state
//! machine plus every intent, trigger, context and action bound to it.
//! It is an immutable value; an edit produces a whole new declaration.
//! Field names follow the persisted document shape (camelCase).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::statemachine::State;
use crate::UNKNOWN_INTENT;

/// Default maximum number of consecutive repetitions of a handling step.
pub const DEFAULT_REPETITION_NB: u32 = 2;

// ──────────────────────────────────────────────
// Actions and contexts
// ──────────────────────────────────────────────

/// A unit of bot behavior, bound to the leaf state of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickAction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// Story to hand the conversation over to once this action ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_story: Option<String>,
    #[serde(default)]
    pub input_context_names: BTreeSet<String>,
    #[serde(default)]
    pub output_context_names: BTreeSet<String>,
    /// Ends the task.
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

impl TickAction {
    pub fn new(name: impl Into<String>) -> Self {
        TickAction {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_answer(mut self, answer_id: impl Into<String>) -> Self {
        self.answer_id = Some(answer_id.into());
        self
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn with_target_story(mut self, story_id: impl Into<String>) -> Self {
        self.target_story = Some(story_id.into());
        self
    }

    pub fn with_inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_context_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_context_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn finishing(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Non-blank handler name.
    pub fn handler_name(&self) -> Option<&str> {
        non_blank(self.handler.as_deref())
    }

    /// Non-blank trigger name.
    pub fn trigger_name(&self) -> Option<&str> {
        non_blank(self.trigger.as_deref())
    }

    /// A silent action produces no reply by itself: it runs a handler or
    /// emits a trigger.
    pub fn is_silent(&self) -> bool {
        self.handler_name().is_some() || self.trigger_name().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A named slot of dataflow state threaded through a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickContext {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub context_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Entity role whose recognized value fills this context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_role: Option<String>,
}

impl TickContext {
    pub fn new(name: impl Into<String>) -> Self {
        TickContext {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn bound_to(mut self, entity_type: impl Into<String>, entity_role: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_role = Some(entity_role.into());
        self
    }
}

// ──────────────────────────────────────────────
// Intents
// ──────────────────────────────────────────────

/// Contexts an intent provides when it is recognized right after an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickIntentAssociation {
    pub action_name: String,
    #[serde(default)]
    pub context_names: BTreeSet<String>,
}

/// A secondary intent with its context associations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickIntent {
    pub intent_name: String,
    #[serde(default)]
    pub associations: Vec<TickIntentAssociation>,
}

impl TickIntent {
    pub fn new(intent_name: impl Into<String>) -> Self {
        TickIntent {
            intent_name: intent_name.into(),
            associations: Vec::new(),
        }
    }

    pub fn with_association<I, S>(mut self, action_name: impl Into<String>, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associations.push(TickIntentAssociation {
            action_name: action_name.into(),
            context_names: contexts.into_iter().map(Into::into).collect(),
        });
        self
    }
}

// ──────────────────────────────────────────────
// Unknown handling and settings
// ──────────────────────────────────────────────

/// Answer given when the user is not understood while `action` is active.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownAnswerConfig {
    #[serde(default = "default_unknown_intent")]
    pub intent: String,
    pub action: String,
    pub answer_id: String,
}

impl UnknownAnswerConfig {
    pub fn new(action: impl Into<String>, answer_id: impl Into<String>) -> Self {
        UnknownAnswerConfig {
            intent: default_unknown_intent(),
            action: action.into(),
            answer_id: answer_id.into(),
        }
    }

    /// Identity of the config for repetition tracking.
    pub fn key(&self) -> &str {
        &self.action
    }
}

fn default_unknown_intent() -> String {
    UNKNOWN_INTENT.to_string()
}

/// Story-level execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySettings {
    /// Maximum number of consecutive executions of the same step.
    #[serde(default = "default_repetition_nb")]
    pub repetition_nb: u32,
    /// Story the conversation is redirected to on repetition overflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_story: Option<String>,
    /// Answer used when no unknown config matches the active action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_answer_id: Option<String>,
}

fn default_repetition_nb() -> u32 {
    DEFAULT_REPETITION_NB
}

impl Default for StorySettings {
    fn default() -> Self {
        StorySettings {
            repetition_nb: DEFAULT_REPETITION_NB,
            redirect_story: None,
            unknown_answer_id: None,
        }
    }
}

// ──────────────────────────────────────────────
// Declaration
// ──────────────────────────────────────────────

/// Full description of a tick story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    #[serde(default)]
    pub story_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub state_machine: State,
    pub main_intent: String,
    #[serde(default)]
    pub primary_intents: BTreeSet<String>,
    #[serde(default)]
    pub secondary_intents: BTreeSet<String>,
    #[serde(default)]
    pub triggers: BTreeSet<String>,
    #[serde(default)]
    pub contexts: Vec<TickContext>,
    #[serde(default)]
    pub actions: Vec<TickAction>,
    #[serde(default)]
    pub intents_contexts: Vec<TickIntent>,
    #[serde(default)]
    pub unknown_answer_configs: Vec<UnknownAnswerConfig>,
    #[serde(default)]
    pub settings: StorySettings,
}

impl Declaration {
    pub fn action(&self, name: &str) -> Option<&TickAction> {
        self.actions.iter().find(|action| action.name == name)
    }

    pub fn context(&self, name: &str) -> Option<&TickContext> {
        self.contexts.iter().find(|context| context.name == name)
    }

    /// `{main} ∪ primary ∪ secondary`.
    pub fn intents(&self) -> BTreeSet<&str> {
        std::iter::once(self.main_intent.as_str())
            .chain(self.primary_intents.iter().map(String::as_str))
            .chain(self.secondary_intents.iter().map(String::as_str))
            .collect()
    }

    /// Every intent and trigger, i.e. every legal transition label.
    pub fn events(&self) -> BTreeSet<&str> {
        let mut events = self.intents();
        events.extend(self.triggers.iter().map(String::as_str));
        events
    }

    pub fn action_names(&self) -> BTreeSet<&str> {
        self.actions.iter().map(|action| action.name.as_str()).collect()
    }

    pub fn context_names(&self) -> BTreeSet<&str> {
        self.contexts
            .iter()
            .map(|context| context.name.as_str())
            .collect()
    }

    /// Every context name referenced by an intent association.
    pub fn intent_association_contexts(&self) -> BTreeSet<&str> {
        self.intents_contexts
            .iter()
            .flat_map(|intent| &intent.associations)
            .flat_map(|association| &association.context_names)
            .map(String::as_str)
            .collect()
    }

    /// Contexts provided by `intent` when it follows `action`.
    pub fn associated_contexts(&self, intent: &str, action: &str) -> BTreeSet<&str> {
        self.intents_contexts
            .iter()
            .filter(|tick_intent| tick_intent.intent_name == intent)
            .flat_map(|tick_intent| &tick_intent.associations)
            .filter(|association| association.action_name == action)
            .flat_map(|association| &association.context_names)
            .map(String::as_str)
            .collect()
    }

    /// The unknown answer config attached to `action`.
    pub fn unknown_config_for(&self, action: &str) -> Option<&UnknownAnswerConfig> {
        self.unknown_answer_configs
            .iter()
            .find(|config| config.action == action)
    }

    /// True if `event` means "the user was not understood".
    pub fn is_unknown_intent(&self, event: &str) -> bool {
        event == UNKNOWN_INTENT
            || self
                .unknown_answer_configs
                .iter()
                .any(|config| config.intent == event)
    }
}
