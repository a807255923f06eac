//! Consistency validation -- cross-checks between a story [`Declaration`]
//! and the [`StateMachine`] it is bound to.
//!
//! Every rule runs independently and every violation is collected: an
//! author fixes a story from the complete report, so validation never
//! stops at the first problem. The result is an ordered, deduplicated set,
//! identical for any ordering of the declaration's lists.

mod actions;
mod contexts;
mod intents;
pub mod messages;
mod states;
mod transitions;
mod unknown;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::declaration::Declaration;
use crate::registry::{HandlerRegistry, StoryCatalog};
use crate::statemachine::StateMachine;

// ── Rules ─────────────────────────────────────────────────────────────────────

/// The consistency rule a [`Violation`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    IntentNotFound,
    TriggerNotFound,
    TransitionNotFound,
    ActionNotFound,
    ActionOnGroupState,
    StateNotFound,
    ActionHandlerNotFound,
    IntentNotSecondary,
    AssociationContextNotFound,
    AssociationActionNotFound,
    InputContextNotFound,
    OutputContextNotFound,
    ActionContextNotDeclared,
    DeclaredContextUnused,
    NameConflict,
    UnknownActionNotFound,
    UnknownIntentNotSecondary,
    TargetStoryNotFound,
    DuplicateState,
    SelfLoop,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::IntentNotFound => "intent-not-found",
            Rule::TriggerNotFound => "trigger-not-found",
            Rule::TransitionNotFound => "transition-not-found",
            Rule::ActionNotFound => "action-not-found",
            Rule::ActionOnGroupState => "action-on-group-state",
            Rule::StateNotFound => "state-not-found",
            Rule::ActionHandlerNotFound => "action-handler-not-found",
            Rule::IntentNotSecondary => "intent-not-secondary",
            Rule::AssociationContextNotFound => "association-context-not-found",
            Rule::AssociationActionNotFound => "association-action-not-found",
            Rule::InputContextNotFound => "input-context-not-found",
            Rule::OutputContextNotFound => "output-context-not-found",
            Rule::ActionContextNotDeclared => "action-context-not-declared",
            Rule::DeclaredContextUnused => "declared-context-unused",
            Rule::NameConflict => "name-conflict",
            Rule::UnknownActionNotFound => "unknown-action-not-found",
            Rule::UnknownIntentNotSecondary => "unknown-intent-not-secondary",
            Rule::TargetStoryNotFound => "target-story-not-found",
            Rule::DuplicateState => "duplicate-state",
            Rule::SelfLoop => "self-loop",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Violations ────────────────────────────────────────────────────────────────

/// One authoring error, naming the offending identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Violation {
    pub rule: Rule,
    pub subjects: Vec<String>,
    pub message: String,
}

/// Ordered, deduplicated set of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(BTreeSet<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Violations of a single rule.
    pub fn of(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.0.iter().filter(move |violation| violation.rule == rule)
    }

    pub fn messages(&self) -> BTreeSet<String> {
        self.0
            .iter()
            .map(|violation| violation.message.clone())
            .collect()
    }

    pub(crate) fn push(&mut self, rule: Rule, subjects: &[&str], message: String) {
        self.0.insert(Violation {
            rule,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            message,
        });
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::collections::btree_set::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::collections::btree_set::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Validator ─────────────────────────────────────────────────────────────────

/// Runs every consistency rule against a declaration and its machine.
///
/// Target stories are only checked when a [`StoryCatalog`] is supplied.
pub struct Validator<'a> {
    handlers: &'a dyn HandlerRegistry,
    stories: Option<&'a dyn StoryCatalog>,
}

impl<'a> Validator<'a> {
    pub fn new(handlers: &'a dyn HandlerRegistry) -> Self {
        Validator {
            handlers,
            stories: None,
        }
    }

    pub fn with_story_catalog(mut self, stories: &'a dyn StoryCatalog) -> Self {
        self.stories = Some(stories);
        self
    }

    pub fn validate(&self, declaration: &Declaration, machine: &StateMachine) -> Violations {
        let mut violations = Violations::default();

        // Declared intents and triggers vs machine transitions
        transitions::check_intents(declaration, machine, &mut violations);
        transitions::check_triggers(declaration, machine, &mut violations);
        transitions::check_transitions(declaration, machine, &mut violations);

        // Declared actions vs machine states
        states::check_actions(declaration, machine, &mut violations);
        states::check_states(declaration, machine, &mut violations);
        states::check_structure(machine, &mut violations);

        actions::check_handlers(declaration, self.handlers, &mut violations);
        if let Some(stories) = self.stories {
            actions::check_target_stories(declaration, stories, &mut violations);
        }

        intents::check_intent_names(declaration, &mut violations);
        intents::check_association_contexts(declaration, &mut violations);
        intents::check_association_actions(declaration, &mut violations);

        contexts::check_dataflow(declaration, &mut violations);
        contexts::check_declared_contexts(declaration, &mut violations);
        contexts::check_names(declaration, &mut violations);

        unknown::check_actions(declaration, &mut violations);
        unknown::check_intents(declaration, &mut violations);

        debug!(
            story = %declaration.story_id,
            violations = violations.len(),
            "story validated"
        );
        violations
    }
}

/// Validate `declaration` against `machine` without a story catalog.
pub fn validate(
    declaration: &Declaration,
    machine: &StateMachine,
    handlers: &dyn HandlerRegistry,
) -> Violations {
    Validator::new(handlers).validate(declaration, machine)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeSet;

    use crate::declaration::{Declaration, TickAction, TickContext};
    use crate::statemachine::{State, StateMachine};

    pub fn no_handlers() -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// Weather story: ask for a city, then give the weather for it.
    pub fn weather() -> (Declaration, StateMachine) {
        let root = State::new("Global")
            .with_initial("ASK_CITY")
            .with_child(State::new("ASK_CITY"))
            .with_child(State::new("GIVE_WEATHER"))
            .with_transition("weather", "#ASK_CITY")
            .with_transition("city", "#GIVE_WEATHER");
        let declaration = Declaration {
            story_id: "weather".to_string(),
            state_machine: root.clone(),
            main_intent: "weather".to_string(),
            secondary_intents: ["city".to_string()].into(),
            contexts: vec![TickContext::new("CITY").bound_to("location", "city")],
            actions: vec![
                TickAction::new("ASK_CITY")
                    .with_answer("ask_city")
                    .with_outputs(["CITY"]),
                TickAction::new("GIVE_WEATHER")
                    .with_answer("weather")
                    .with_inputs(["CITY"])
                    .finishing(),
            ],
            ..Default::default()
        };
        (declaration, StateMachine::new(root))
    }
}
