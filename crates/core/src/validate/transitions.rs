//! Declared intents and triggers against machine transitions.

use std::collections::BTreeSet;

use super::{messages, Rule, Violations};
use crate::declaration::Declaration;
use crate::statemachine::StateMachine;

// ── Intents ───────────────────────────────────────────────────────────────────

/// Every declared intent labels a transition. Intents reserved for unknown
/// answer configs never drive a transition and are exempt.
pub(super) fn check_intents(
    declaration: &Declaration,
    machine: &StateMachine,
    violations: &mut Violations,
) {
    let unknown_intents: BTreeSet<&str> = declaration
        .unknown_answer_configs
        .iter()
        .map(|config| config.intent.as_str())
        .collect();

    for intent in declaration.intents() {
        if unknown_intents.contains(intent) || machine.contains_transition(intent) {
            continue;
        }
        violations.push(
            Rule::IntentNotFound,
            &[intent],
            messages::intent_not_found(intent),
        );
    }
}

// ── Triggers ──────────────────────────────────────────────────────────────────

pub(super) fn check_triggers(
    declaration: &Declaration,
    machine: &StateMachine,
    violations: &mut Violations,
) {
    for trigger in &declaration.triggers {
        if !machine.contains_transition(trigger) {
            violations.push(
                Rule::TriggerNotFound,
                &[trigger.as_str()],
                messages::trigger_not_found(trigger),
            );
        }
    }
}

// ── Orphan transitions ────────────────────────────────────────────────────────

pub(super) fn check_transitions(
    declaration: &Declaration,
    machine: &StateMachine,
    violations: &mut Violations,
) {
    let events = declaration.events();
    for transition in machine.all_transitions() {
        if !events.contains(transition.as_str()) {
            violations.push(
                Rule::TransitionNotFound,
                &[transition.as_str()],
                messages::transition_not_found(&transition),
            );
        }
    }
}
