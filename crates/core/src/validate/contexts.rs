//! Context dataflow and declarations.
//!
//! The dataflow check is local: each context an action consumes must be
//! produced by some other action and vice versa. Whether the producer is
//! actually reachable before the consumer is not verified.

use std::collections::BTreeSet;

use super::{messages, Rule, Violations};
use crate::declaration::{Declaration, TickAction};

// ── Dataflow closure ──────────────────────────────────────────────────────────

/// Contexts provided by intent associations count as both produced and
/// consumed by every action.
pub(super) fn check_dataflow(declaration: &Declaration, violations: &mut Violations) {
    let intent_contexts = declaration.intent_association_contexts();
    let inputs = |action: &TickAction| effective(&action.input_context_names, &intent_contexts);
    let outputs = |action: &TickAction| effective(&action.output_context_names, &intent_contexts);

    for (context, action) in unmatched(&declaration.actions, inputs, outputs) {
        violations.push(
            Rule::InputContextNotFound,
            &[context.as_str(), action],
            messages::input_context_not_found(&context, action),
        );
    }
    for (context, action) in unmatched(&declaration.actions, outputs, inputs) {
        violations.push(
            Rule::OutputContextNotFound,
            &[context.as_str(), action],
            messages::output_context_not_found(&context, action),
        );
    }
}

fn effective(own: &BTreeSet<String>, intent_contexts: &BTreeSet<&str>) -> BTreeSet<String> {
    own.iter()
        .cloned()
        .chain(intent_contexts.iter().map(|c| c.to_string()))
        .collect()
}

/// `(context, action)` pairs where `first(action)` holds a context missing
/// from `second` of every other action.
fn unmatched<'a, F, S>(actions: &'a [TickAction], first: F, second: S) -> Vec<(String, &'a str)>
where
    F: Fn(&TickAction) -> BTreeSet<String>,
    S: Fn(&TickAction) -> BTreeSet<String>,
{
    let mut pairs = Vec::new();
    for action in actions {
        let others: BTreeSet<String> = actions
            .iter()
            .filter(|other| other.name != action.name)
            .flat_map(&second)
            .collect();
        for context in first(action).difference(&others) {
            pairs.push((context.clone(), action.name.as_str()));
        }
    }
    pairs
}

// ── Declarations ──────────────────────────────────────────────────────────────

pub(super) fn check_declared_contexts(declaration: &Declaration, violations: &mut Violations) {
    let used: BTreeSet<&str> = declaration
        .actions
        .iter()
        .flat_map(|action| {
            action
                .input_context_names
                .iter()
                .chain(&action.output_context_names)
        })
        .map(String::as_str)
        .collect();
    let declared = declaration.context_names();

    for &context in used.difference(&declared) {
        violations.push(
            Rule::ActionContextNotDeclared,
            &[context],
            messages::action_context_not_declared(context),
        );
    }
    for &context in declared.difference(&used) {
        violations.push(
            Rule::DeclaredContextUnused,
            &[context],
            messages::declared_context_unused(context),
        );
    }
}

/// Contexts and actions share one namespace.
pub(super) fn check_names(declaration: &Declaration, violations: &mut Violations) {
    let actions = declaration.action_names();
    for &name in declaration.context_names().intersection(&actions) {
        violations.push(Rule::NameConflict, &[name], messages::name_conflict(name));
    }
}
