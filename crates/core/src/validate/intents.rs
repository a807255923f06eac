//! Intent-to-context associations.

use super::{messages, Rule, Violations};
use crate::declaration::Declaration;

/// Only secondary intents may carry context associations.
pub(super) fn check_intent_names(declaration: &Declaration, violations: &mut Violations) {
    for intent in &declaration.intents_contexts {
        if !declaration.secondary_intents.contains(&intent.intent_name) {
            violations.push(
                Rule::IntentNotSecondary,
                &[intent.intent_name.as_str()],
                messages::intent_not_secondary(&intent.intent_name),
            );
        }
    }
}

pub(super) fn check_association_contexts(declaration: &Declaration, violations: &mut Violations) {
    let declared = declaration.context_names();
    for context in declaration.intent_association_contexts() {
        if !declared.contains(context) {
            violations.push(
                Rule::AssociationContextNotFound,
                &[context],
                messages::association_context_not_found(context),
            );
        }
    }
}

pub(super) fn check_association_actions(declaration: &Declaration, violations: &mut Violations) {
    let declared = declaration.action_names();
    let referenced = declaration
        .intents_contexts
        .iter()
        .flat_map(|intent| &intent.associations)
        .map(|association| association.action_name.as_str());
    for action in referenced {
        if !declared.contains(action) {
            violations.push(
                Rule::AssociationActionNotFound,
                &[action],
                messages::association_action_not_found(action),
            );
        }
    }
}
