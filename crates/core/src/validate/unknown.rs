//! Unknown answer configurations.

use super::{messages, Rule, Violations};
use crate::declaration::Declaration;

pub(super) fn check_actions(declaration: &Declaration, violations: &mut Violations) {
    let actions = declaration.action_names();
    for config in &declaration.unknown_answer_configs {
        if !actions.contains(config.action.as_str()) {
            violations.push(
                Rule::UnknownActionNotFound,
                &[config.action.as_str()],
                messages::unknown_action_not_found(&config.action),
            );
        }
    }
}

pub(super) fn check_intents(declaration: &Declaration, violations: &mut Violations) {
    for config in &declaration.unknown_answer_configs {
        if !declaration.secondary_intents.contains(&config.intent) {
            violations.push(
                Rule::UnknownIntentNotSecondary,
                &[config.intent.as_str()],
                messages::unknown_intent_not_secondary(&config.intent),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{no_handlers, weather};
    use super::super::validate;
    use crate::declaration::UnknownAnswerConfig;

    #[test]
    fn config_must_reference_declared_action() {
        let (mut declaration, machine) = weather();
        declaration.secondary_intents.insert("unknown".to_string());
        declaration
            .unknown_answer_configs
            .push(UnknownAnswerConfig::new("unknown-action", "sorry"));

        let violations = validate(&declaration, &machine, &no_handlers());
        assert_eq!(
            violations.messages().into_iter().collect::<Vec<_>>(),
            vec!["Action unknown-action of unknown answer config not found in declared actions"]
        );
    }

    #[test]
    fn config_intent_must_be_secondary() {
        let (mut declaration, machine) = weather();
        declaration
            .unknown_answer_configs
            .push(UnknownAnswerConfig::new("ASK_CITY", "sorry"));

        let violations = validate(&declaration, &machine, &no_handlers());
        assert_eq!(
            violations.messages().into_iter().collect::<Vec<_>>(),
            vec!["Intent unknown of unknown answer config not found in secondary intents"]
        );
    }
}
