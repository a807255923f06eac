//! Action references to external collaborators.

use super::{messages, Rule, Violations};
use crate::declaration::Declaration;
use crate::registry::{HandlerRegistry, StoryCatalog};

pub(super) fn check_handlers(
    declaration: &Declaration,
    handlers: &dyn HandlerRegistry,
    violations: &mut Violations,
) {
    for handler in declaration.actions.iter().filter_map(|a| a.handler_name()) {
        if !handlers.contains(handler) {
            violations.push(
                Rule::ActionHandlerNotFound,
                &[handler],
                messages::action_handler_not_found(handler),
            );
        }
    }
}

pub(super) fn check_target_stories(
    declaration: &Declaration,
    stories: &dyn StoryCatalog,
    violations: &mut Violations,
) {
    for action in &declaration.actions {
        let Some(story) = action.target_story.as_deref() else {
            continue;
        };
        if !stories.story_exists(story) {
            violations.push(
                Rule::TargetStoryNotFound,
                &[action.name.as_str(), story],
                messages::target_story_not_found(&action.name, story),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::super::fixtures::weather;
    use super::super::{validate, Rule};

    #[test]
    fn handler_must_be_registered() {
        let (mut declaration, machine) = weather();
        declaration.actions[1].handler = Some("fetch_weather".to_string());

        let empty: BTreeSet<String> = BTreeSet::new();
        let violations = validate(&declaration, &machine, &empty);
        assert_eq!(
            violations.messages().into_iter().collect::<Vec<_>>(),
            vec!["Action handler fetch_weather not found in handlers repository"]
        );

        let registered: HashSet<String> = ["fetch_weather".to_string()].into();
        assert!(validate(&declaration, &machine, &registered).is_empty());
    }

    #[test]
    fn blank_handler_is_ignored() {
        let (mut declaration, machine) = weather();
        declaration.actions[0].handler = Some("   ".to_string());
        let violations = validate(&declaration, &machine, &BTreeSet::<String>::new());
        assert_eq!(violations.of(Rule::ActionHandlerNotFound).count(), 0);
    }
}
