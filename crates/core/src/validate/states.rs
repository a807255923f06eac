//! Declared actions against machine states, and machine structure.
//!
//! Leaf states and actions must be in bijection: every action names a
//! state and every leaf state is bound to an action.

use super::{messages, Rule, Violations};
use crate::declaration::Declaration;
use crate::statemachine::StateMachine;

pub(super) fn check_actions(
    declaration: &Declaration,
    machine: &StateMachine,
    violations: &mut Violations,
) {
    for action in &declaration.actions {
        if machine.state(&action.name).is_none() {
            violations.push(
                Rule::ActionNotFound,
                &[action.name.as_str()],
                messages::action_not_found(&action.name),
            );
        } else if !machine.is_leaf(&action.name) {
            violations.push(
                Rule::ActionOnGroupState,
                &[action.name.as_str()],
                messages::action_on_group_state(&action.name),
            );
        }
    }
}

pub(super) fn check_states(
    declaration: &Declaration,
    machine: &StateMachine,
    violations: &mut Violations,
) {
    let actions = declaration.action_names();
    for state in machine.leaf_states() {
        if !actions.contains(state.as_str()) {
            violations.push(
                Rule::StateNotFound,
                &[state.as_str()],
                messages::state_not_found(&state),
            );
        }
    }
}

/// Defects that would make the machine unsafe to execute.
pub(super) fn check_structure(machine: &StateMachine, violations: &mut Violations) {
    for state in machine.duplicate_states() {
        violations.push(
            Rule::DuplicateState,
            &[state.as_str()],
            messages::duplicate_state(&state),
        );
    }
    for state in machine.self_loops() {
        violations.push(Rule::SelfLoop, &[state.as_str()], messages::self_loop(&state));
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{no_handlers, weather};
    use super::super::{validate, Rule};
    use crate::declaration::TickAction;
    use crate::statemachine::{State, StateMachine};

    #[test]
    fn action_without_state() {
        let (mut declaration, machine) = weather();
        declaration.actions.push(TickAction::new("SAY_BYE"));
        let violations = validate(&declaration, &machine, &no_handlers());
        assert_eq!(
            violations.messages().into_iter().collect::<Vec<_>>(),
            vec!["Action SAY_BYE not found in state machine"]
        );
    }

    #[test]
    fn action_on_grouping_state() {
        let (mut declaration, machine) = weather();
        declaration.actions.push(TickAction::new("Global"));
        let violations = validate(&declaration, &machine, &no_handlers());
        assert_eq!(
            violations.messages().into_iter().collect::<Vec<_>>(),
            vec!["Action Global is bound to a grouping state"]
        );
        assert_eq!(violations.of(Rule::ActionOnGroupState).count(), 1);
    }

    #[test]
    fn leaf_state_without_action() {
        let (mut declaration, _) = weather();
        declaration.actions.retain(|action| action.name != "GIVE_WEATHER");
        let machine = StateMachine::new(declaration.state_machine.clone());

        let violations = validate(&declaration, &machine, &no_handlers());
        let states: Vec<_> = violations
            .of(Rule::StateNotFound)
            .map(|v| v.message.as_str())
            .collect();
        assert_eq!(states, vec!["State GIVE_WEATHER not found in story actions"]);
    }

    #[test]
    fn grouping_states_need_no_action() {
        let (mut declaration, _) = weather();
        let root = State::new("Global")
            .with_initial("Ask")
            .with_child(
                State::new("Ask")
                    .with_initial("ASK_CITY")
                    .with_child(State::new("ASK_CITY")),
            )
            .with_child(State::new("GIVE_WEATHER"))
            .with_transition("weather", "#Ask")
            .with_transition("city", "#GIVE_WEATHER");
        declaration.state_machine = root.clone();
        let machine = StateMachine::new(root);

        assert!(validate(&declaration, &machine, &no_handlers()).is_empty());
    }

    #[test]
    fn structural_defects_are_reported() {
        let (declaration, _) = weather();
        let root = State::new("Global")
            .with_initial("ASK_CITY")
            .with_child(State::new("ASK_CITY").with_transition("weather", "#ASK_CITY"))
            .with_child(
                State::new("Nested")
                    .with_initial("GIVE_WEATHER")
                    .with_child(State::new("GIVE_WEATHER"))
                    .with_child(State::new("ASK_CITY")),
            )
            .with_transition("city", "#GIVE_WEATHER");
        let machine = StateMachine::new(root);

        let violations = validate(&declaration, &machine, &no_handlers());
        assert_eq!(violations.of(Rule::DuplicateState).count(), 1);
        assert_eq!(
            violations.of(Rule::SelfLoop).next().unwrap().message,
            "State ASK_CITY has a transition to itself"
        );
    }
}
