//! Human-readable violation messages, one function per rule.

pub fn intent_not_found(intent: &str) -> String {
    format!("Intent {intent} not found in state machine")
}

pub fn trigger_not_found(trigger: &str) -> String {
    format!("Trigger {trigger} not found in state machine")
}

pub fn transition_not_found(transition: &str) -> String {
    format!("Transition {transition} not found in story intents or triggers")
}

pub fn action_not_found(action: &str) -> String {
    format!("Action {action} not found in state machine")
}

pub fn action_on_group_state(action: &str) -> String {
    format!("Action {action} is bound to a grouping state")
}

pub fn state_not_found(state: &str) -> String {
    format!("State {state} not found in story actions")
}

pub fn action_handler_not_found(handler: &str) -> String {
    format!("Action handler {handler} not found in handlers repository")
}

pub fn intent_not_secondary(intent: &str) -> String {
    format!("Intent {intent} is not secondary, it cannot be associated to contexts")
}

pub fn association_context_not_found(context: &str) -> String {
    format!("Intent association context {context} not found in declared contexts")
}

pub fn association_action_not_found(action: &str) -> String {
    format!("Intent association action {action} not found in declared actions")
}

pub fn input_context_not_found(context: &str, action: &str) -> String {
    format!("Input context {context} of action {action} not found in output contexts of others")
}

pub fn output_context_not_found(context: &str, action: &str) -> String {
    format!("Output context {context} of action {action} not found in input contexts of others")
}

pub fn action_context_not_declared(context: &str) -> String {
    format!("Action context {context} not found in declared contexts")
}

pub fn declared_context_unused(context: &str) -> String {
    format!("Declared context {context} not used by any action")
}

pub fn name_conflict(name: &str) -> String {
    format!("The same name {name} is used for an action and a context")
}

pub fn unknown_action_not_found(action: &str) -> String {
    format!("Action {action} of unknown answer config not found in declared actions")
}

pub fn unknown_intent_not_secondary(intent: &str) -> String {
    format!("Intent {intent} of unknown answer config not found in secondary intents")
}

pub fn target_story_not_found(action: &str, story: &str) -> String {
    format!("Target story {story} of action {action} not found")
}

pub fn duplicate_state(state: &str) -> String {
    format!("State {state} is declared more than once in state machine")
}

pub fn self_loop(state: &str) -> String {
    format!("State {state} has a transition to itself")
}
