//! Hierarchical state machine model.
//!
//! A machine is a tree of [`State`]s in the xstate document shape. Leaf
//! states are bound 1:1 to actions; grouping states only nest other states.
//! Transitions are named `on` edges whose target is a state id, optionally
//! prefixed with the `#` id marker, and may point anywhere in the tree
//! (including up the hierarchy).
//!
//! All queries are read-only traversals. A malformed machine (dangling
//! targets, groups without an initial child) is tolerated: lookups that
//! cannot be resolved return `None`. Structural defects that make a machine
//! unsafe to execute are only rejected by [`StateMachine::try_new`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MachineError;

// ──────────────────────────────────────────────
// State
// ──────────────────────────────────────────────

/// A node of the state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Unique id. Children stored in a `states` map with an empty id take
    /// their map key as id.
    #[serde(default)]
    pub id: String,
    /// Nested states; present and non-empty only for grouping states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<BTreeMap<String, State>>,
    /// Event name -> target state reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<BTreeMap<String, String>>,
    /// Default child of a grouping state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl State {
    pub fn new(id: impl Into<String>) -> Self {
        State {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: State) -> Self {
        self.states
            .get_or_insert_with(BTreeMap::new)
            .insert(child.id.clone(), child);
        self
    }

    pub fn with_transition(mut self, event: impl Into<String>, target: impl Into<String>) -> Self {
        self.on
            .get_or_insert_with(BTreeMap::new)
            .insert(event.into(), target.into());
        self
    }

    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// True when the state nests other states.
    pub fn is_group(&self) -> bool {
        self.states.as_ref().is_some_and(|states| !states.is_empty())
    }

    pub fn children(&self) -> impl Iterator<Item = &State> {
        self.states.iter().flat_map(|states| states.values())
    }

    /// Outgoing edges as `(event, target id)` pairs, `#` marker stripped.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.on.iter().flat_map(|on| {
            on.iter()
                .map(|(event, target)| (event.as_str(), target_id(target)))
        })
    }

    /// Target id of the edge labelled `transition`, if this state has one.
    pub fn target(&self, transition: &str) -> Option<&str> {
        self.on
            .as_ref()?
            .get(transition)
            .map(|target| target_id(target))
    }

    fn normalized(mut self) -> Self {
        if let Some(states) = self.states.take() {
            let states = states
                .into_iter()
                .map(|(key, mut child)| {
                    if child.id.is_empty() {
                        child.id = key.clone();
                    }
                    (key, child.normalized())
                })
                .collect();
            self.states = Some(states);
        }
        self
    }
}

/// Strip the `#` id marker from a transition target reference.
pub fn target_id(reference: &str) -> &str {
    reference.strip_prefix('#').unwrap_or(reference)
}

// ──────────────────────────────────────────────
// State machine
// ──────────────────────────────────────────────

/// Read-only access to a state tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    root: State,
}

impl StateMachine {
    /// Build a machine without structural checks.
    pub fn new(root: State) -> Self {
        StateMachine {
            root: root.normalized(),
        }
    }

    /// Build a machine that is safe to execute: state ids are unique and no
    /// state has a transition to itself.
    pub fn try_new(root: State) -> Result<Self, MachineError> {
        let machine = StateMachine::new(root);

        let duplicates = machine.duplicate_states();
        if !duplicates.is_empty() {
            warn!(states = ?duplicates, "duplicate states detected in state machine");
            return Err(MachineError::DuplicateStates {
                ids: duplicates.into_iter().collect(),
            });
        }

        let self_loops = machine.self_loops();
        if !self_loops.is_empty() {
            warn!(states = ?self_loops, "self-loops detected in state machine");
            return Err(MachineError::SelfLoops {
                ids: self_loops.into_iter().collect(),
            });
        }

        Ok(machine)
    }

    pub fn root(&self) -> &State {
        &self.root
    }

    /// Every state of the tree, depth-first, root first.
    pub fn states(&self) -> Vec<&State> {
        let mut ordered = Vec::new();
        collect_states(&self.root, &mut ordered);
        ordered
    }

    /// Ids used by more than one state.
    pub fn duplicate_states(&self) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for state in self.states() {
            if !seen.insert(state.id.as_str()) {
                duplicates.insert(state.id.clone());
            }
        }
        duplicates
    }

    /// Ids of states having a transition that targets themselves.
    pub fn self_loops(&self) -> BTreeSet<String> {
        self.states()
            .into_iter()
            .filter(|state| state.transitions().any(|(_, target)| target == state.id))
            .map(|state| state.id.clone())
            .collect()
    }

    /// Depth-first lookup by id.
    pub fn state(&self, id: &str) -> Option<&State> {
        find_state(&self.root, id)
    }

    /// The grouping state directly containing `id`.
    pub fn parent(&self, id: &str) -> Option<&State> {
        find_parent(&self.root, id)
    }

    /// The leaf reached from `id` by following `initial` children.
    ///
    /// A leaf is its own initial state. Returns `None` when `id` is unknown
    /// or a grouping state on the way has no resolvable initial child.
    pub fn initial(&self, id: &str) -> Option<&State> {
        let mut state = self.state(id)?;
        while state.is_group() {
            let initial = state.initial.as_deref()?;
            state = state
                .children()
                .find_map(|child| find_state(child, initial))?;
        }
        Some(state)
    }

    /// The leaf reached from `id` through the edge labelled `transition`.
    ///
    /// When `id` has no such edge the search continues from its parent, up
    /// to the root. The edge target is then resolved to its initial leaf.
    pub fn next(&self, id: &str, transition: &str) -> Option<&State> {
        let mut current = self.state(id)?;
        let mut visited = BTreeSet::new();
        loop {
            if !visited.insert(current.id.as_str()) {
                return None;
            }
            if let Some(target) = current.target(transition) {
                return self.initial(target);
            }
            current = self.parent(&current.id)?;
        }
    }

    /// True if `transition` labels an edge anywhere in the machine.
    pub fn contains_transition(&self, transition: &str) -> bool {
        self.states()
            .into_iter()
            .any(|state| state.target(transition).is_some())
    }

    /// Every edge label of the machine, any depth.
    pub fn all_transitions(&self) -> BTreeSet<String> {
        self.states()
            .into_iter()
            .flat_map(|state| state.transitions().map(|(event, _)| event.to_string()))
            .collect()
    }

    /// Ids of the states that are not grouping states.
    pub fn leaf_states(&self) -> BTreeSet<String> {
        self.states()
            .into_iter()
            .filter(|state| !state.is_group())
            .map(|state| state.id.clone())
            .collect()
    }

    pub fn is_leaf(&self, id: &str) -> bool {
        self.state(id).is_some_and(|state| !state.is_group())
    }
}

fn collect_states<'a>(state: &'a State, ordered: &mut Vec<&'a State>) {
    ordered.push(state);
    for child in state.children() {
        collect_states(child, ordered);
    }
}

fn find_state<'a>(state: &'a State, id: &str) -> Option<&'a State> {
    if state.id == id {
        return Some(state);
    }
    state.children().find_map(|child| find_state(child, id))
}

fn find_parent<'a>(state: &'a State, id: &str) -> Option<&'a State> {
    if state.children().any(|child| child.id == id) {
        return Some(state);
    }
    state.children().find_map(|child| find_parent(child, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Book-a-meeting machine with a nested group and an edge pointing up
    /// the hierarchy.
    fn meeting_machine() -> StateMachine {
        let book_meeting = State::new("S_BOOK_MEETING")
            .with_initial("S_SHOW_PROCEDURE_BOOK_MEETING")
            .with_child(State::new("S_ASK_CHANNEL"))
            .with_child(State::new("S_SHOW_PROCEDURE_BOOK_MEETING"))
            .with_transition("i_book_physical_or_tel", "#S_SHOW_PROCEDURE_BOOK_MEETING")
            .with_transition("i_book_physical_or_tel_2", "#S_ASK_CHANNEL")
            .with_transition("i_book_physical_or_tel_4", "#S_SHOW_PROCEDURE_BOOK_MEETING_4");
        let global = State::new("Global")
            .with_initial("INTRODUCTION")
            .with_child(State::new("INTRODUCTION"))
            .with_child(book_meeting)
            .with_child(State::new("S_SHOW_PROCEDURE_BOOK_MEETING_4"))
            .with_transition("i_ask_book_visio", "#S_BOOK_MEETING");
        let root = State::new("root").with_initial("Global").with_child(global);
        StateMachine::try_new(root).unwrap()
    }

    #[test]
    fn state_lookup() {
        let sm = meeting_machine();
        assert!(sm.state("TOTO").is_none());
        assert_eq!(sm.state("root").unwrap().id, "root");
        assert_eq!(sm.state("S_ASK_CHANNEL").unwrap().id, "S_ASK_CHANNEL");
        assert!(sm.state("S_BOOK_MEETING").unwrap().is_group());
    }

    #[test]
    fn parent_lookup() {
        let sm = meeting_machine();
        assert!(sm.parent("root").is_none());
        assert!(sm.parent("TOTO").is_none());
        assert_eq!(sm.parent("Global").unwrap().id, "root");
        assert_eq!(sm.parent("INTRODUCTION").unwrap().id, "Global");
        assert_eq!(sm.parent("S_ASK_CHANNEL").unwrap().id, "S_BOOK_MEETING");
    }

    #[test]
    fn initial_descends_to_leaf() {
        let sm = meeting_machine();
        assert!(sm.initial("TOTO").is_none());
        assert_eq!(sm.initial("root").unwrap().id, "INTRODUCTION");
        assert_eq!(sm.initial("Global").unwrap().id, "INTRODUCTION");
        assert_eq!(
            sm.initial("S_BOOK_MEETING").unwrap().id,
            "S_SHOW_PROCEDURE_BOOK_MEETING"
        );
        assert_eq!(sm.initial("S_ASK_CHANNEL").unwrap().id, "S_ASK_CHANNEL");
    }

    #[test]
    fn initial_of_group_without_initial_is_none() {
        let root = State::new("Global").with_child(State::new("A"));
        let sm = StateMachine::new(root);
        assert!(sm.initial("Global").is_none());
    }

    #[test]
    fn next_follows_edges_and_bubbles_up() {
        let sm = meeting_machine();
        assert!(sm.next("root", "ANY").is_none());
        assert!(sm.next("TOTO", "ANY").is_none());
        // edge declared on a child is not visible from the parent
        assert!(sm.next("Global", "i_book_physical_or_tel").is_none());

        assert_eq!(
            sm.next("Global", "i_ask_book_visio").unwrap().id,
            "S_SHOW_PROCEDURE_BOOK_MEETING"
        );
        assert_eq!(
            sm.next("S_BOOK_MEETING", "i_book_physical_or_tel_2").unwrap().id,
            "S_ASK_CHANNEL"
        );
        assert_eq!(
            sm.next("S_BOOK_MEETING", "i_book_physical_or_tel_4").unwrap().id,
            "S_SHOW_PROCEDURE_BOOK_MEETING_4"
        );
        // leaf without edges: resolved from the enclosing group
        assert_eq!(
            sm.next("S_ASK_CHANNEL", "i_book_physical_or_tel").unwrap().id,
            "S_SHOW_PROCEDURE_BOOK_MEETING"
        );
        assert_eq!(
            sm.next("INTRODUCTION", "i_ask_book_visio").unwrap().id,
            "S_SHOW_PROCEDURE_BOOK_MEETING"
        );
    }

    #[test]
    fn next_with_dangling_target_is_none() {
        let root = State::new("Global")
            .with_initial("A")
            .with_child(State::new("A"))
            .with_transition("go", "#MISSING");
        let sm = StateMachine::new(root);
        assert!(sm.next("A", "go").is_none());
    }

    #[test]
    fn leaf_states_exclude_groups() {
        let sm = meeting_machine();
        let expected: BTreeSet<String> = [
            "INTRODUCTION",
            "S_ASK_CHANNEL",
            "S_SHOW_PROCEDURE_BOOK_MEETING",
            "S_SHOW_PROCEDURE_BOOK_MEETING_4",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(sm.leaf_states(), expected);
        assert!(sm.is_leaf("INTRODUCTION"));
        assert!(!sm.is_leaf("Global"));
        assert!(!sm.is_leaf("TOTO"));
    }

    #[test]
    fn transitions_at_any_depth() {
        let sm = meeting_machine();
        let all = sm.all_transitions();
        assert_eq!(all.len(), 4);
        assert!(all.contains("i_ask_book_visio"));
        assert!(all.contains("i_book_physical_or_tel_4"));
        assert!(sm.contains_transition("i_book_physical_or_tel_2"));
        assert!(!sm.contains_transition("i_book_physical_or_tel_3"));
    }

    #[test]
    fn duplicate_states_are_rejected() {
        let root = State::new("Global")
            .with_child(State::new("A"))
            .with_child(State::new("B").with_initial("A").with_child(State::new("A")));
        let sm = StateMachine::new(root.clone());
        assert_eq!(sm.duplicate_states().into_iter().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(
            StateMachine::try_new(root).unwrap_err(),
            MachineError::DuplicateStates {
                ids: vec!["A".to_string()]
            }
        );
    }

    #[test]
    fn self_loops_are_rejected() {
        let root = State::new("Global")
            .with_initial("A")
            .with_child(State::new("A").with_transition("again", "#A"));
        let err = StateMachine::try_new(root).unwrap_err();
        assert_eq!(
            err,
            MachineError::SelfLoops {
                ids: vec!["A".to_string()]
            }
        );
        assert!(err.to_string().contains("self-loops"));
    }

    #[test]
    fn children_take_their_key_as_id() {
        let root: State = serde_json::from_value(serde_json::json!({
            "id": "Global",
            "initial": "WELCOME",
            "states": { "WELCOME": {}, "BYE": { "on": { "bye": "#WELCOME" } } },
            "on": { "greet": "#WELCOME" }
        }))
        .unwrap();
        let sm = StateMachine::new(root);
        assert_eq!(sm.state("BYE").unwrap().id, "BYE");
        assert_eq!(sm.next("Global", "greet").unwrap().id, "WELCOME");
        assert_eq!(sm.next("BYE", "bye").unwrap().id, "WELCOME");
    }
}
