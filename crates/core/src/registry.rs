//! External collaborators consulted during validation.

use std::collections::{BTreeSet, HashSet};

/// Lookup of the handlers an action may name.
pub trait HandlerRegistry {
    fn contains(&self, handler: &str) -> bool;
}

/// Lookup of the stories an action may hand the conversation over to.
pub trait StoryCatalog {
    fn story_exists(&self, story_id: &str) -> bool;
}

impl HandlerRegistry for BTreeSet<String> {
    fn contains(&self, handler: &str) -> bool {
        BTreeSet::contains(self, handler)
    }
}

impl HandlerRegistry for HashSet<String> {
    fn contains(&self, handler: &str) -> bool {
        HashSet::contains(self, handler)
    }
}

impl StoryCatalog for BTreeSet<String> {
    fn story_exists(&self, story_id: &str) -> bool {
        self.contains(story_id)
    }
}

impl StoryCatalog for HashSet<String> {
    fn story_exists(&self, story_id: &str) -> bool {
        self.contains(story_id)
    }
}
