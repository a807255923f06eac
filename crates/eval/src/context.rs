//! Context values of a conversation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Context name -> value. A context can be present but unresolved (`None`):
/// it is known to be needed and still has to be filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextStore(BTreeMap<String, Option<String>>);

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), Some(value.into()));
    }

    pub fn insert_unresolved(&mut self, name: impl Into<String>) {
        self.0.insert(name.into(), None);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Value of a resolved context.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|value| value.as_deref())
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Names of the contexts that are present but still unresolved.
    pub fn unresolved(&self) -> BTreeSet<&str> {
        self.0
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Overwrite with every entry of `other`.
    pub fn merge(&mut self, other: ContextStore) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContextStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ContextStore(
            iter.into_iter()
                .map(|(name, value)| (name.into(), Some(value.into())))
                .collect(),
        )
    }
}
