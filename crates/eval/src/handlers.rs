//! Action handlers: the code a silent action runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use tick_core::HandlerRegistry;
use tracing::debug;

use crate::context::ContextStore;
use crate::error::RuntimeError;

/// Business code bound to an action by name.
///
/// A handler reads the conversation contexts and returns the contexts it
/// produced; the runtime merges them back.
pub trait ActionHandler: Send + Sync {
    fn invoke(&self, contexts: &ContextStore) -> ContextStore;
}

impl<F> ActionHandler for F
where
    F: Fn(&ContextStore) -> ContextStore + Send + Sync,
{
    fn invoke(&self, contexts: &ContextStore) -> ContextStore {
        self(contexts)
    }
}

/// Named handlers available to stories.
#[derive(Clone, Default)]
pub struct HandlerRepository {
    handlers: BTreeMap<String, Arc<dyn ActionHandler>>,
}

impl HandlerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl ActionHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn with(mut self, name: impl Into<String>, handler: impl ActionHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Run handler `name` and return the contexts it produced.
    pub fn invoke(&self, name: &str, contexts: &ContextStore) -> Result<ContextStore, RuntimeError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| RuntimeError::HandlerNotFound {
                handler: name.to_string(),
            })?;
        let produced = handler.invoke(contexts);
        debug!(handler = name, produced = produced.len(), "action handler invoked");
        Ok(produced)
    }
}

impl HandlerRegistry for HandlerRepository {
    fn contains(&self, handler: &str) -> bool {
        self.handlers.contains_key(handler)
    }
}

impl std::fmt::Debug for HandlerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}
