use std::path::PathBuf;

/// Structural defect that prevents a state machine from being executed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// Two or more states share the same id.
    #[error("one or more duplicate states were detected: {}", .ids.join(", "))]
    DuplicateStates { ids: Vec<String> },

    /// A state has a transition that targets the state itself.
    #[error("one or more self-loops were detected: {}", .ids.join(", "))]
    SelfLoops { ids: Vec<String> },
}

/// Failure to read or decode a story document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("error reading story document '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing story document: {0}")]
    Json(#[from] serde_json::Error),
}
