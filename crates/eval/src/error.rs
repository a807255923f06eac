use tick_core::{MachineError, Violations};
use tick_storage::StorageError;

/// Configuration or programming error raised while executing a story.
///
/// Soft failures (unrecognized input, missing contexts) and repetition
/// overflow are turn outcomes, never errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("state machine cannot be executed: {0}")]
    InvalidMachine(#[from] MachineError),

    #[error("state <{state}> not found in state machine")]
    StateNotFound { state: String },

    #[error("action <{action}> not found in story declaration")]
    ActionNotDeclared { action: String },

    #[error("no unknown answer available for action <{action}>")]
    UnknownAnswerNotFound { action: String },

    #[error("action handler <{handler}> not found in handlers repository")]
    HandlerNotFound { handler: String },

    #[error("trigger chain exceeded {limit} actions without waiting for the user")]
    TriggerLoop { limit: usize },
}

/// Why a story could not be published.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("story has {} consistency violation(s)", .0.len())]
    Inconsistent(Violations),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
