//! Runtime error types

use docpolicy_core::{CollectionId, CollectionSequenceId, ConditionId, CoreError, LexiconId};
use std::time::Duration;
use thiserror::Error;

/// Runtime error.
///
/// Every variant fails the evaluation pass. Conditions that merely cannot be
/// checked are reported as unevaluated results instead.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A referenced condition is not in the snapshot
    #[error("Condition not found: {0}")]
    ConditionNotFound(ConditionId),

    #[error("Lexicon not found: {0}")]
    LexiconNotFound(LexiconId),

    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionId),

    #[error("Collection sequence not found: {0}")]
    CollectionSequenceNotFound(CollectionSequenceId),

    /// A not or fragment reference leads back to a condition being resolved
    #[error("Cyclic condition reference to {id} via {path:?}")]
    CyclicReference {
        id: ConditionId,
        path: Vec<ConditionId>,
    },

    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Regex match timed out after {0:?}")]
    RegexTimeout(Duration),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
