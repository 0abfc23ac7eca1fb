//! docpolicy Core - Core types and definitions for the docpolicy condition engine
//!
//! This crate provides the data model shared by the evaluation runtime and the SDK:
//! - Condition definitions (a closed sum type over every condition kind)
//! - Documents, their case-insensitive metadata and the per-pass document tree
//! - The read-only environment snapshot
//! - Evaluation result records and the full engine result
//! - Error types

pub mod condition;
pub mod document;
pub mod environment;
pub mod error;
pub mod result;

// Re-export commonly used types
pub use condition::{Condition, ConditionKey, ConditionKind, ConditionTarget, ConditionType};
pub use document::{ContentStream, Document, DocumentId, DocumentTree, DocumentUnderEvaluation, Metadata};
pub use environment::{EnvironmentSnapshot, InMemorySnapshot};
pub use error::{CoreError, Result};
pub use result::{
    ClassifyDocumentResult, ConditionEngineResult, ConditionEvaluationResult, ConditionKeyed,
    MatchedCollection, MatchedCondition, UnevaluatedCondition, UnevaluatedReason,
    UnmatchedCondition,
};

/// Condition identifier
pub type ConditionId = i64;
/// Lexicon identifier
pub type LexiconId = i64;
/// Lexicon expression identifier
pub type LexiconExpressionId = i64;
/// Collection identifier
pub type CollectionId = i64;
/// Collection sequence identifier
pub type CollectionSequenceId = i64;
/// Policy identifier
pub type PolicyId = i64;
