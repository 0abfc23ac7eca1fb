//! Evaluation results
//!
//! - [`ConditionEvaluationResult`]: outcome of one condition (possibly
//!   recursive) against one document (possibly over its descendants)
//! - [`MatchedCondition`], [`UnmatchedCondition`], [`UnevaluatedCondition`]:
//!   immutable result records, looked up by [`ConditionKey`](crate::ConditionKey)
//! - [`ConditionEngineResult`] / [`ClassifyDocumentResult`]: outcome of a
//!   whole pass over a collection sequence

mod engine;
mod evaluation;
mod records;

pub use engine::{ClassifyDocumentResult, ConditionEngineResult, MatchedCollection};
pub use evaluation::ConditionEvaluationResult;
pub use records::{
    contains_key, find_by_key, ConditionKeyed, MatchedCondition, UnevaluatedCondition,
    UnevaluatedReason, UnmatchedCondition,
};
