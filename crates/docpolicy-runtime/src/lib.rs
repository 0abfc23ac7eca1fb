//! docpolicy Runtime - Condition evaluation engine
//!
//! This crate evaluates conditions against a document tree:
//! - Per-pass evaluation context owning the document tree and its result caches
//! - Target expansion, caching and dispatch over every condition kind
//! - Boolean, not and fragment composition
//! - Leaf evaluators for number, string, date, regex, text, lexicon and exists
//! - Shared regex cache and bounded match worker pool
//! - The term matching service capability

pub mod context;
pub mod error;
pub mod evaluator;
pub mod pattern;
pub mod service;

// Re-export main types
pub use context::{EvaluationContext, EvaluationServices, MatchSettings, PatternMatches};
pub use error::{Result, RuntimeError};
pub use evaluator::{evaluate, target_documents};
pub use pattern::{MatchWorkerPool, RegexCache};
pub use service::{
    KeywordTermMatcher, ServiceResponse, TermMatchRequest, TermMatchResult, TermMatcher,
    TermQuery, UnavailableTermMatcher,
};
