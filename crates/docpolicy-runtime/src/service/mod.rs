//! Term matching service
//!
//! Text and lexicon conditions are delegated to a [`TermMatcher`]. A matcher
//! either answers or reports itself unavailable, in which case the condition
//! is recorded as unevaluated with `MISSING_SERVICE`.

mod keyword;

pub use keyword::KeywordTermMatcher;

use docpolicy_core::environment::Lexicon;
use docpolicy_core::LexiconExpressionId;
use serde::{Deserialize, Serialize};

/// Outcome of a call to an optional backing service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResponse<T> {
    Available(T),
    /// The service could not answer, with the reason
    Unavailable(String),
}

impl<T> ServiceResponse<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, ServiceResponse::Available(_))
    }
}

/// What to look for
#[derive(Debug, Clone, Copy)]
pub enum TermQuery<'a> {
    /// Boolean term query text
    Text(&'a str),
    /// Every expression of a lexicon
    Lexicon(&'a Lexicon),
}

/// A term match request over the values of one field
#[derive(Debug, Clone)]
pub struct TermMatchRequest<'a> {
    pub query: TermQuery<'a>,
    pub values: Vec<&'a str>,
}

impl<'a> TermMatchRequest<'a> {
    pub fn new(query: TermQuery<'a>, values: Vec<&'a str>) -> Self {
        Self { query, values }
    }
}

/// Terms found by a matcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatchResult {
    pub is_match: bool,
    /// Literal text that matched
    pub terms: Vec<String>,
    /// Lexicon expressions that matched
    pub expression_ids: Vec<LexiconExpressionId>,
}

/// Boolean term query capability
pub trait TermMatcher: Send + Sync {
    fn match_terms(&self, request: &TermMatchRequest<'_>) -> ServiceResponse<TermMatchResult>;
}

/// Matcher for deployments without a term matching service
#[derive(Debug, Clone, Default)]
pub struct UnavailableTermMatcher;

impl TermMatcher for UnavailableTermMatcher {
    fn match_terms(&self, _request: &TermMatchRequest<'_>) -> ServiceResponse<TermMatchResult> {
        ServiceResponse::Unavailable("no term matching service configured".to_string())
    }
}
