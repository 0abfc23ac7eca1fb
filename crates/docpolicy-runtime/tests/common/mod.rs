//! Common test utilities for runtime integration tests

#![allow(dead_code)]

use docpolicy_core::{
    Condition, ConditionEvaluationResult, ConditionKeyed, Document, DocumentTree, InMemorySnapshot,
};
use docpolicy_runtime::{
    evaluate, EvaluationContext, EvaluationServices, KeywordTermMatcher, MatchSettings, Result,
    ServiceResponse, TermMatchRequest, TermMatchResult, TermMatcher, TermQuery,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Services backed by the keyword matcher and default limits
pub fn services() -> EvaluationServices {
    services_with(Arc::new(KeywordTermMatcher::new()))
}

pub fn services_with(matcher: Arc<dyn TermMatcher>) -> EvaluationServices {
    EvaluationServices::new(MatchSettings::default(), matcher).unwrap()
}

/// Evaluate a condition on the root of a document
pub fn evaluate_root(
    snapshot: &InMemorySnapshot,
    services: &EvaluationServices,
    document: Document,
    condition: &Condition,
) -> Result<ConditionEvaluationResult> {
    evaluate_tree(snapshot, services, DocumentTree::from_document(document), condition, false)
}

/// Evaluate a condition on the root of a prepared tree
pub fn evaluate_tree(
    snapshot: &InMemorySnapshot,
    services: &EvaluationServices,
    tree: DocumentTree,
    condition: &Condition,
    full_condition_evaluation: bool,
) -> Result<ConditionEvaluationResult> {
    let root = tree.root();
    let mut ctx = EvaluationContext::new(tree, snapshot, services)
        .with_full_condition_evaluation(full_condition_evaluation);
    evaluate(&mut ctx, root, condition)
}

/// Sorted references of a record set
pub fn references<T: ConditionKeyed>(records: &[T]) -> Vec<String> {
    let mut references: Vec<String> = records.iter().map(|r| r.reference().to_string()).collect();
    references.sort();
    references
}

/// Sorted condition ids of a record set
pub fn ids<T: ConditionKeyed>(records: &[T]) -> Vec<i64> {
    let mut ids: Vec<i64> = records.iter().filter_map(|r| r.key().id).collect();
    ids.sort();
    ids
}

/// Term matcher that counts calls and matches a query contained in any value
#[derive(Debug, Default)]
pub struct CountingTermMatcher {
    calls: AtomicUsize,
}

impl CountingTermMatcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TermMatcher for CountingTermMatcher {
    fn match_terms(&self, request: &TermMatchRequest<'_>) -> ServiceResponse<TermMatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let TermQuery::Text(query) = request.query else {
            return ServiceResponse::Unavailable("only text queries".to_string());
        };
        let query = query.to_lowercase();
        let is_match = request
            .values
            .iter()
            .any(|value| value.to_lowercase().contains(&query));
        ServiceResponse::Available(TermMatchResult {
            is_match,
            terms: if is_match { vec![query] } else { Vec::new() },
            expression_ids: Vec::new(),
        })
    }
}
