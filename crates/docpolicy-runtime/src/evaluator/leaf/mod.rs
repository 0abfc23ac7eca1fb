//! Leaf conditions over document fields
//!
//! A field's values are the document's metadata values for that name (or for
//! every field of a field label with that name) plus the text of a content
//! stream with that name. Lookups ignore case.

pub mod date;
pub mod exists;
pub mod lexicon;
pub mod number;
pub mod regex;
pub mod string;
pub mod text;

use crate::context::EvaluationContext;
use crate::error::Result;
use crate::service::{ServiceResponse, TermMatchRequest, TermQuery};
use docpolicy_core::{
    Condition, ConditionEvaluationResult, DocumentId, MatchedCondition, UnevaluatedCondition,
    UnevaluatedReason, UnmatchedCondition,
};
use std::borrow::Cow;

/// Values of a field on a document
pub fn field_values<'c>(
    ctx: &'c EvaluationContext<'_>,
    document: DocumentId,
    field: &str,
) -> Vec<Cow<'c, str>> {
    let node = ctx.tree().node(document);
    match ctx.snapshot().field_label(field) {
        Some(label) => label
            .fields
            .iter()
            .flat_map(|labelled| node.field_values(labelled))
            .collect(),
        None => node.field_values(field),
    }
}

fn reference(ctx: &EvaluationContext<'_>, document: DocumentId) -> String {
    ctx.tree().node(document).reference().to_string()
}

pub(crate) fn matched(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    terms: Vec<String>,
) -> ConditionEvaluationResult {
    ConditionEvaluationResult::matched(
        MatchedCondition::new(reference(ctx, document), condition).with_terms(terms),
    )
}

pub(crate) fn unmatched(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
) -> ConditionEvaluationResult {
    ConditionEvaluationResult::unmatched(UnmatchedCondition::new(
        reference(ctx, document),
        condition,
    ))
}

pub(crate) fn unevaluated(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    reason: UnevaluatedReason,
) -> ConditionEvaluationResult {
    ConditionEvaluationResult::unevaluated(UnevaluatedCondition::new(
        reference(ctx, document),
        condition,
        reason,
    ))
}

/// Delegate a text or lexicon query over `field` to the term matcher
pub(crate) fn match_terms(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    field: &str,
    query: TermQuery<'_>,
) -> Result<ConditionEvaluationResult> {
    let values = field_values(ctx, document, field);
    if values.is_empty() {
        return Ok(unevaluated(ctx, document, condition, UnevaluatedReason::MissingField));
    }

    let request = TermMatchRequest::new(query, values.iter().map(|v| v.as_ref()).collect());
    match ctx.services().term_matcher().match_terms(&request) {
        ServiceResponse::Available(found) if found.is_match => Ok(ConditionEvaluationResult::matched(
            MatchedCondition::new(reference(ctx, document), condition)
                .with_terms(found.terms)
                .with_expression_ids(found.expression_ids),
        )),
        ServiceResponse::Available(_) => Ok(unmatched(ctx, document, condition)),
        ServiceResponse::Unavailable(reason) => {
            tracing::warn!(
                "Term matcher unavailable for condition {:?}: {}",
                condition.id,
                reason
            );
            Ok(unevaluated(ctx, document, condition, UnevaluatedReason::MissingService))
        }
    }
}
