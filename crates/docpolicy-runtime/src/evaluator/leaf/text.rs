//! Boolean term queries

use super::match_terms;
use crate::context::EvaluationContext;
use crate::error::Result;
use crate::service::TermQuery;
use docpolicy_core::condition::TextCondition;
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId};

pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    text: &TextCondition,
) -> Result<ConditionEvaluationResult> {
    match_terms(ctx, document, condition, &text.field, TermQuery::Text(&text.value))
}
