//! Field presence

use super::{field_values, matched, unmatched};
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::ExistsCondition;
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId};

pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    exists: &ExistsCondition,
) -> Result<ConditionEvaluationResult> {
    if field_values(ctx, document, &exists.field).is_empty() {
        Ok(unmatched(ctx, document, condition))
    } else {
        Ok(matched(ctx, document, condition, Vec::new()))
    }
}
