//! Regular expression conditions

use super::{field_values, matched, unevaluated, unmatched};
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::RegexCondition;
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId, UnevaluatedReason};

/// Run the pattern over every value on the worker pool.
///
/// A malformed pattern or a match exceeding the timeout fails the pass.
pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    regex: &RegexCondition,
) -> Result<ConditionEvaluationResult> {
    let values: Vec<String> = field_values(ctx, document, &regex.field)
        .into_iter()
        .map(|value| value.into_owned())
        .collect();
    if values.is_empty() {
        return Ok(unevaluated(ctx, document, condition, UnevaluatedReason::MissingField));
    }

    let found = ctx.services().find_matches(&regex.value, values)?;
    if found.is_match {
        Ok(matched(ctx, document, condition, found.terms))
    } else {
        Ok(unmatched(ctx, document, condition))
    }
}
