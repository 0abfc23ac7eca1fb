//! Numeric comparisons

use super::{field_values, matched, unmatched};
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::NumberCondition;
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId};

/// Match when any value parses as a number satisfying the operator.
/// Values that do not parse are skipped.
pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    number: &NumberCondition,
) -> Result<ConditionEvaluationResult> {
    let values = field_values(ctx, document, &number.field);
    let is_match = values
        .iter()
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .any(|value| number.operator.compare(value, number.value));

    if is_match {
        Ok(matched(ctx, document, condition, Vec::new()))
    } else {
        Ok(unmatched(ctx, document, condition))
    }
}
