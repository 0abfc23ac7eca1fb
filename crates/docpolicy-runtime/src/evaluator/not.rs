//! Negation of a referenced condition

use super::evaluate_reference;
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::NotCondition;
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId, MatchedCondition, UnmatchedCondition};

/// Negate the referenced condition.
///
/// Unevaluated and unmatched entries of the child pass through. A matching
/// child's matches are dropped and the NOT is unmatched. A non-matching child
/// makes the NOT the matched condition, unless the child was not evaluated.
pub fn evaluate(
    ctx: &mut EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    not: &NotCondition,
) -> Result<ConditionEvaluationResult> {
    let child = evaluate_reference(ctx, document, not.condition)?;
    let reference = ctx.tree().node(document).reference().to_string();

    let mut result = ConditionEvaluationResult {
        is_match: !child.is_match,
        ..ConditionEvaluationResult::no_match()
    };
    for unevaluated in &child.unevaluated_conditions {
        result.add_unevaluated_condition(unevaluated.clone());
    }
    for unmatched in &child.unmatched_conditions {
        result.add_unmatched_condition(unmatched.clone());
    }

    if child.is_match {
        result.add_unmatched_condition(UnmatchedCondition::new(reference, condition));
    } else if !child.has_unevaluated() {
        let matched = MatchedCondition::new(reference, condition);
        result.add_all_condition_match(matched.clone());
        result.add_matched_condition(matched);
    }
    Ok(result)
}
