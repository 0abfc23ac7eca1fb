//! AND / OR conditions

use super::evaluate as dispatch;
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::{BooleanCondition, BooleanOperator};
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId, MatchedCondition, UnmatchedCondition};

/// Evaluate the children in order against the same document.
///
/// AND stops at the first non-matching child and OR at the first matching
/// child, unless the context asks for full evaluation. The audit sets of every
/// evaluated child are kept. On a match the boolean itself is reported along
/// with the reportable matches of its matching children; it is never added to
/// `all_condition_matches`. A non-match is recorded as unmatched unless a child
/// could not be evaluated. A boolean without children never matches.
pub fn evaluate(
    ctx: &mut EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    boolean: &BooleanCondition,
) -> Result<ConditionEvaluationResult> {
    let reference = ctx.tree().node(document).reference().to_string();
    let full = ctx.full_condition_evaluation();

    let mut result = ConditionEvaluationResult::no_match();
    if boolean.children.is_empty() {
        tracing::debug!("Boolean condition {:?} has no children", condition.id);
        result.add_unmatched_condition(UnmatchedCondition::new(reference, condition));
        return Ok(result);
    }

    let mut is_match = boolean.operator == BooleanOperator::And;
    let mut matching_children = Vec::new();

    for child in &boolean.children {
        let child_result = dispatch(ctx, document, child)?;
        result.absorb_audit(&child_result);

        let decided = match boolean.operator {
            BooleanOperator::And if !child_result.is_match => {
                is_match = false;
                true
            }
            BooleanOperator::Or if child_result.is_match => {
                is_match = true;
                true
            }
            _ => false,
        };
        if child_result.is_match {
            matching_children.push(child_result);
        }
        if decided && !full {
            break;
        }
    }

    result.is_match = is_match;
    if is_match {
        result.add_matched_condition(MatchedCondition::new(reference, condition));
        for child_result in &matching_children {
            result.absorb_matches(child_result);
        }
    } else if !result.has_unevaluated() {
        result.add_unmatched_condition(UnmatchedCondition::new(reference, condition));
    }
    Ok(result)
}
