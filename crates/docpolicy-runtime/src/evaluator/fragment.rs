//! Fragment pointers

use super::evaluate_reference;
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::FragmentCondition;
use docpolicy_core::{ConditionEvaluationResult, DocumentId};

/// Evaluate the referenced condition on the same document. The pointer itself
/// never appears in the result.
pub fn evaluate(
    ctx: &mut EvaluationContext<'_>,
    document: DocumentId,
    fragment: &FragmentCondition,
) -> Result<ConditionEvaluationResult> {
    evaluate_reference(ctx, document, fragment.value)
}
