//! Lexicon conditions

use super::match_terms;
use crate::context::EvaluationContext;
use crate::error::Result;
use crate::service::TermQuery;
use docpolicy_core::condition::LexiconCondition;
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId};

/// Match any expression of the lexicon. An unknown lexicon fails the pass.
pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    lexicon: &LexiconCondition,
) -> Result<ConditionEvaluationResult> {
    let resolved = ctx.resolve_lexicon(lexicon.value)?;
    match_terms(ctx, document, condition, &lexicon.field, TermQuery::Lexicon(resolved))
}
