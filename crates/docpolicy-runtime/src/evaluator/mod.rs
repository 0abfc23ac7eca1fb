//! Condition evaluation
//!
//! [`evaluate`] is the single entry point. It expands the condition's target
//! into the documents to check, consults the per-document result cache and
//! dispatches on the condition kind:
//!
//! | kind | evaluator |
//! |---|---|
//! | boolean | [`boolean`] |
//! | not | [`not`] |
//! | fragment | [`fragment`] |
//! | number, string, date, regex, text, lexicon, exists | [`leaf`] |

pub mod boolean;
pub mod fragment;
pub mod leaf;
pub mod not;

use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::{
    Condition, ConditionEvaluationResult, ConditionId, ConditionKind, ConditionTarget, DocumentId,
    DocumentTree,
};

/// Evaluate a condition against a document of the context's tree.
///
/// The result of an excluded document is an empty non-match. Otherwise the
/// condition is checked on every target document that is not excluded:
/// `is_match` is true when any target matched, the audit sets are the union
/// over all targets and `matched_conditions` the union over matching targets.
pub fn evaluate(
    ctx: &mut EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
) -> Result<ConditionEvaluationResult> {
    if ctx.tree().is_excluded(document) {
        tracing::trace!(
            "Skipping excluded document '{}'",
            ctx.tree().node(document).reference()
        );
        return Ok(ConditionEvaluationResult::no_match());
    }

    let mut aggregate = ConditionEvaluationResult::no_match();
    for target in target_documents(ctx.tree(), document, condition) {
        if ctx.tree().is_excluded(target) {
            continue;
        }

        let result = evaluate_on_document(ctx, target, condition)?;
        aggregate.is_match |= result.is_match;
        aggregate.absorb_audit(&result);
        if result.is_match {
            aggregate.absorb_matches(&result);
        }
    }
    Ok(aggregate)
}

/// Documents a condition is checked on, starting from `document`
pub fn target_documents(
    tree: &DocumentTree,
    document: DocumentId,
    condition: &Condition,
) -> Vec<DocumentId> {
    let below = || {
        if condition.include_descendants {
            tree.descendants(document)
        } else {
            tree.children(document).to_vec()
        }
    };

    match condition.target {
        ConditionTarget::Container => vec![document],
        ConditionTarget::Children => below(),
        ConditionTarget::All => {
            let mut targets = vec![document];
            targets.extend(below());
            targets
        }
    }
}

fn evaluate_on_document(
    ctx: &mut EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
) -> Result<ConditionEvaluationResult> {
    if let Some(id) = condition.id {
        if let Some(cached) = ctx.tree().node(document).condition_evaluation_result(id) {
            return Ok(cached.clone());
        }
    }

    let result = match &condition.kind {
        ConditionKind::Boolean(boolean) => boolean::evaluate(ctx, document, condition, boolean)?,
        ConditionKind::Not(not) => not::evaluate(ctx, document, condition, not)?,
        ConditionKind::Fragment(fragment) => fragment::evaluate(ctx, document, fragment)?,
        ConditionKind::Number(number) => leaf::number::evaluate(ctx, document, condition, number)?,
        ConditionKind::String(string) => leaf::string::evaluate(ctx, document, condition, string)?,
        ConditionKind::Date(date) => leaf::date::evaluate(ctx, document, condition, date)?,
        ConditionKind::Regex(regex) => leaf::regex::evaluate(ctx, document, condition, regex)?,
        ConditionKind::Text(text) => leaf::text::evaluate(ctx, document, condition, text)?,
        ConditionKind::Lexicon(lexicon) => {
            leaf::lexicon::evaluate(ctx, document, condition, lexicon)?
        }
        ConditionKind::Exists(exists) => leaf::exists::evaluate(ctx, document, condition, exists)?,
    };

    tracing::debug!(
        "Condition {:?} ({}) on '{}': match={}",
        condition.id,
        condition.condition_type(),
        ctx.tree().node(document).reference(),
        result.is_match
    );

    if let Some(id) = condition.id {
        ctx.tree_mut()
            .node_mut(document)
            .cache_condition_evaluation_result(id, result.clone());
    }
    Ok(result)
}

/// Resolve a referenced condition by id and evaluate it on the same document
pub(crate) fn evaluate_reference(
    ctx: &mut EvaluationContext<'_>,
    document: DocumentId,
    id: ConditionId,
) -> Result<ConditionEvaluationResult> {
    let referenced = ctx.resolve_condition(id)?;
    ctx.enter_reference(id)?;
    let result = evaluate(ctx, document, referenced);
    ctx.leave_reference(id);
    result
}
