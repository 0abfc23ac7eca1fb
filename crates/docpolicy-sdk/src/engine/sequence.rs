//! One pass over a collection sequence

use docpolicy_core::environment::CollectionSequence;
use docpolicy_core::{ConditionEngineResult, ConditionEvaluationResult, MatchedCollection};
use docpolicy_runtime::{evaluate, EvaluationContext, Result, RuntimeError};

/// Exclude every descendant of the root that matches one of the sequence's
/// exclusion conditions, together with its subtree.
///
/// Results cached while checking exclusions are dropped afterwards.
pub(super) fn exclude_documents(
    ctx: &mut EvaluationContext<'_>,
    sequence: &CollectionSequence,
) -> Result<()> {
    if sequence.excluded_document_condition_ids.is_empty() {
        return Ok(());
    }

    let root = ctx.tree().root();
    let descendants = ctx.tree().descendants(root);

    for &condition_id in &sequence.excluded_document_condition_ids {
        let condition = ctx.resolve_condition(condition_id)?;
        for &document in &descendants {
            if ctx.tree().is_excluded(document) {
                continue;
            }
            if evaluate(ctx, document, condition)?.is_match {
                tracing::debug!(
                    "Document '{}' excluded by condition {}",
                    ctx.tree().node(document).reference(),
                    condition_id
                );
                ctx.tree_mut().exclude_subtree(document);
            }
        }
    }

    ctx.tree_mut().clear_results();
    Ok(())
}

/// Walk the sequence entries in order and record matched and incomplete
/// collections on `result`
pub(super) fn evaluate_collections(
    ctx: &mut EvaluationContext<'_>,
    sequence: &CollectionSequence,
    result: &mut ConditionEngineResult,
) -> Result<()> {
    let root = ctx.tree().root();
    let snapshot = ctx.snapshot();
    let mut audit = ConditionEvaluationResult::no_match();
    let mut reportable = ConditionEvaluationResult::no_match();

    for entry in sequence.ordered_entries() {
        let mut entry_matched = false;

        for &collection_id in &entry.collection_ids {
            let collection = snapshot
                .collection(collection_id)
                .ok_or(RuntimeError::CollectionNotFound(collection_id))?;

            if result.is_matched(collection_id) {
                entry_matched = true;
                continue;
            }

            let Some(condition) = &collection.condition else {
                tracing::warn!("Collection {} has no condition, skipping", collection_id);
                continue;
            };

            let evaluation = evaluate(ctx, root, condition)?;
            audit.absorb_audit(&evaluation);

            if evaluation.is_match {
                tracing::debug!("Collection {} matched", collection_id);
                entry_matched = true;
                reportable.absorb_matches(&evaluation);
                result.matched_collections.push(MatchedCollection {
                    id: collection.id,
                    name: collection.name.clone(),
                    matched_conditions: evaluation.matched_conditions,
                    policy_ids: collection.policy_ids.clone(),
                });
            } else if evaluation.has_unevaluated() {
                tracing::debug!("Collection {} could not be fully evaluated", collection_id);
                if !result.incomplete_collections.contains(&collection_id) {
                    result.incomplete_collections.push(collection_id);
                }
            }
        }

        if entry.stop_on_match && entry_matched {
            tracing::debug!("Stopping sequence {} after entry {}", sequence.id, entry.order);
            break;
        }
    }

    result.matched_conditions = reportable.matched_conditions;
    result.unmatched_conditions = audit.unmatched_conditions;
    result.unevaluated_conditions = audit.unevaluated_conditions;
    Ok(())
}
