//! Core ConditionEngine implementation

use super::sequence;
use crate::error::Result;
use crate::metadata::{ConditionEngineMetadata, METADATA_FIELD, METADATA_MARKER_FIELD};
use chrono::{DateTime, Utc};
use docpolicy_core::{
    ClassifyDocumentResult, CollectionSequenceId, ConditionEngineResult, Document, DocumentTree,
    EnvironmentSnapshot, PolicyId,
};
use docpolicy_runtime::{EvaluationContext, EvaluationServices, RuntimeError};

/// Classifies documents into collections.
///
/// One engine serves any number of passes, possibly on several threads: the
/// regex cache and worker pool are shared, everything else lives in the pass.
#[derive(Debug)]
pub struct ConditionEngine {
    services: EvaluationServices,
    metadata: ConditionEngineMetadata,
}

impl ConditionEngine {
    pub fn new(services: EvaluationServices, metadata: ConditionEngineMetadata) -> Self {
        Self { services, metadata }
    }

    pub fn services(&self) -> &EvaluationServices {
        &self.services
    }

    pub fn metadata(&self) -> &ConditionEngineMetadata {
        &self.metadata
    }

    /// Evaluate a document against a collection sequence.
    ///
    /// A valid stored result for the same sequence, snapshot version and
    /// document content is returned as is.
    pub fn evaluate(
        &self,
        snapshot: &dyn EnvironmentSnapshot,
        sequence_id: CollectionSequenceId,
        document: &Document,
    ) -> Result<ConditionEngineResult> {
        self.evaluate_at(snapshot, sequence_id, document, Utc::now())
    }

    /// [`evaluate`](Self::evaluate) with `now` as the reference time of
    /// relative date conditions
    pub fn evaluate_at(
        &self,
        snapshot: &dyn EnvironmentSnapshot,
        sequence_id: CollectionSequenceId,
        document: &Document,
        now: DateTime<Utc>,
    ) -> Result<ConditionEngineResult> {
        let mut document = document.clone();
        let previous = self.metadata.read_from(&mut document);
        let fingerprint = document.fingerprint(&[METADATA_FIELD, METADATA_MARKER_FIELD]);

        if let Some(previous) = previous {
            if is_current(&previous, sequence_id, snapshot.version(), &fingerprint) {
                tracing::info!(
                    "Document '{}' unchanged since its last evaluation, reusing result",
                    document.reference
                );
                return Ok(previous);
            }
            tracing::debug!("Stored result of '{}' is stale", document.reference);
        }

        let sequence = snapshot
            .collection_sequence(sequence_id)
            .ok_or(RuntimeError::CollectionSequenceNotFound(sequence_id))?;

        let mut result = ConditionEngineResult::new(document.reference.clone());
        result.collection_sequence_id = Some(sequence_id);
        result.snapshot_version = snapshot.version().map(ToString::to_string);
        result.document_fingerprint = Some(fingerprint);

        let tree = DocumentTree::from_document(document);
        let mut ctx = EvaluationContext::new(tree, snapshot, &self.services)
            .with_full_condition_evaluation(sequence.full_condition_evaluation)
            .with_now(now);

        sequence::exclude_documents(&mut ctx, sequence)?;
        sequence::evaluate_collections(&mut ctx, sequence, &mut result)?;

        if result.matched_collections.is_empty() {
            result.default_collection_id = sequence.default_collection_id;
        }

        tracing::info!(
            "Evaluated '{}' against sequence {}: matched {:?}, incomplete {:?}, default {:?}",
            result.reference,
            sequence_id,
            result.matched_collection_ids(),
            result.incomplete_collections,
            result.default_collection_id
        );

        Ok(result)
    }

    /// Evaluate a document and resolve its policies
    pub fn classify(
        &self,
        snapshot: &dyn EnvironmentSnapshot,
        sequence_id: CollectionSequenceId,
        document: &Document,
    ) -> Result<ClassifyDocumentResult> {
        let result = self.evaluate(snapshot, sequence_id, document)?;
        self.classify_result(snapshot, &result)
    }

    /// Classify a document and store the evaluation metadata on it
    pub fn classify_and_annotate(
        &self,
        snapshot: &dyn EnvironmentSnapshot,
        sequence_id: CollectionSequenceId,
        document: &mut Document,
    ) -> Result<ClassifyDocumentResult> {
        let result = self.evaluate(snapshot, sequence_id, document)?;
        self.metadata.write_to(document, &result)?;
        self.classify_result(snapshot, &result)
    }

    /// The stored evaluation result of a document, if it validates
    pub fn stored_result(&self, document: &Document) -> Option<ConditionEngineResult> {
        let mut document = document.clone();
        self.metadata.read_from(&mut document)
    }

    fn classify_result(
        &self,
        snapshot: &dyn EnvironmentSnapshot,
        result: &ConditionEngineResult,
    ) -> Result<ClassifyDocumentResult> {
        Ok(ClassifyDocumentResult {
            reference: result.reference.clone(),
            matched_collections: result.matched_collections.clone(),
            unevaluated_conditions: result.unevaluated_conditions.clone(),
            default_collection_id: result.default_collection_id,
            incomplete_collections: result.incomplete_collections.clone(),
            resolved_policies: resolve_policies(snapshot, result),
            signature: self.metadata.signature(result)?,
        })
    }
}

fn is_current(
    previous: &ConditionEngineResult,
    sequence_id: CollectionSequenceId,
    snapshot_version: Option<&str>,
    fingerprint: &str,
) -> bool {
    // An unfinished pass is retried rather than reused
    previous.incomplete_collections.is_empty()
        && previous.unevaluated_conditions.is_empty()
        && previous.collection_sequence_id == Some(sequence_id)
        && snapshot_version.is_some()
        && previous.snapshot_version.as_deref() == snapshot_version
        && previous.document_fingerprint.as_deref() == Some(fingerprint)
}

/// Policies of the matched collections in order, or of the default collection
fn resolve_policies(
    snapshot: &dyn EnvironmentSnapshot,
    result: &ConditionEngineResult,
) -> Vec<PolicyId> {
    let mut policies: Vec<PolicyId> = Vec::new();

    if result.matched_collections.is_empty() {
        if let Some(default_id) = result.default_collection_id {
            match snapshot.collection(default_id) {
                Some(collection) => policies.extend(&collection.policy_ids),
                None => tracing::warn!("Default collection {} not found", default_id),
            }
        }
        return policies;
    }

    for policy_id in result
        .matched_collections
        .iter()
        .flat_map(|collection| &collection.policy_ids)
    {
        if !policies.contains(policy_id) {
            policies.push(*policy_id);
        }
    }
    policies
}
