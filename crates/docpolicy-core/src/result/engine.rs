//! Results of a full pass over a collection sequence

use super::records::{MatchedCondition, UnevaluatedCondition, UnmatchedCondition};
use crate::{CollectionId, CollectionSequenceId, PolicyId};
use serde::{Deserialize, Serialize};

/// A collection the document belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedCollection {
    pub id: CollectionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub matched_conditions: Vec<MatchedCondition>,
    #[serde(default)]
    pub policy_ids: Vec<PolicyId>,
}

/// Outcome of evaluating one document against one collection sequence.
///
/// This is the state stored on a document as evaluation metadata, so every
/// collection in it is an ordered `Vec` and its JSON form is canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEngineResult {
    pub reference: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_sequence_id: Option<CollectionSequenceId>,

    /// Version of the environment snapshot used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<String>,

    /// Fingerprint of the evaluated document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_fingerprint: Option<String>,

    #[serde(default)]
    pub matched_collections: Vec<MatchedCollection>,

    #[serde(default)]
    pub unmatched_conditions: Vec<UnmatchedCondition>,

    #[serde(default)]
    pub unevaluated_conditions: Vec<UnevaluatedCondition>,

    /// Union of the matched conditions of every collection
    #[serde(default)]
    pub matched_conditions: Vec<MatchedCondition>,

    /// Collection assigned when nothing matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_collection_id: Option<CollectionId>,

    /// Candidate collections that could not be fully evaluated
    #[serde(default)]
    pub incomplete_collections: Vec<CollectionId>,
}

impl ConditionEngineResult {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    pub fn matched_collection_ids(&self) -> Vec<CollectionId> {
        self.matched_collections.iter().map(|c| c.id).collect()
    }

    pub fn is_matched(&self, collection_id: CollectionId) -> bool {
        self.matched_collections.iter().any(|c| c.id == collection_id)
    }
}

/// Public outcome of classifying a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyDocumentResult {
    pub reference: String,
    pub matched_collections: Vec<MatchedCollection>,
    pub unevaluated_conditions: Vec<UnevaluatedCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_collection_id: Option<CollectionId>,
    pub incomplete_collections: Vec<CollectionId>,
    pub resolved_policies: Vec<PolicyId>,
    /// Opaque signed form of the engine result
    pub signature: String,
}
