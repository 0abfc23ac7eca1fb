//! Configuration objects held by a snapshot

use crate::condition::Condition;
use crate::{
    CollectionId, CollectionSequenceId, ConditionId, LexiconExpressionId, LexiconId, PolicyId,
};
use serde::{Deserialize, Serialize};

/// How a lexicon expression is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionType {
    /// Boolean term query
    #[default]
    Text,
    /// Regular expression
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LexiconExpressionId>,
    pub expression: String,
    #[serde(default, rename = "type")]
    pub expression_type: ExpressionType,
}

/// A named list of term expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub id: LexiconId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub expressions: Vec<LexiconExpression>,
}

/// A named grouping whose membership is decided by its root condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCollection {
    pub id: CollectionId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub policy_ids: Vec<PolicyId>,
}

/// One step of a collection sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSequenceEntry {
    #[serde(default)]
    pub order: i32,
    pub collection_ids: Vec<CollectionId>,
    /// Stop walking the sequence once a collection of this entry matched
    #[serde(default)]
    pub stop_on_match: bool,
}

/// An ordered list of collections evaluated together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSequence {
    pub id: CollectionSequenceId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_collection_id: Option<CollectionId>,
    /// Conditions that exclude a child document (and its subtree) from the pass
    #[serde(default)]
    pub excluded_document_condition_ids: Vec<ConditionId>,
    /// Evaluate every boolean child even when the outcome is already known
    #[serde(default)]
    pub full_condition_evaluation: bool,
    #[serde(default)]
    pub entries: Vec<CollectionSequenceEntry>,
}

impl CollectionSequence {
    /// Entries sorted by `order`, stable for equal orders
    pub fn ordered_entries(&self) -> Vec<&CollectionSequenceEntry> {
        let mut entries: Vec<&CollectionSequenceEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }
}

/// A label naming one or more metadata fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLabel {
    pub name: String,
    pub fields: Vec<String>,
}
