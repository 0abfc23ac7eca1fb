//! In-memory environment snapshot

use super::types::{CollectionSequence, DocumentCollection, FieldLabel, Lexicon};
use super::EnvironmentSnapshot;
use crate::condition::Condition;
use crate::error::{CoreError, Result};
use crate::{CollectionId, CollectionSequenceId, ConditionId, LexiconId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Serialized form of a snapshot
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    lexicons: Vec<Lexicon>,
    #[serde(default)]
    collections: Vec<DocumentCollection>,
    #[serde(default)]
    collection_sequences: Vec<CollectionSequence>,
    #[serde(default)]
    field_labels: Vec<FieldLabel>,
}

/// Snapshot held entirely in memory.
///
/// Every condition carrying an id is indexed, including conditions nested in
/// boolean trees and collection root conditions, so `not` and `fragment`
/// conditions can reference any of them.
///
/// ```yaml
/// version: "2024-06-01"
/// conditions:
///   - id: 100
///     name: confidential marker
///     is_fragment: true
///     condition_type: string
///     field: classification
///     operator: is
///     value: confidential
/// collections:
///   - id: 1
///     name: restricted
///     policy_ids: [10]
///     condition:
///       id: 1000
///       condition_type: fragment
///       value: 100
/// collection_sequences:
///   - id: 1
///     name: default
///     entries:
///       - order: 1
///         collection_ids: [1]
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshot {
    version: Option<String>,
    conditions: BTreeMap<ConditionId, Condition>,
    lexicons: HashMap<LexiconId, Lexicon>,
    collections: BTreeMap<CollectionId, DocumentCollection>,
    collection_sequences: HashMap<CollectionSequenceId, CollectionSequence>,
    field_labels: HashMap<String, FieldLabel>,
}

impl InMemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(content)?;
        Ok(Self::from_file_content(file))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: SnapshotFile = serde_yaml::from_str(content)?;
        Ok(Self::from_file_content(file))
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Err(CoreError::InvalidValue(format!(
                "Unsupported snapshot file type: {}",
                path.display()
            ))),
        }
    }

    fn from_file_content(file: SnapshotFile) -> Self {
        let mut snapshot = Self::new();
        snapshot.version = file.version;
        for condition in file.conditions {
            snapshot.insert_condition(condition);
        }
        for lexicon in file.lexicons {
            snapshot.lexicons.insert(lexicon.id, lexicon);
        }
        for collection in file.collections {
            snapshot.insert_collection(collection);
        }
        for sequence in file.collection_sequences {
            snapshot.collection_sequences.insert(sequence.id, sequence);
        }
        for label in file.field_labels {
            snapshot.insert_field_label(label);
        }
        log::debug!(
            "Loaded snapshot version={:?}: {} conditions, {} collections",
            snapshot.version,
            snapshot.conditions.len(),
            snapshot.collections.len()
        );
        snapshot
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.insert_condition(condition);
        self
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicons.insert(lexicon.id, lexicon);
        self
    }

    pub fn with_collection(mut self, collection: DocumentCollection) -> Self {
        self.insert_collection(collection);
        self
    }

    pub fn with_collection_sequence(mut self, sequence: CollectionSequence) -> Self {
        self.collection_sequences.insert(sequence.id, sequence);
        self
    }

    pub fn with_field_label(mut self, label: FieldLabel) -> Self {
        self.insert_field_label(label);
        self
    }

    fn insert_condition(&mut self, condition: Condition) {
        self.index_nested(&condition);
        if condition.id.is_none() {
            log::warn!(
                "Standalone condition '{}' has no id and cannot be referenced",
                condition.name
            );
        }
    }

    fn insert_collection(&mut self, collection: DocumentCollection) {
        if let Some(condition) = &collection.condition {
            self.index_nested(condition);
        }
        self.collections.insert(collection.id, collection);
    }

    fn insert_field_label(&mut self, label: FieldLabel) {
        self.field_labels.insert(label.name.to_lowercase(), label);
    }

    fn index_nested(&mut self, condition: &Condition) {
        let mut found = Vec::new();
        condition.walk(&mut |c| {
            if let Some(id) = c.id {
                found.push((id, c.clone()));
            }
        });
        for (id, condition) in found {
            if let Some(previous) = self.conditions.insert(id, condition) {
                log::warn!("Condition id {} ('{}') defined more than once", id, previous.name);
            }
        }
    }
}

impl EnvironmentSnapshot for InMemorySnapshot {
    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn condition(&self, id: ConditionId) -> Option<&Condition> {
        self.conditions.get(&id)
    }

    fn lexicon(&self, id: LexiconId) -> Option<&Lexicon> {
        self.lexicons.get(&id)
    }

    fn collection(&self, id: CollectionId) -> Option<&DocumentCollection> {
        self.collections.get(&id)
    }

    fn collection_sequence(&self, id: CollectionSequenceId) -> Option<&CollectionSequence> {
        self.collection_sequences.get(&id)
    }

    fn field_label(&self, name: &str) -> Option<&FieldLabel> {
        self.field_labels.get(&name.to_lowercase())
    }

    fn conditions(&self) -> Vec<&Condition> {
        self.conditions.values().collect()
    }

    fn collections(&self) -> Vec<&DocumentCollection> {
        self.collections.values().collect()
    }
}
