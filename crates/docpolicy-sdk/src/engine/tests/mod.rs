//! Unit tests for ConditionEngine

use super::*;
use crate::builder::ConditionEngineBuilder;
use crate::error::SdkError;
use crate::metadata::{METADATA_FIELD, METADATA_MARKER_FIELD};
use docpolicy_core::condition::StringOperator;
use docpolicy_core::environment::{CollectionSequence, CollectionSequenceEntry, DocumentCollection};
use docpolicy_core::{Condition, Document, InMemorySnapshot};
use docpolicy_runtime::RuntimeError;

fn engine() -> ConditionEngine {
    ConditionEngineBuilder::new().build().unwrap()
}

fn collection(id: i64, condition: Option<Condition>, policy_ids: Vec<i64>) -> DocumentCollection {
    DocumentCollection {
        id,
        name: format!("collection-{}", id),
        description: None,
        condition,
        policy_ids,
    }
}

fn sequence(entries: Vec<Vec<i64>>, default_collection_id: Option<i64>) -> CollectionSequence {
    CollectionSequence {
        id: 1,
        name: "main".to_string(),
        description: None,
        default_collection_id,
        excluded_document_condition_ids: Vec::new(),
        full_condition_evaluation: false,
        entries: entries
            .into_iter()
            .enumerate()
            .map(|(order, collection_ids)| CollectionSequenceEntry {
                order: order as i32,
                collection_ids,
                stop_on_match: false,
            })
            .collect(),
    }
}

fn is_type(value: &str) -> Option<Condition> {
    Some(Condition::string("type", StringOperator::Is, value))
}

#[test]
fn test_policies_are_an_ordered_union() {
    let snapshot = InMemorySnapshot::new()
        .with_collection(collection(1, is_type("invoice"), vec![30, 10]))
        .with_collection(collection(2, Some(Condition::exists("type")), vec![10, 20]))
        .with_collection_sequence(sequence(vec![vec![1, 2]], None));
    let document = Document::new("doc").with_field("type", "Invoice");

    let result = engine().classify(&snapshot, 1, &document).unwrap();

    assert_eq!(result.resolved_policies, vec![30, 10, 20]);
    assert_eq!(result.matched_collections.len(), 2);
    assert!(result.default_collection_id.is_none());
    assert!(!result.signature.is_empty());
}

#[test]
fn test_default_collection_policies() {
    let snapshot = InMemorySnapshot::new()
        .with_collection(collection(1, is_type("invoice"), vec![10]))
        .with_collection(collection(9, None, vec![90]))
        .with_collection_sequence(sequence(vec![vec![1]], Some(9)));
    let document = Document::new("doc").with_field("type", "contract");

    let result = engine().classify(&snapshot, 1, &document).unwrap();

    assert!(result.matched_collections.is_empty());
    assert_eq!(result.default_collection_id, Some(9));
    assert_eq!(result.resolved_policies, vec![90]);
}

#[test]
fn test_collection_without_condition_never_matches() {
    let snapshot = InMemorySnapshot::new()
        .with_collection(collection(1, None, vec![10]))
        .with_collection_sequence(sequence(vec![vec![1]], None));

    let result = engine()
        .evaluate(&snapshot, 1, &Document::new("doc"))
        .unwrap();
    assert!(result.matched_collections.is_empty());
    assert!(result.incomplete_collections.is_empty());
}

#[test]
fn test_unknown_sequence_and_collection() {
    let engine = engine();
    let snapshot = InMemorySnapshot::new().with_collection_sequence(sequence(vec![vec![5]], None));

    let err = engine.evaluate(&snapshot, 2, &Document::new("doc")).unwrap_err();
    assert!(matches!(
        err,
        SdkError::RuntimeError(RuntimeError::CollectionSequenceNotFound(2))
    ));

    let err = engine.evaluate(&snapshot, 1, &Document::new("doc")).unwrap_err();
    assert!(matches!(
        err,
        SdkError::RuntimeError(RuntimeError::CollectionNotFound(5))
    ));
}

#[test]
fn test_result_records_pass_identity() {
    let snapshot = InMemorySnapshot::new()
        .with_version("v1")
        .with_collection(collection(1, is_type("invoice"), vec![10]))
        .with_collection_sequence(sequence(vec![vec![1]], None));
    let document = Document::new("doc").with_field("type", "invoice");

    let result = engine().evaluate(&snapshot, 1, &document).unwrap();

    assert_eq!(result.reference, "doc");
    assert_eq!(result.collection_sequence_id, Some(1));
    assert_eq!(result.snapshot_version.as_deref(), Some("v1"));
    assert_eq!(
        result.document_fingerprint,
        Some(document.fingerprint(&[METADATA_FIELD, METADATA_MARKER_FIELD]))
    );
}

#[test]
fn test_stored_result_after_annotate() {
    let engine = engine();
    let snapshot = InMemorySnapshot::new()
        .with_collection(collection(1, is_type("invoice"), vec![10]))
        .with_collection_sequence(sequence(vec![vec![1]], None));
    let mut document = Document::new("doc").with_field("type", "invoice");

    assert!(engine.stored_result(&document).is_none());

    let classified = engine
        .classify_and_annotate(&snapshot, 1, &mut document)
        .unwrap();
    let stored = engine.stored_result(&document).unwrap();

    assert_eq!(stored.matched_collection_ids(), vec![1]);
    assert_eq!(
        engine.metadata().decode_signature(&classified.signature),
        Some(stored)
    );
    // Reading the stored result leaves the document untouched
    assert!(document.metadata.contains(METADATA_FIELD));
}
