//! Integration tests for collection sequences and evaluation metadata

mod common;

use common::{changed_environment, engine, engine_with, environment, ids, invoice};
use docpolicy_core::{Document, InMemorySnapshot, UnevaluatedReason};
use docpolicy_sdk::{UnavailableTermMatcher, METADATA_FIELD, METADATA_MARKER_FIELD};
use std::sync::Arc;

// ============================================================================
// Collection sequences
// ============================================================================

#[test]
fn test_stop_on_match_ends_the_walk() {
    let snapshot = environment("v1");
    let engine = engine();

    let result = engine.evaluate(&snapshot, 1, &invoice()).unwrap();
    assert_eq!(result.matched_collection_ids(), vec![1]);
    assert_eq!(ids(&result.matched_conditions), vec![101]);

    // No match in the stopping entry: the walk continues
    let contract = Document::new("contract-1").with_field("type", "contract");
    let result = engine.evaluate(&snapshot, 1, &contract).unwrap();
    assert_eq!(result.matched_collection_ids(), vec![2]);
    assert_eq!(ids(&result.unmatched_conditions), vec![101]);
}

#[test]
fn test_excluded_children_are_ignored() {
    let snapshot = environment("v1");
    let package = Document::new("package")
        .with_field("status", "draft")
        .with_child(
            Document::new("package/a")
                .with_field("status", "draft")
                .with_child(
                    Document::new("package/a/1")
                        .with_field("status", "final")
                        .with_field("label", "secret"),
                ),
        )
        .with_child(Document::new("package/b").with_field("status", "final"));

    let result = engine().evaluate(&snapshot, 2, &package).unwrap();

    // The root is never excluded, the labelled grandchild is
    assert_eq!(result.matched_collection_ids(), vec![4]);
    assert!(result.unmatched_conditions.iter().all(|u| u.reference != "package/a/1"));
}

#[test]
fn test_incomplete_and_default_collections() {
    let snapshot = environment("v1");
    let engine = engine();

    let result = engine.classify(&snapshot, 3, &invoice()).unwrap();

    assert!(result.matched_collections.is_empty());
    assert_eq!(result.incomplete_collections, vec![5]);
    assert_eq!(result.default_collection_id, Some(9));
    assert_eq!(result.resolved_policies, vec![90]);
    assert_eq!(ids(&result.unevaluated_conditions), vec![105]);
    assert_eq!(
        result.unevaluated_conditions[0].reason,
        UnevaluatedReason::MissingField
    );

    let with_body = invoice().with_stream("body", "SSN 123-45-6789");
    let result = engine.classify(&snapshot, 3, &with_body).unwrap();
    assert_eq!(result.resolved_policies, vec![50]);
    assert!(result.incomplete_collections.is_empty());
    assert!(result.default_collection_id.is_none());
}

#[test]
fn test_full_condition_evaluation_checks_every_child() {
    let snapshot = environment("v1");
    let engine = engine();

    let short = engine.evaluate(&snapshot, 5, &invoice()).unwrap();
    assert_eq!(short.matched_collection_ids(), vec![7]);
    assert!(short.unmatched_conditions.is_empty());

    let full = engine.evaluate(&snapshot, 4, &invoice()).unwrap();
    assert_eq!(full.matched_collection_ids(), vec![7]);
    assert_eq!(ids(&full.unmatched_conditions), vec![22]);
    assert_eq!(ids(&full.matched_conditions), vec![20, 21]);
}

// ============================================================================
// Evaluation metadata
// ============================================================================

#[test]
fn test_unchanged_document_reuses_stored_result() {
    let engine = engine();
    let mut document = invoice();
    engine
        .classify_and_annotate(&environment("v1"), 1, &mut document)
        .unwrap();

    // Same version: the stored result wins even though invoices changed
    let reused = engine
        .evaluate(&changed_environment("v1"), 1, &document)
        .unwrap();
    assert_eq!(reused.matched_collection_ids(), vec![1]);

    // New version: evaluated again
    let fresh = engine
        .evaluate(&changed_environment("v2"), 1, &document)
        .unwrap();
    assert_eq!(fresh.matched_collection_ids(), vec![2]);
    assert_eq!(fresh.snapshot_version.as_deref(), Some("v2"));
}

#[test]
fn test_changed_document_is_evaluated_again() {
    let engine = engine();
    let mut document = invoice();
    engine
        .classify_and_annotate(&environment("v1"), 1, &mut document)
        .unwrap();

    document.metadata.add("amount", "1300");
    let result = engine
        .evaluate(&changed_environment("v1"), 1, &document)
        .unwrap();
    assert_eq!(result.matched_collection_ids(), vec![2]);
}

#[test]
fn test_other_sequence_is_evaluated_again() -> anyhow::Result<()> {
    let engine = engine();
    let mut document = invoice();
    engine.classify_and_annotate(&environment("v1"), 1, &mut document)?;

    let result = engine.evaluate(&environment("v1"), 5, &document)?;
    assert_eq!(result.collection_sequence_id, Some(5));
    assert_eq!(result.matched_collection_ids(), vec![7]);
    Ok(())
}

#[test]
fn test_tampered_metadata_is_ignored() {
    let engine = engine();
    let mut document = invoice();
    engine
        .classify_and_annotate(&environment("v1"), 1, &mut document)
        .unwrap();

    document.metadata.remove(METADATA_MARKER_FIELD);
    document
        .metadata
        .add(METADATA_MARKER_FIELD, "00000000000000000000000000000000");

    let result = engine
        .evaluate(&changed_environment("v1"), 1, &document)
        .unwrap();
    assert_eq!(result.matched_collection_ids(), vec![2]);
}

#[test]
fn test_unversioned_snapshot_never_reuses() {
    let unversioned = |field: &str| {
        InMemorySnapshot::from_yaml(&format!(
            r#"
collections:
  - id: 1
    condition:
      condition_type: exists
      field: {}
collection_sequences:
  - id: 1
    entries:
      - collection_ids: [1]
"#,
            field
        ))
        .unwrap()
    };
    let engine = engine();

    let mut document = invoice();
    engine
        .classify_and_annotate(&unversioned("type"), 1, &mut document)
        .unwrap();
    assert!(document.metadata.contains(METADATA_FIELD));

    let result = engine.evaluate(&unversioned("missing"), 1, &document).unwrap();
    assert!(result.matched_collections.is_empty());
}

#[test]
fn test_incomplete_stored_result_is_evaluated_again() {
    let snapshot = InMemorySnapshot::from_yaml(
        r#"
version: "v1"
collections:
  - id: 1
    policy_ids: [10]
    condition:
      id: 1
      condition_type: text
      field: body
      value: confidential
collection_sequences:
  - id: 1
    entries:
      - collection_ids: [1]
"#,
    )
    .unwrap();
    let mut document = invoice().with_stream("body", "Strictly confidential");

    let first = engine_with(Arc::new(UnavailableTermMatcher))
        .classify_and_annotate(&snapshot, 1, &mut document)
        .unwrap();
    assert_eq!(first.incomplete_collections, vec![1]);
    assert_eq!(
        first.unevaluated_conditions[0].reason,
        UnevaluatedReason::MissingService
    );

    // Same version and content, but the service is back
    let second = engine().classify(&snapshot, 1, &document).unwrap();
    assert_eq!(second.matched_collections[0].id, 1);
    assert!(second.incomplete_collections.is_empty());
    assert_eq!(second.resolved_policies, vec![10]);
}

#[test]
fn test_signature_round_trips() -> anyhow::Result<()> {
    let engine = engine();
    let classified = engine.classify(&environment("v1"), 1, &invoice())?;

    let decoded = engine
        .metadata()
        .decode_signature(&classified.signature)
        .ok_or_else(|| anyhow::anyhow!("signature did not validate"))?;
    assert_eq!(decoded.reference, "invoice-1");
    assert_eq!(decoded.matched_collection_ids(), vec![1]);
    Ok(())
}
