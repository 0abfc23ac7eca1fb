//! Integration tests for boolean, not and fragment conditions

mod common;

use common::{evaluate_root, evaluate_tree, ids, services, services_with, CountingTermMatcher};
use docpolicy_core::condition::{ConditionTarget, NumberOperator, StringOperator};
use docpolicy_core::{
    Condition, ConditionType, Document, DocumentTree, InMemorySnapshot, UnevaluatedReason,
};
use docpolicy_runtime::RuntimeError;
use std::sync::Arc;

fn invoice() -> Document {
    Document::new("doc")
        .with_field("doc_type", "Invoice")
        .with_field("amount", "1200")
        .with_stream("body", "Payment due in 30 days")
}

// ============================================================================
// Boolean
// ============================================================================

#[test]
fn test_and_reports_union_of_child_matches() {
    let snapshot = InMemorySnapshot::new();
    let services = services();
    let condition = Condition::and(vec![
        Condition::exists("doc_type").with_id(1),
        Condition::string("doc_type", StringOperator::Is, "invoice").with_id(2),
    ])
    .with_id(3);

    let result = evaluate_root(&snapshot, &services, invoice(), &condition).unwrap();

    assert!(result.is_match);
    // The boolean node itself is reportable but not a raw match
    assert_eq!(ids(&result.all_condition_matches), vec![1, 2]);
    assert_eq!(ids(&result.matched_conditions), vec![1, 2, 3]);
    assert!(result.unmatched_conditions.is_empty());
}

#[test]
fn test_and_with_failing_child_reports_no_matches() {
    let snapshot = InMemorySnapshot::new();
    let services = services();
    let condition = Condition::and(vec![
        Condition::exists("doc_type").with_id(1),
        Condition::exists("missing").with_id(2),
    ])
    .with_id(3);

    let result = evaluate_root(&snapshot, &services, invoice(), &condition).unwrap();

    assert!(!result.is_match);
    assert!(result.matched_conditions.is_empty());
    assert_eq!(ids(&result.all_condition_matches), vec![1]);
    assert_eq!(ids(&result.unmatched_conditions), vec![2, 3]);
}

#[test]
fn test_and_short_circuits_unless_full_evaluation() {
    let snapshot = InMemorySnapshot::new();
    let matcher = Arc::new(CountingTermMatcher::default());
    let services = services_with(matcher.clone());
    let condition = Condition::and(vec![
        Condition::text("body", "refund").with_id(1),
        Condition::text("body", "payment").with_id(2),
        Condition::text("body", "days").with_id(3),
    ])
    .with_id(4);

    let tree = DocumentTree::from_document(invoice());
    let result = evaluate_tree(&snapshot, &services, tree, &condition, false).unwrap();
    assert!(!result.is_match);
    assert_eq!(matcher.calls(), 1);
    assert_eq!(ids(&result.unmatched_conditions), vec![1, 4]);

    let tree = DocumentTree::from_document(invoice());
    let result = evaluate_tree(&snapshot, &services, tree, &condition, true).unwrap();
    assert!(!result.is_match);
    assert_eq!(matcher.calls(), 4);
    assert_eq!(ids(&result.all_condition_matches), vec![2, 3]);
}

#[test]
fn test_or_short_circuits_on_first_match() {
    let snapshot = InMemorySnapshot::new();
    let matcher = Arc::new(CountingTermMatcher::default());
    let services = services_with(matcher.clone());
    let condition = Condition::or(vec![
        Condition::text("body", "payment").with_id(1),
        Condition::text("body", "refund").with_id(2),
    ])
    .with_id(3);

    let result = evaluate_root(&snapshot, &services, invoice(), &condition).unwrap();

    assert!(result.is_match);
    assert_eq!(matcher.calls(), 1);
    assert_eq!(ids(&result.matched_conditions), vec![1, 3]);
    assert_eq!(result.matched_conditions[1].terms, vec!["payment"]);
}

#[test]
fn test_or_reports_only_matching_children() {
    let snapshot = InMemorySnapshot::new();
    let services = services();
    let condition = Condition::or(vec![
        Condition::exists("missing").with_id(1),
        Condition::exists("amount").with_id(2),
    ])
    .with_id(3);

    let result = evaluate_root(&snapshot, &services, invoice(), &condition).unwrap();

    assert!(result.is_match);
    assert_eq!(ids(&result.matched_conditions), vec![2, 3]);
    assert_eq!(ids(&result.unmatched_conditions), vec![1]);
}

#[test]
fn test_unevaluated_child_keeps_boolean_out_of_unmatched() {
    let snapshot = InMemorySnapshot::new();
    let services = services();
    let condition = Condition::and(vec![Condition::regex("missing", "x+").with_id(1)]).with_id(2);

    let result = evaluate_root(&snapshot, &services, invoice(), &condition).unwrap();

    assert!(!result.is_match);
    assert_eq!(ids(&result.unevaluated_conditions), vec![1]);
    assert!(result.unmatched_conditions.is_empty());
}

#[test]
fn test_empty_boolean_never_matches() {
    let snapshot = InMemorySnapshot::new();
    let services = services();

    for condition in [Condition::and(Vec::new()), Condition::or(Vec::new())] {
        let result = evaluate_root(&snapshot, &services, invoice(), &condition.with_id(1)).unwrap();
        assert!(!result.is_match);
        assert_eq!(ids(&result.unmatched_conditions), vec![1]);
    }
}

// ============================================================================
// Not
// ============================================================================

#[test]
fn test_not_negates_child() {
    let snapshot = InMemorySnapshot::new()
        .with_condition(Condition::exists("doc_type").with_id(10))
        .with_condition(Condition::exists("missing").with_id(11));
    let services = services();

    let negated_match = Condition::not(10).with_id(20);
    let result = evaluate_root(&snapshot, &services, invoice(), &negated_match).unwrap();
    assert!(!result.is_match);
    assert!(result.matched_conditions.is_empty());
    assert!(result.all_condition_matches.is_empty());
    assert_eq!(ids(&result.unmatched_conditions), vec![20]);

    let negated_miss = Condition::not(11).with_id(21);
    let result = evaluate_root(&snapshot, &services, invoice(), &negated_miss).unwrap();
    assert!(result.is_match);
    assert_eq!(ids(&result.matched_conditions), vec![21]);
    assert_eq!(ids(&result.all_condition_matches), vec![21]);
    // The child's own unmatched entry passes through
    assert_eq!(ids(&result.unmatched_conditions), vec![11]);
}

#[test]
fn test_not_passes_unevaluated_through() {
    let snapshot =
        InMemorySnapshot::new().with_condition(Condition::regex("missing", "x+").with_id(10));
    let services = services();

    let result = evaluate_root(&snapshot, &services, invoice(), &Condition::not(10).with_id(20))
        .unwrap();

    assert!(result.is_match);
    assert_eq!(ids(&result.unevaluated_conditions), vec![10]);
    assert_eq!(
        result.unevaluated_conditions[0].reason,
        UnevaluatedReason::MissingField
    );
    assert!(result.matched_conditions.is_empty());
}

#[test]
fn test_not_of_unknown_condition_fails() {
    let snapshot = InMemorySnapshot::new();
    let services = services();

    let err = evaluate_root(&snapshot, &services, invoice(), &Condition::not(404)).unwrap_err();
    assert!(matches!(err, RuntimeError::ConditionNotFound(404)));
}

// ============================================================================
// Fragments
// ============================================================================

#[test]
fn test_fragment_is_transparent() {
    let snapshot = InMemorySnapshot::new().with_condition(
        Condition::number("amount", NumberOperator::Gt, 1000.0)
            .with_id(10)
            .as_fragment(),
    );
    let services = services();

    let result =
        evaluate_root(&snapshot, &services, invoice(), &Condition::fragment(10).with_id(20))
            .unwrap();

    assert!(result.is_match);
    assert_eq!(ids(&result.matched_conditions), vec![10]);
    assert!(result
        .all_condition_matches
        .iter()
        .all(|m| m.condition_type == ConditionType::Number));
}

#[test]
fn test_fragment_cycle_is_an_error() {
    let snapshot = InMemorySnapshot::new()
        .with_condition(Condition::fragment(2).with_id(1))
        .with_condition(Condition::fragment(1).with_id(2));
    let services = services();

    let err = evaluate_root(&snapshot, &services, invoice(), &Condition::fragment(1)).unwrap_err();
    match err {
        RuntimeError::CyclicReference { id, path } => {
            assert_eq!(id, 1);
            assert_eq!(path, vec![1, 2, 1]);
        }
        other => panic!("Expected cyclic reference, got {:?}", other),
    }
}

#[test]
fn test_shared_fragment_is_not_a_cycle() {
    let snapshot = InMemorySnapshot::new()
        .with_condition(Condition::exists("amount").with_id(10).as_fragment())
        .with_condition(Condition::exists("missing").with_id(99));
    let services = services();
    let condition = Condition::and(vec![
        Condition::fragment(10).with_target(ConditionTarget::Container),
        Condition::not(99).with_target(ConditionTarget::Container),
        Condition::fragment(10).with_target(ConditionTarget::Container),
    ]);

    let result = evaluate_root(&snapshot, &services, invoice(), &condition).unwrap();
    assert!(result.is_match);
}
