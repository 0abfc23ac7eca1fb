//! Common test utilities for SDK integration tests

use docpolicy_core::{ConditionKeyed, Document, InMemorySnapshot};
use docpolicy_sdk::{
    ConditionEngine, ConditionEngineBuilder, EngineConfig, MetadataConfig, TermMatcher,
};
use std::sync::Arc;

/// Environment shared by the integration tests.
///
/// | sequence | purpose |
/// |---|---|
/// | 1 | stop on match, entries listed out of order |
/// | 2 | child document exclusion |
/// | 3 | incomplete collections and the default collection |
/// | 4 | full condition evaluation |
/// | 5 | same as 4 with short-circuiting |
const ENVIRONMENT: &str = r#"
version: "{version}"
conditions:
  - id: 50
    name: draft document
    condition_type: string
    target: container
    field: status
    operator: is
    value: draft
collections:
  - id: 1
    name: invoices
    policy_ids: [10]
    condition:
      id: 101
      condition_type: string
      field: type
      operator: is
      value: invoice
  - id: 2
    name: typed
    policy_ids: [20]
    condition:
      id: 102
      condition_type: exists
      field: type
  - id: 3
    name: labelled
    policy_ids: [30]
    condition:
      id: 103
      condition_type: exists
      field: label
      include_descendants: true
  - id: 4
    name: draft packages
    policy_ids: [40]
    condition:
      id: 104
      condition_type: string
      target: container
      field: status
      operator: is
      value: draft
  - id: 5
    name: social security numbers
    policy_ids: [50]
    condition:
      id: 105
      condition_type: regex
      target: container
      field: body
      value: '\d{3}-\d{2}-\d{4}'
  - id: 6
    name: receipts
    policy_ids: [60]
    condition:
      id: 106
      condition_type: string
      target: container
      field: type
      operator: is
      value: receipt
  - id: 7
    name: typed or flagged
    policy_ids: [70]
    condition:
      id: 20
      condition_type: boolean
      target: container
      operator: or
      children:
        - id: 21
          condition_type: exists
          target: container
          field: type
        - id: 22
          condition_type: exists
          target: container
          field: flagged
  - id: 9
    name: unclassified
    policy_ids: [90]
collection_sequences:
  - id: 1
    name: stop on match
    entries:
      - order: 2
        collection_ids: [2]
      - order: 1
        collection_ids: [1]
        stop_on_match: true
  - id: 2
    name: exclusion
    excluded_document_condition_ids: [50]
    entries:
      - order: 1
        collection_ids: [3, 4]
  - id: 3
    name: incomplete
    default_collection_id: 9
    entries:
      - order: 1
        collection_ids: [5, 6]
  - id: 4
    name: full evaluation
    full_condition_evaluation: true
    entries:
      - order: 1
        collection_ids: [7]
  - id: 5
    name: short circuit
    entries:
      - order: 1
        collection_ids: [7]
"#;

/// The shared environment at the given version
pub fn environment(version: &str) -> InMemorySnapshot {
    InMemorySnapshot::from_yaml(&ENVIRONMENT.replace("{version}", version)).unwrap()
}

/// The shared environment with invoices redefined as receipts
pub fn changed_environment(version: &str) -> InMemorySnapshot {
    let yaml = ENVIRONMENT
        .replace("{version}", version)
        .replace("value: invoice", "value: receipt");
    InMemorySnapshot::from_yaml(&yaml).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig::new().with_metadata(MetadataConfig::new("integration", "docpolicy", 1000))
}

pub fn engine() -> ConditionEngine {
    ConditionEngineBuilder::new().with_config(config()).build().unwrap()
}

/// An engine sharing the metadata keys of [`engine`] with another term matcher
pub fn engine_with(term_matcher: Arc<dyn TermMatcher>) -> ConditionEngine {
    ConditionEngineBuilder::new()
        .with_config(config())
        .with_term_matcher(term_matcher)
        .build()
        .unwrap()
}

pub fn invoice() -> Document {
    Document::new("invoice-1")
        .with_field("type", "Invoice")
        .with_field("amount", "1200")
}

/// Sorted condition ids of a result set
pub fn ids<T: ConditionKeyed>(records: &[T]) -> Vec<i64> {
    let mut ids: Vec<i64> = records.iter().filter_map(|r| r.key().id).collect();
    ids.sort_unstable();
    ids
}
