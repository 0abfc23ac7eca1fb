//! Environment snapshot
//!
//! The read-only view of all configuration used during one evaluation pass:
//! conditions, lexicons, collections, collection sequences and field labels.
//! Snapshots are loaded once per pass by the caller and never mutated by
//! evaluators, so one snapshot can serve concurrent passes.

mod memory;
mod types;

pub use memory::InMemorySnapshot;
pub use types::{
    CollectionSequence, CollectionSequenceEntry, DocumentCollection, ExpressionType, FieldLabel,
    Lexicon, LexiconExpression,
};

use crate::condition::Condition;
use crate::{CollectionId, CollectionSequenceId, ConditionId, LexiconId};

/// Read access to configuration objects by id
pub trait EnvironmentSnapshot: Send + Sync {
    /// Version tag of the configuration, if the source tracks one
    fn version(&self) -> Option<&str>;

    fn condition(&self, id: ConditionId) -> Option<&Condition>;

    fn lexicon(&self, id: LexiconId) -> Option<&Lexicon>;

    fn collection(&self, id: CollectionId) -> Option<&DocumentCollection>;

    fn collection_sequence(&self, id: CollectionSequenceId) -> Option<&CollectionSequence>;

    /// Field label by name, case-insensitively
    fn field_label(&self, name: &str) -> Option<&FieldLabel>;

    fn conditions(&self) -> Vec<&Condition>;

    fn collections(&self) -> Vec<&DocumentCollection>;
}
