//! docpolicy Condition Engine SDK
//!
//! High-level API for classifying documents into collections and for the
//! signed evaluation metadata that lets unchanged documents skip
//! re-evaluation.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;

// Re-export main types
pub use builder::ConditionEngineBuilder;
pub use config::{EngineConfig, MetadataConfig, RegexConfig};
pub use engine::ConditionEngine;
pub use error::{Result, SdkError};
pub use metadata::{ConditionEngineMetadata, METADATA_FIELD, METADATA_MARKER_FIELD};

// Re-export commonly used types from dependencies
pub use docpolicy_core::{
    ClassifyDocumentResult, ConditionEngineResult, Document, EnvironmentSnapshot, InMemorySnapshot,
};
pub use docpolicy_runtime::{KeywordTermMatcher, TermMatcher, UnavailableTermMatcher};
