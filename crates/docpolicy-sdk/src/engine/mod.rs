//! ConditionEngine - Main API for classifying documents
//!
//! # Architecture
//!
//! The module is organized into:
//! - `condition_engine`: the `ConditionEngine` entry points and the skip-if-unchanged check
//! - `sequence`: document exclusion and the walk over a collection sequence
//! - `tests`: Unit tests (test-only)

mod condition_engine;
mod sequence;

pub use condition_engine::ConditionEngine;

#[cfg(test)]
mod tests;
