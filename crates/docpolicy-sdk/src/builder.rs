//! Builder pattern for ConditionEngine

use crate::config::EngineConfig;
use crate::engine::ConditionEngine;
use crate::error::Result;
use crate::metadata::ConditionEngineMetadata;
use docpolicy_runtime::{EvaluationServices, KeywordTermMatcher, RegexCache, TermMatcher};
use std::sync::Arc;
use std::time::Duration;

/// Builder for ConditionEngine
///
/// # Example
///
/// ```rust,ignore
/// use docpolicy_sdk::{ConditionEngineBuilder, EngineConfig};
///
/// let engine = ConditionEngineBuilder::new()
///     .with_config(EngineConfig::load()?)
///     .build()?;
/// ```
pub struct ConditionEngineBuilder {
    config: EngineConfig,
    term_matcher: Option<Arc<dyn TermMatcher>>,
}

impl ConditionEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            term_matcher: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the service used by text and lexicon conditions.
    ///
    /// Defaults to a [`KeywordTermMatcher`].
    pub fn with_term_matcher(mut self, term_matcher: Arc<dyn TermMatcher>) -> Self {
        self.term_matcher = Some(term_matcher);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<ConditionEngine> {
        let regex = &self.config.regex;
        let term_matcher = self.term_matcher.unwrap_or_else(|| {
            Arc::new(KeywordTermMatcher::new().with_regex_cache(RegexCache::new(
                regex.cache_max_entries,
                Duration::from_secs(regex.cache_expiry_secs),
            )))
        });

        let services = EvaluationServices::new(regex.match_settings(), term_matcher)?;
        let metadata = ConditionEngineMetadata::new(&self.config.metadata)?;

        tracing::debug!(
            "Built condition engine with {} match workers",
            regex.worker_threads
        );
        Ok(ConditionEngine::new(services, metadata))
    }
}

impl Default for ConditionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
