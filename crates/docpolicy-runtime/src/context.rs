//! Evaluation context and shared services
//!
//! [`EvaluationServices`] is built once and shared by every pass.
//! [`EvaluationContext`] lives for exactly one pass: it owns the document tree
//! (and so the per-document result caches) and tracks the references being
//! resolved.

use crate::error::{Result, RuntimeError};
use crate::pattern::{MatchWorkerPool, RegexCache};
use crate::service::TermMatcher;
use chrono::{DateTime, Utc};
use docpolicy_core::environment::{EnvironmentSnapshot, Lexicon};
use docpolicy_core::{Condition, ConditionId, DocumentTree, LexiconId};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Limits for regex matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    /// Deadline for one regex condition on one document
    pub regex_timeout: Duration,
    pub cache_max_entries: usize,
    pub cache_expiry: Duration,
    /// Upper bound of concurrently running match jobs
    pub worker_threads: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            regex_timeout: Duration::from_secs(5),
            cache_max_entries: 1000,
            cache_expiry: Duration::from_secs(3600),
            worker_threads: 4,
        }
    }
}

/// Matches of one pattern over a set of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatches {
    pub is_match: bool,
    /// Non-empty matched substrings, in order of appearance
    pub terms: Vec<String>,
}

/// Services shared across evaluation passes
pub struct EvaluationServices {
    regex_cache: RegexCache,
    worker_pool: MatchWorkerPool,
    regex_timeout: Duration,
    term_matcher: Arc<dyn TermMatcher>,
}

impl EvaluationServices {
    pub fn new(settings: MatchSettings, term_matcher: Arc<dyn TermMatcher>) -> Result<Self> {
        Ok(Self {
            regex_cache: RegexCache::new(settings.cache_max_entries, settings.cache_expiry),
            worker_pool: MatchWorkerPool::new(settings.worker_threads)?,
            regex_timeout: settings.regex_timeout,
            term_matcher,
        })
    }

    pub fn regex_cache(&self) -> &RegexCache {
        &self.regex_cache
    }

    pub fn worker_pool(&self) -> &MatchWorkerPool {
        &self.worker_pool
    }

    pub fn regex_timeout(&self) -> Duration {
        self.regex_timeout
    }

    pub fn term_matcher(&self) -> &dyn TermMatcher {
        self.term_matcher.as_ref()
    }

    /// Find every match of `pattern` in `values` on the worker pool, within
    /// the configured timeout
    pub fn find_matches(&self, pattern: &str, values: Vec<String>) -> Result<PatternMatches> {
        let regex = self.regex_cache.get_or_compile(pattern)?;

        self.worker_pool.run_with_timeout(self.regex_timeout, move |cancelled| {
            let mut matches = PatternMatches::default();
            for value in &values {
                for found in regex.find_iter(value) {
                    if cancelled.load(Ordering::Relaxed) {
                        return matches;
                    }
                    matches.is_match = true;
                    if !found.as_str().is_empty() {
                        matches.terms.push(found.as_str().to_string());
                    }
                }
            }
            matches
        })
    }
}

impl std::fmt::Debug for EvaluationServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationServices")
            .field("regex_cache_entries", &self.regex_cache.len())
            .field("worker_pool", &self.worker_pool)
            .field("regex_timeout", &self.regex_timeout)
            .finish()
    }
}

/// State of one evaluation pass
pub struct EvaluationContext<'a> {
    tree: DocumentTree,
    snapshot: &'a dyn EnvironmentSnapshot,
    services: &'a EvaluationServices,
    full_condition_evaluation: bool,
    now: DateTime<Utc>,
    resolving: Vec<ConditionId>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        tree: DocumentTree,
        snapshot: &'a dyn EnvironmentSnapshot,
        services: &'a EvaluationServices,
    ) -> Self {
        Self {
            tree,
            snapshot,
            services,
            full_condition_evaluation: false,
            now: Utc::now(),
            resolving: Vec::new(),
        }
    }

    /// Evaluate every boolean child instead of short-circuiting
    pub fn with_full_condition_evaluation(mut self, full: bool) -> Self {
        self.full_condition_evaluation = full;
        self
    }

    /// Reference time for relative date conditions
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> DocumentTree {
        self.tree
    }

    pub fn snapshot(&self) -> &'a dyn EnvironmentSnapshot {
        self.snapshot
    }

    pub fn services(&self) -> &'a EvaluationServices {
        self.services
    }

    pub fn full_condition_evaluation(&self) -> bool {
        self.full_condition_evaluation
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn resolve_condition(&self, id: ConditionId) -> Result<&'a Condition> {
        self.snapshot
            .condition(id)
            .ok_or(RuntimeError::ConditionNotFound(id))
    }

    pub fn resolve_lexicon(&self, id: LexiconId) -> Result<&'a Lexicon> {
        self.snapshot.lexicon(id).ok_or(RuntimeError::LexiconNotFound(id))
    }

    /// Mark a referenced condition as being resolved
    pub(crate) fn enter_reference(&mut self, id: ConditionId) -> Result<()> {
        if self.resolving.contains(&id) {
            let mut path = self.resolving.clone();
            path.push(id);
            return Err(RuntimeError::CyclicReference { id, path });
        }
        self.resolving.push(id);
        Ok(())
    }

    pub(crate) fn leave_reference(&mut self, id: ConditionId) {
        if let Some(position) = self.resolving.iter().rposition(|resolving| *resolving == id) {
            self.resolving.truncate(position);
        }
    }
}
