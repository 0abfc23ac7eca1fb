//! Compiled pattern cache

use crate::error::{Result, RuntimeError};
use dashmap::DashMap;
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cached compiled pattern
#[derive(Debug, Clone)]
struct CachedRegex {
    regex: Arc<Regex>,
    cached_at: Instant,
}

impl CachedRegex {
    fn new(regex: Regex) -> Self {
        Self {
            regex: Arc::new(regex),
            cached_at: Instant::now(),
        }
    }

    fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Thread-safe cache of compiled patterns keyed by pattern text.
///
/// Entries expire after `ttl`. When the cache is full, expired entries are
/// dropped first, then the oldest entry.
#[derive(Debug)]
pub struct RegexCache {
    entries: DashMap<String, CachedRegex>,
    max_entries: usize,
    ttl: Duration,
}

impl RegexCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    /// Get a compiled pattern, compiling and caching it on a miss
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Regex>> {
        let cached = self
            .entries
            .get(pattern)
            .filter(|entry| entry.is_valid(self.ttl))
            .map(|entry| Arc::clone(&entry.regex));
        if let Some(regex) = cached {
            return Ok(regex);
        }

        let regex = Regex::new(pattern).map_err(|e| RuntimeError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(pattern) {
            self.evict();
        }

        let entry = CachedRegex::new(regex);
        let regex = Arc::clone(&entry.regex);
        self.entries.insert(pattern.to_string(), entry);
        tracing::trace!("Cached regex pattern '{}'", pattern);
        Ok(regex)
    }

    fn evict(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.is_valid(ttl));
        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().cached_at)
            .map(|entry| entry.key().clone());
        if let Some(pattern) = oldest {
            self.entries.remove(&pattern);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(3600))
    }
}
