//! Built-in keyword term matcher
//!
//! Query syntax:
//! - `alpha beta` / `alpha AND beta`: both terms must occur
//! - `alpha OR beta`: either group may match
//! - `"alpha beta"`: consecutive words
//! - `alph*`: word prefix
//!
//! Matching is case-insensitive and on word boundaries. All values of a field
//! are searched as one body of text.

use super::{ServiceResponse, TermMatchRequest, TermMatchResult, TermMatcher, TermQuery};
use crate::pattern::RegexCache;
use docpolicy_core::environment::{ExpressionType, Lexicon};

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryTerm {
    Word(String),
    Prefix(String),
    Phrase(Vec<String>),
}

/// A query in disjunctive form: any group matches when all of its terms do
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeywordQuery {
    groups: Vec<Vec<QueryTerm>>,
}

impl KeywordQuery {
    fn parse(query: &str) -> Self {
        let mut groups = vec![Vec::new()];
        for (raw, quoted) in split_query(query) {
            if !quoted && raw == "OR" {
                groups.push(Vec::new());
                continue;
            }
            if !quoted && raw == "AND" {
                continue;
            }

            let term = if !quoted && raw.len() > 1 && raw.ends_with('*') {
                let stem = raw.trim_end_matches('*').to_lowercase();
                (!stem.is_empty()).then_some(QueryTerm::Prefix(stem))
            } else {
                let words: Vec<String> = tokenize(&raw).into_iter().map(|t| t.lower).collect();
                match words.len() {
                    0 => None,
                    1 => words.into_iter().next().map(QueryTerm::Word),
                    _ => Some(QueryTerm::Phrase(words)),
                }
            };

            if let (Some(term), Some(group)) = (term, groups.last_mut()) {
                group.push(term);
            }
        }
        groups.retain(|group| !group.is_empty());
        Self { groups }
    }

    /// Terms of every matching group, or `None` when no group matches
    fn find(&self, texts: &[&str]) -> Option<Vec<String>> {
        let tokenized: Vec<(&str, Vec<Token>)> =
            texts.iter().map(|text| (*text, tokenize(text))).collect();

        let mut matched = false;
        let mut terms = Vec::new();
        for group in &self.groups {
            let mut group_terms = Vec::new();
            let all_found = group.iter().all(|term| {
                let found = find_term(term, &tokenized);
                let hit = !found.is_empty();
                group_terms.extend(found);
                hit
            });
            if all_found {
                matched = true;
                for term in group_terms {
                    if !terms.contains(&term) {
                        terms.push(term);
                    }
                }
            }
        }
        matched.then_some(terms)
    }
}

/// Split on whitespace, keeping quoted sections together
fn split_query(query: &str) -> Vec<(String, bool)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in query.chars() {
        match ch {
            '"' => {
                if in_quotes || !current.is_empty() {
                    parts.push((std::mem::take(&mut current), in_quotes));
                }
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    parts.push((std::mem::take(&mut current), false));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push((current, in_quotes));
    }
    parts.retain(|(part, _)| !part.trim().is_empty());
    parts
}

#[derive(Debug, Clone)]
struct Token {
    start: usize,
    end: usize,
    lower: String,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (index, ch) in text.char_indices() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        match (is_word, start) {
            (true, None) => start = Some(index),
            (false, Some(s)) => {
                tokens.push(Token {
                    start: s,
                    end: index,
                    lower: text[s..index].to_lowercase(),
                });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            start: s,
            end: text.len(),
            lower: text[s..].to_lowercase(),
        });
    }
    tokens
}

fn find_term(term: &QueryTerm, tokenized: &[(&str, Vec<Token>)]) -> Vec<String> {
    let mut found = Vec::new();
    for (text, tokens) in tokenized {
        match term {
            QueryTerm::Word(word) => found.extend(
                tokens
                    .iter()
                    .filter(|t| &t.lower == word)
                    .map(|t| text[t.start..t.end].to_string()),
            ),
            QueryTerm::Prefix(stem) => found.extend(
                tokens
                    .iter()
                    .filter(|t| t.lower.starts_with(stem.as_str()))
                    .map(|t| text[t.start..t.end].to_string()),
            ),
            QueryTerm::Phrase(words) => {
                for window in tokens.windows(words.len()) {
                    if window.iter().zip(words).all(|(t, w)| &t.lower == w) {
                        let start = window[0].start;
                        let end = window[window.len() - 1].end;
                        found.push(text[start..end].to_string());
                    }
                }
            }
        }
    }
    found
}

/// In-process [`TermMatcher`] for text queries and lexicons
#[derive(Debug, Default)]
pub struct KeywordTermMatcher {
    regex_cache: RegexCache,
}

impl KeywordTermMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific cache for regex lexicon expressions
    pub fn with_regex_cache(mut self, regex_cache: RegexCache) -> Self {
        self.regex_cache = regex_cache;
        self
    }

    fn match_text(&self, query: &str, values: &[&str]) -> TermMatchResult {
        match KeywordQuery::parse(query).find(values) {
            Some(terms) => TermMatchResult {
                is_match: true,
                terms,
                expression_ids: Vec::new(),
            },
            None => TermMatchResult::default(),
        }
    }

    /// Match a regex lexicon expression on the calling thread.
    ///
    /// A term matcher answers with matches or unavailability, never an error,
    /// so an invalid expression is skipped and the rest of the lexicon still
    /// counts. Regex conditions are the ones that fail the pass and run on the
    /// timed worker pool.
    fn match_regex(&self, expression: &str, values: &[&str]) -> Option<Vec<String>> {
        let regex = match self.regex_cache.get_or_compile(&format!("(?i){}", expression)) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!("Skipping lexicon expression: {}", e);
                return None;
            }
        };
        let mut matched = false;
        let mut terms = Vec::new();
        for value in values {
            for m in regex.find_iter(value) {
                matched = true;
                if !m.as_str().is_empty() {
                    terms.push(m.as_str().to_string());
                }
            }
        }
        matched.then_some(terms)
    }

    fn match_lexicon(&self, lexicon: &Lexicon, values: &[&str]) -> TermMatchResult {
        let mut result = TermMatchResult::default();
        for expression in &lexicon.expressions {
            let found = match expression.expression_type {
                ExpressionType::Text => KeywordQuery::parse(&expression.expression).find(values),
                ExpressionType::Regex => self.match_regex(&expression.expression, values),
            };
            let Some(terms) = found else { continue };

            result.is_match = true;
            if let Some(id) = expression.id {
                if !result.expression_ids.contains(&id) {
                    result.expression_ids.push(id);
                }
            }
            for term in terms {
                if !result.terms.contains(&term) {
                    result.terms.push(term);
                }
            }
        }
        result
    }
}

impl TermMatcher for KeywordTermMatcher {
    fn match_terms(&self, request: &TermMatchRequest<'_>) -> ServiceResponse<TermMatchResult> {
        let result = match request.query {
            TermQuery::Text(query) => self.match_text(query, &request.values),
            TermQuery::Lexicon(lexicon) => self.match_lexicon(lexicon, &request.values),
        };
        ServiceResponse::Available(result)
    }
}
