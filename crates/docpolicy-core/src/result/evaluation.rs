//! Condition evaluation result

use super::records::{ConditionKeyed, MatchedCondition, UnevaluatedCondition, UnmatchedCondition};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one condition against one document.
///
/// Results are built bottom-up: each evaluator returns its own result and the
/// caller folds child results in with [`absorb_audit`](Self::absorb_audit),
/// [`absorb_matches`](Self::absorb_matches) or [`merge`](Self::merge).
///
/// Deduplication: `matched_conditions` holds one record per condition key
/// (terms of later records are merged in); the other sets hold one record per
/// condition key and document reference. Conditions without an id are never
/// deduplicated, each evaluation of one adds its own record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEvaluationResult {
    pub is_match: bool,

    /// Matches that contributed to a reportable match
    #[serde(default)]
    pub matched_conditions: Vec<MatchedCondition>,

    /// Every condition and document pairing that matched
    #[serde(default)]
    pub all_condition_matches: Vec<MatchedCondition>,

    #[serde(default)]
    pub unevaluated_conditions: Vec<UnevaluatedCondition>,

    #[serde(default)]
    pub unmatched_conditions: Vec<UnmatchedCondition>,
}

impl ConditionEvaluationResult {
    /// A clean non-match with empty sets
    pub fn no_match() -> Self {
        Self::default()
    }

    /// A match recorded in both matched sets
    pub fn matched(matched: MatchedCondition) -> Self {
        let mut result = Self {
            is_match: true,
            ..Self::default()
        };
        result.add_all_condition_match(matched.clone());
        result.add_matched_condition(matched);
        result
    }

    pub fn unmatched(unmatched: UnmatchedCondition) -> Self {
        let mut result = Self::default();
        result.add_unmatched_condition(unmatched);
        result
    }

    pub fn unevaluated(unevaluated: UnevaluatedCondition) -> Self {
        let mut result = Self::default();
        result.add_unevaluated_condition(unevaluated);
        result
    }

    pub fn has_unevaluated(&self) -> bool {
        !self.unevaluated_conditions.is_empty()
    }

    pub fn add_matched_condition(&mut self, matched: MatchedCondition) {
        let key = matched.key();
        if key.id.is_none() {
            self.matched_conditions.push(matched);
            return;
        }
        match self
            .matched_conditions
            .iter_mut()
            .find(|existing| existing.key() == key)
        {
            Some(existing) => existing.merge_terms(&matched),
            None => self.matched_conditions.push(matched),
        }
    }

    pub fn add_all_condition_match(&mut self, matched: MatchedCondition) {
        push_unique(&mut self.all_condition_matches, matched);
    }

    pub fn add_unmatched_condition(&mut self, unmatched: UnmatchedCondition) {
        push_unique(&mut self.unmatched_conditions, unmatched);
    }

    pub fn add_unevaluated_condition(&mut self, unevaluated: UnevaluatedCondition) {
        push_unique(&mut self.unevaluated_conditions, unevaluated);
    }

    /// Fold in the audit sets of another result: all matches, unevaluated and
    /// unmatched conditions. The match flag and reportable matches are untouched.
    pub fn absorb_audit(&mut self, other: &ConditionEvaluationResult) {
        for matched in &other.all_condition_matches {
            self.add_all_condition_match(matched.clone());
        }
        for unevaluated in &other.unevaluated_conditions {
            self.add_unevaluated_condition(unevaluated.clone());
        }
        for unmatched in &other.unmatched_conditions {
            self.add_unmatched_condition(unmatched.clone());
        }
    }

    /// Fold in the reportable matches of another result
    pub fn absorb_matches(&mut self, other: &ConditionEvaluationResult) {
        for matched in &other.matched_conditions {
            self.add_matched_condition(matched.clone());
        }
    }

    /// Fold in everything, OR-ing the match flag
    pub fn merge(&mut self, other: &ConditionEvaluationResult) {
        self.is_match |= other.is_match;
        self.absorb_audit(other);
        self.absorb_matches(other);
    }
}

fn push_unique<T: ConditionKeyed>(records: &mut Vec<T>, record: T) {
    let key = record.key();
    let exists = key.id.is_some()
        && records
            .iter()
            .any(|existing| existing.key() == key && existing.reference() == record.reference());
    if !exists {
        records.push(record);
    }
}
