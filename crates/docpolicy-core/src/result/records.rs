//! Result records

use crate::condition::{Condition, ConditionKey, ConditionType};
use crate::{ConditionId, LexiconExpressionId};
use serde::{Deserialize, Serialize};

/// Why a condition could not be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnevaluatedReason {
    /// The field the condition checks is absent
    MissingField,
    /// A backing service needed for the check is unavailable
    MissingService,
}

/// Records that identify a condition evaluated on a document
pub trait ConditionKeyed {
    fn key(&self) -> ConditionKey;

    /// Reference of the document the record was produced on
    fn reference(&self) -> &str;
}

/// Find the first record with the given key
pub fn find_by_key<'a, T: ConditionKeyed>(records: &'a [T], key: &ConditionKey) -> Option<&'a T> {
    records.iter().find(|record| record.key() == *key)
}

pub fn contains_key<T: ConditionKeyed>(records: &[T], key: &ConditionKey) -> bool {
    find_by_key(records, key).is_some()
}

/// A condition that matched on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedCondition {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConditionId>,
    #[serde(default)]
    pub name: String,
    pub condition_type: ConditionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Literal text that satisfied the condition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,
    /// Lexicon expressions that matched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expression_ids: Vec<LexiconExpressionId>,
}

impl MatchedCondition {
    pub fn new(reference: impl Into<String>, condition: &Condition) -> Self {
        Self {
            reference: reference.into(),
            id: condition.id,
            name: condition.name.clone(),
            condition_type: condition.condition_type(),
            field: condition.field().map(str::to_string),
            terms: Vec::new(),
            expression_ids: Vec::new(),
        }
    }

    pub fn with_terms(mut self, terms: Vec<String>) -> Self {
        self.terms = terms;
        self
    }

    pub fn with_expression_ids(mut self, expression_ids: Vec<LexiconExpressionId>) -> Self {
        self.expression_ids = expression_ids;
        self
    }

    /// Add terms and expression ids not already present
    pub(crate) fn merge_terms(&mut self, other: &MatchedCondition) {
        for term in &other.terms {
            if !self.terms.contains(term) {
                self.terms.push(term.clone());
            }
        }
        for id in &other.expression_ids {
            if !self.expression_ids.contains(id) {
                self.expression_ids.push(*id);
            }
        }
    }
}

impl ConditionKeyed for MatchedCondition {
    fn key(&self) -> ConditionKey {
        ConditionKey {
            id: self.id,
            condition_type: self.condition_type,
        }
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// A condition that was fully evaluated on a document and did not hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedCondition {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConditionId>,
    #[serde(default)]
    pub name: String,
    pub condition_type: ConditionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl UnmatchedCondition {
    pub fn new(reference: impl Into<String>, condition: &Condition) -> Self {
        Self {
            reference: reference.into(),
            id: condition.id,
            name: condition.name.clone(),
            condition_type: condition.condition_type(),
            field: condition.field().map(str::to_string),
        }
    }
}

impl ConditionKeyed for UnmatchedCondition {
    fn key(&self) -> ConditionKey {
        ConditionKey {
            id: self.id,
            condition_type: self.condition_type,
        }
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// A condition that could not be evaluated on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnevaluatedCondition {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConditionId>,
    #[serde(default)]
    pub name: String,
    pub condition_type: ConditionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: UnevaluatedReason,
}

impl UnevaluatedCondition {
    pub fn new(reference: impl Into<String>, condition: &Condition, reason: UnevaluatedReason) -> Self {
        Self {
            reference: reference.into(),
            id: condition.id,
            name: condition.name.clone(),
            condition_type: condition.condition_type(),
            field: condition.field().map(str::to_string),
            reason,
        }
    }
}

impl ConditionKeyed for UnevaluatedCondition {
    fn key(&self) -> ConditionKey {
        ConditionKey {
            id: self.id,
            condition_type: self.condition_type,
        }
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_key() {
        let a = Condition::exists("a").with_id(1);
        let b = Condition::regex("b", "x+").with_id(2);
        let records = vec![
            MatchedCondition::new("doc", &a),
            MatchedCondition::new("doc", &b),
        ];

        let found = find_by_key(&records, &b.key()).unwrap();
        assert_eq!(found.field.as_deref(), Some("b"));

        // Same id, different type is a different key
        let other = ConditionKey {
            id: Some(2),
            condition_type: ConditionType::Exists,
        };
        assert!(!contains_key(&records, &other));
    }

    #[test]
    fn test_merge_terms() {
        let condition = Condition::text("body", "alpha OR beta").with_id(5);
        let mut first = MatchedCondition::new("doc", &condition)
            .with_terms(vec!["alpha".to_string()])
            .with_expression_ids(vec![1]);
        let second = MatchedCondition::new("doc/1", &condition)
            .with_terms(vec!["alpha".to_string(), "beta".to_string()])
            .with_expression_ids(vec![1, 2]);

        first.merge_terms(&second);
        assert_eq!(first.terms, vec!["alpha", "beta"]);
        assert_eq!(first.expression_ids, vec![1, 2]);
    }

    #[test]
    fn test_unevaluated_reason_serde() {
        let json = serde_json::to_string(&UnevaluatedReason::MissingService).unwrap();
        assert_eq!(json, r#""MISSING_SERVICE""#);
    }
}
