//! Condition types

use super::operator::{BooleanOperator, DateOperator, NumberOperator, StringOperator};
use crate::{ConditionId, LexiconId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which documents of a document hierarchy a condition is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTarget {
    /// Only the document itself
    Container,
    /// Only the children (or all descendants) of the document
    Children,
    /// The document and its children (or all descendants)
    #[default]
    All,
}

/// Discriminator of a condition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    Number,
    String,
    Date,
    Regex,
    Text,
    Lexicon,
    Exists,
    Boolean,
    Not,
    Fragment,
}

impl ConditionType {
    /// Returns true for conditions that combine or reference other conditions
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            ConditionType::Boolean | ConditionType::Not | ConditionType::Fragment
        )
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionType::Number => "number",
            ConditionType::String => "string",
            ConditionType::Date => "date",
            ConditionType::Regex => "regex",
            ConditionType::Text => "text",
            ConditionType::Lexicon => "lexicon",
            ConditionType::Exists => "exists",
            ConditionType::Boolean => "boolean",
            ConditionType::Not => "not",
            ConditionType::Fragment => "fragment",
        };
        f.write_str(name)
    }
}

/// Identity of a condition inside result sets.
///
/// Result records are compared by key rather than structurally, since the same
/// condition can match independently on several documents of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionKey {
    pub id: Option<ConditionId>,
    pub condition_type: ConditionType,
}

/// A configured condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Identifier (absent for unsaved inline conditions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConditionId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub target: ConditionTarget,

    /// Recurse into every descendant level instead of immediate children only
    #[serde(default)]
    pub include_descendants: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,

    /// Standalone reusable definition rather than an inline condition
    #[serde(default)]
    pub is_fragment: bool,

    /// Kind-specific data, tagged by `condition_type`
    #[serde(flatten)]
    pub kind: ConditionKind,
}

/// Kind-specific condition data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition_type", rename_all = "snake_case")]
pub enum ConditionKind {
    Number(NumberCondition),
    String(StringCondition),
    Date(DateCondition),
    Regex(RegexCondition),
    Text(TextCondition),
    Lexicon(LexiconCondition),
    Exists(ExistsCondition),
    Boolean(BooleanCondition),
    Not(NotCondition),
    Fragment(FragmentCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberCondition {
    pub field: String,
    pub operator: NumberOperator,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringCondition {
    pub field: String,
    pub operator: StringOperator,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCondition {
    pub field: String,
    pub operator: DateOperator,
    /// Absolute timestamp, period, time of day or weekday
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexCondition {
    pub field: String,
    /// Pattern text
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCondition {
    pub field: String,
    /// Boolean term query
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconCondition {
    pub field: String,
    /// Lexicon id
    pub value: LexiconId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistsCondition {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanCondition {
    pub operator: BooleanOperator,
    #[serde(default)]
    pub children: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotCondition {
    /// Id of the negated condition
    pub condition: ConditionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentCondition {
    /// Id of the referenced condition
    pub value: ConditionId,
}

impl ConditionKind {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            ConditionKind::Number(_) => ConditionType::Number,
            ConditionKind::String(_) => ConditionType::String,
            ConditionKind::Date(_) => ConditionType::Date,
            ConditionKind::Regex(_) => ConditionType::Regex,
            ConditionKind::Text(_) => ConditionType::Text,
            ConditionKind::Lexicon(_) => ConditionType::Lexicon,
            ConditionKind::Exists(_) => ConditionType::Exists,
            ConditionKind::Boolean(_) => ConditionType::Boolean,
            ConditionKind::Not(_) => ConditionType::Not,
            ConditionKind::Fragment(_) => ConditionType::Fragment,
        }
    }

    /// The field a leaf condition checks
    pub fn field(&self) -> Option<&str> {
        match self {
            ConditionKind::Number(c) => Some(&c.field),
            ConditionKind::String(c) => Some(&c.field),
            ConditionKind::Date(c) => Some(&c.field),
            ConditionKind::Regex(c) => Some(&c.field),
            ConditionKind::Text(c) => Some(&c.field),
            ConditionKind::Lexicon(c) => Some(&c.field),
            ConditionKind::Exists(c) => Some(&c.field),
            ConditionKind::Boolean(_) | ConditionKind::Not(_) | ConditionKind::Fragment(_) => None,
        }
    }
}

impl Condition {
    /// Create an inline condition with default target and no id
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            id: None,
            name: String::new(),
            target: ConditionTarget::default(),
            include_descendants: false,
            notes: None,
            order: None,
            is_fragment: false,
            kind,
        }
    }

    pub fn number(field: impl Into<String>, operator: NumberOperator, value: f64) -> Self {
        Self::new(ConditionKind::Number(NumberCondition {
            field: field.into(),
            operator,
            value,
        }))
    }

    pub fn string(field: impl Into<String>, operator: StringOperator, value: impl Into<String>) -> Self {
        Self::new(ConditionKind::String(StringCondition {
            field: field.into(),
            operator,
            value: value.into(),
        }))
    }

    pub fn date(field: impl Into<String>, operator: DateOperator, value: impl Into<String>) -> Self {
        Self::new(ConditionKind::Date(DateCondition {
            field: field.into(),
            operator,
            value: value.into(),
        }))
    }

    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(ConditionKind::Regex(RegexCondition {
            field: field.into(),
            value: pattern.into(),
        }))
    }

    pub fn text(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(ConditionKind::Text(TextCondition {
            field: field.into(),
            value: query.into(),
        }))
    }

    pub fn lexicon(field: impl Into<String>, lexicon_id: LexiconId) -> Self {
        Self::new(ConditionKind::Lexicon(LexiconCondition {
            field: field.into(),
            value: lexicon_id,
        }))
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::new(ConditionKind::Exists(ExistsCondition { field: field.into() }))
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Self::new(ConditionKind::Boolean(BooleanCondition {
            operator: BooleanOperator::And,
            children,
        }))
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Self::new(ConditionKind::Boolean(BooleanCondition {
            operator: BooleanOperator::Or,
            children,
        }))
    }

    pub fn not(condition: ConditionId) -> Self {
        Self::new(ConditionKind::Not(NotCondition { condition }))
    }

    pub fn fragment(value: ConditionId) -> Self {
        Self::new(ConditionKind::Fragment(FragmentCondition { value }))
    }

    pub fn with_id(mut self, id: ConditionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_target(mut self, target: ConditionTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_include_descendants(mut self, include_descendants: bool) -> Self {
        self.include_descendants = include_descendants;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Mark as a standalone reusable fragment
    pub fn as_fragment(mut self) -> Self {
        self.is_fragment = true;
        self
    }

    pub fn condition_type(&self) -> ConditionType {
        self.kind.condition_type()
    }

    pub fn key(&self) -> ConditionKey {
        ConditionKey {
            id: self.id,
            condition_type: self.condition_type(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.kind.field()
    }

    /// Visit this condition and every inline child condition, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Condition)) {
        visit(self);
        if let ConditionKind::Boolean(boolean) = &self.kind {
            for child in &boolean.children {
                child.walk(visit);
            }
        }
    }
}
