//! Operators used by conditions

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberOperator {
    /// Equal
    Eq,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Ge,
    /// Less than or equal
    Le,
}

impl NumberOperator {
    /// Apply the operator to a field value (left) and the condition value (right)
    pub fn compare(&self, field_value: f64, condition_value: f64) -> bool {
        match field_value.partial_cmp(&condition_value) {
            Some(ordering) => self.accepts(ordering),
            None => false,
        }
    }

    /// Returns true if the ordering of field value to condition value satisfies the operator
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            NumberOperator::Eq => ordering == Ordering::Equal,
            NumberOperator::Gt => ordering == Ordering::Greater,
            NumberOperator::Lt => ordering == Ordering::Less,
            NumberOperator::Ge => ordering != Ordering::Less,
            NumberOperator::Le => ordering != Ordering::Greater,
        }
    }
}

/// String matching operators (always case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringOperator {
    /// Whole value equals
    Is,
    /// Value contains
    Contains,
    /// Value starts with
    StartsWith,
    /// Value ends with
    EndsWith,
}

/// Date comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOperator {
    Before,
    After,
    On,
}

impl DateOperator {
    /// Returns true if the ordering of field value to condition value satisfies the operator
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            DateOperator::Before => ordering == Ordering::Less,
            DateOperator::After => ordering == Ordering::Greater,
            DateOperator::On => ordering == Ordering::Equal,
        }
    }
}

/// Logical operators of a boolean condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOperator {
    And,
    Or,
}
