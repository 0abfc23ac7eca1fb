//! Condition Model
//!
//! A condition is a typed predicate evaluated against the fields of a document
//! and, depending on its target, against the document's children.
//!
//! # Kinds
//!
//! Leaf conditions check one field:
//! - `number` (`eq`, `gt`, `lt`, `ge`, `le`)
//! - `string` (`is`, `contains`, `starts_with`, `ends_with`, case-insensitive)
//! - `date` (`before`, `after`, `on`, against absolute, relative, time-of-day or weekday values)
//! - `regex`
//! - `text` (boolean term query)
//! - `lexicon` (term expressions of a lexicon)
//! - `exists`
//!
//! Composite conditions combine other conditions:
//! - `boolean` (`and` / `or` over inline children)
//! - `not` (negation of a condition referenced by id)
//! - `fragment` (transparent pointer to a reusable condition)
//!
//! # Serialized form
//!
//! ```yaml
//! id: 10
//! name: invoices
//! condition_type: boolean
//! operator: and
//! children:
//!   - name: is invoice
//!     condition_type: string
//!     field: doc_type
//!     operator: is
//!     value: invoice
//!   - name: shared fragment
//!     condition_type: fragment
//!     value: 42
//! ```

mod operator;
mod types;

pub use operator::{BooleanOperator, DateOperator, NumberOperator, StringOperator};
pub use types::{
    BooleanCondition, Condition, ConditionKey, ConditionKind, ConditionTarget, ConditionType,
    DateCondition, ExistsCondition, FragmentCondition, LexiconCondition, NotCondition,
    NumberCondition, RegexCondition, StringCondition, TextCondition,
};
