//! Case-insensitive string comparisons

use super::{field_values, matched, unmatched};
use crate::context::EvaluationContext;
use crate::error::Result;
use docpolicy_core::condition::{StringCondition, StringOperator};
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId};

/// Byte length of the prefix of `haystack` equal to `needle` ignoring case
fn prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut rest = haystack.char_indices();
    for expected in needle.chars() {
        let (_, actual) = rest.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(rest.next().map_or(haystack.len(), |(end, _)| end))
}

/// The parts of `value` the operator matched, empty when it did not match.
///
/// An empty comparison value matches without contributing a term.
pub fn matched_terms<'v>(
    operator: StringOperator,
    value: &'v str,
    needle: &str,
) -> Option<Vec<&'v str>> {
    let term = |end: usize| if end == 0 { Vec::new() } else { vec![&value[..end]] };

    match operator {
        StringOperator::Is => prefix_len(value, needle)
            .filter(|&end| end == value.len())
            .map(term),
        StringOperator::StartsWith => prefix_len(value, needle).map(term),
        StringOperator::EndsWith => value
            .char_indices()
            .map(|(start, _)| start)
            .chain(std::iter::once(value.len()))
            .find(|&start| prefix_len(&value[start..], needle) == Some(value.len() - start))
            .map(|start| {
                let suffix = &value[start..];
                if suffix.is_empty() { Vec::new() } else { vec![suffix] }
            }),
        StringOperator::Contains => {
            if needle.is_empty() {
                return Some(Vec::new());
            }
            let mut terms = Vec::new();
            let mut start = 0;
            while start < value.len() {
                match prefix_len(&value[start..], needle) {
                    Some(len) => {
                        terms.push(&value[start..start + len]);
                        start += len;
                    }
                    None => {
                        start += value[start..].chars().next().map_or(1, char::len_utf8);
                    }
                }
            }
            (!terms.is_empty()).then_some(terms)
        }
    }
}

/// Each matching value contributes the text it matched as a term
pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    string: &StringCondition,
) -> Result<ConditionEvaluationResult> {
    let values = field_values(ctx, document, &string.field);

    let mut is_match = false;
    let mut terms: Vec<String> = Vec::new();
    for value in &values {
        if let Some(found) = matched_terms(string.operator, value, &string.value) {
            is_match = true;
            terms.extend(found.into_iter().map(str::to_string));
        }
    }

    if is_match {
        Ok(matched(ctx, document, condition, terms))
    } else {
        Ok(unmatched(ctx, document, condition))
    }
}
