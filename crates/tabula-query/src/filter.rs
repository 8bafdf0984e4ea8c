//! Per-row filter conditions with AND semantics.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tabula_core::{parse_number, Dataset, Row, Value};

/// Comparison applied by a [`FilterCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// String-coerced equality
    Equals,
    /// String-coerced inequality
    NotEquals,
    /// Case-insensitive substring
    Contains,
    /// Membership in a list
    In,
    /// Inclusive `[lo, hi]` range
    Between,
    /// Numeric greater-than
    Gt,
    /// Numeric less-than
    Lt,
    /// Numeric greater-or-equal
    Gte,
    /// Numeric less-or-equal
    Lte,
    /// Case-insensitive prefix
    StartsWith,
    /// Null or empty
    IsNull,
    /// Neither null nor empty
    NotNull,
    /// Unrecognized operator; always passes
    #[serde(other)]
    Unknown,
}

/// Right-hand side of a condition: a scalar or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// List of values (`in`, `between`)
    List(Vec<Value>),
    /// Single value
    Scalar(Value),
}

impl Default for ConditionValue {
    fn default() -> Self {
        Self::Scalar(Value::Null)
    }
}

impl ConditionValue {
    /// String coercion; lists join with commas.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Scalar(v) => v.to_text().into_owned(),
            Self::List(items) => items
                .iter()
                .map(|v| if v.is_null() { String::new() } else { v.to_text().into_owned() })
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Numeric coercion. Lists go through their string form, so `[5]` is 5
    /// and `[1, 2]` is NaN.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Scalar(v) => v.to_number(),
            Self::List(_) => parse_number(&self.to_text()),
        }
    }
}

impl Operator {
    /// Test one cell against the condition value.
    #[must_use]
    pub fn test(self, cell: &Value, target: &ConditionValue) -> bool {
        match self {
            Self::Equals => cell.to_text() == target.to_text(),
            Self::NotEquals => cell.to_text() != target.to_text(),
            Self::Contains => lower(cell).contains(&target.to_text().to_lowercase()),
            Self::StartsWith => lower(cell).starts_with(&target.to_text().to_lowercase()),
            Self::In => match target {
                ConditionValue::List(items) => {
                    let text = cell.to_text();
                    items.iter().any(|item| item.to_text() == text)
                }
                ConditionValue::Scalar(_) => true,
            },
            Self::Between => match target {
                ConditionValue::List(bounds) if bounds.len() == 2 => {
                    matches!(
                        cell.loose_cmp(&bounds[0]),
                        Some(Ordering::Greater | Ordering::Equal)
                    ) && matches!(
                        cell.loose_cmp(&bounds[1]),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                }
                _ => true,
            },
            Self::Gt => cell.to_number() > target.to_number(),
            Self::Lt => cell.to_number() < target.to_number(),
            Self::Gte => cell.to_number() >= target.to_number(),
            Self::Lte => cell.to_number() <= target.to_number(),
            Self::IsNull => cell.is_blank(),
            Self::NotNull => !cell.is_blank(),
            Self::Unknown => true,
        }
    }
}

fn lower(cell: &Value) -> String {
    cell.to_text().to_lowercase()
}

/// A single `{ field, condition, value }` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Field to test
    pub field: String,
    /// Comparison
    pub condition: Operator,
    /// Right-hand side
    #[serde(default)]
    pub value: ConditionValue,
}

impl FilterCondition {
    /// Create a condition with a scalar value.
    #[must_use]
    pub fn new(field: impl Into<String>, condition: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            condition,
            value: ConditionValue::Scalar(value.into()),
        }
    }

    /// Create a condition with a list value.
    #[must_use]
    pub fn with_list(field: impl Into<String>, condition: Operator, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            condition,
            value: ConditionValue::List(values),
        }
    }

    /// Check a row. Missing fields read as null.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.condition.test(row.value(&self.field), &self.value)
    }
}

/// Keep the rows passing every condition. An empty list keeps everything.
#[must_use]
pub fn filter_data(dataset: &Dataset, conditions: &[FilterCondition]) -> Dataset {
    if conditions.is_empty() {
        return dataset.clone();
    }
    dataset.filtered(|row| conditions.iter().all(|c| c.matches(row)))
}
