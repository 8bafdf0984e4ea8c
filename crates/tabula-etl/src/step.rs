//! The transformation step catalog.

use crate::cell::{CaseType, DatePart};
use serde::{Deserialize, Serialize};
use tabula_core::Value;
use tabula_query::{ConditionValue, LimitDirection, Operator, SortOrder};

/// How rows are keyed for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Serialize fields in row order; rows differing only in key order are
    /// distinct
    #[default]
    Preserve,
    /// Serialize fields sorted by name
    Canonical,
}

/// One pipeline step. The `type` tag selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransformStep {
    /// Strip surrounding whitespace
    Trim {
        /// Target column
        column: String,
    },
    /// Upper/lower/capitalize
    #[serde(rename_all = "camelCase")]
    ChangeCase {
        /// Target column
        column: String,
        /// Target case
        case_type: CaseType,
    },
    /// Regex replace of every match
    FindReplace {
        /// Target column
        column: String,
        /// Regex source
        find: String,
        /// Replacement, `$1` style groups allowed
        #[serde(default)]
        replace: String,
    },
    /// Strip currency formatting and parse
    RemoveCurrency {
        /// Target column
        column: String,
    },
    /// Round to a number of decimals
    Round {
        /// Target column
        column: String,
        /// Decimal places
        #[serde(default)]
        decimals: u32,
    },
    /// Replace null, empty and missing cells
    FillNull {
        /// Target column
        column: String,
        /// Replacement
        #[serde(default)]
        value: Value,
    },
    /// Parse the leading number
    ToNumber {
        /// Target column
        column: String,
    },
    /// Derive a date component column
    #[serde(rename_all = "camelCase")]
    ExtractDate {
        /// Source column
        column: String,
        /// Component
        part: DatePart,
        /// Output column; `<column>_<part>` when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_col: Option<String>,
    },
    /// Drop rows identical to an earlier row
    #[serde(rename_all = "camelCase")]
    RemoveDuplicates {
        /// Key ordering used for comparison
        #[serde(default)]
        key_order: KeyOrder,
    },
    /// Drop rows with a blank value in any listed column
    RemoveNulls {
        /// Columns checked
        #[serde(default)]
        columns: Vec<String>,
    },
    /// Keep rows matching a condition
    FilterRows {
        /// Tested column
        column: String,
        /// Comparison
        operator: Operator,
        /// Right-hand side
        #[serde(default)]
        value: ConditionValue,
    },
    /// Stable sort, blanks last
    Sort {
        /// Sort column
        column: String,
        /// Direction
        #[serde(default)]
        direction: SortOrder,
    },
    /// Keep the first or last rows
    Limit {
        /// Rows kept
        count: usize,
        /// `top` keeps the first rows, `bottom` the last
        #[serde(default)]
        from: LimitDirection,
    },
    /// Rename a column in place
    #[serde(rename_all = "camelCase")]
    Rename {
        /// Current name
        old_name: String,
        /// New name
        new_name: String,
    },
    /// Remove a column
    Delete {
        /// Removed column
        column: String,
    },
    /// Split a column into several
    #[serde(rename_all = "camelCase")]
    Split {
        /// Source column
        column: String,
        /// Separator
        separator: String,
        /// Output columns, filled by position
        new_cols: Vec<String>,
    },
    /// Join several columns into one
    #[serde(rename_all = "camelCase")]
    Concat {
        /// Source columns
        columns: Vec<String>,
        /// Separator
        #[serde(default)]
        separator: String,
        /// Output column
        new_col: String,
    },
    /// Arithmetic over other columns
    #[serde(rename_all = "camelCase")]
    Calculated {
        /// Output column
        col_name: String,
        /// Formula with `{column}` references
        formula: String,
    },
    /// Unrecognized step type; skipped
    #[serde(other)]
    Unknown,
}

impl TransformStep {
    /// The `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Trim { .. } => "trim",
            Self::ChangeCase { .. } => "changeCase",
            Self::FindReplace { .. } => "findReplace",
            Self::RemoveCurrency { .. } => "removeCurrency",
            Self::Round { .. } => "round",
            Self::FillNull { .. } => "fillNull",
            Self::ToNumber { .. } => "toNumber",
            Self::ExtractDate { .. } => "extractDate",
            Self::RemoveDuplicates { .. } => "removeDuplicates",
            Self::RemoveNulls { .. } => "removeNulls",
            Self::FilterRows { .. } => "filterRows",
            Self::Sort { .. } => "sort",
            Self::Limit { .. } => "limit",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
            Self::Split { .. } => "split",
            Self::Concat { .. } => "concat",
            Self::Calculated { .. } => "calculated",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Trim { column } => format!("Trim whitespace in '{column}'"),
            Self::ChangeCase { column, case_type } => {
                let case = match case_type {
                    CaseType::Upper => "upper case",
                    CaseType::Lower => "lower case",
                    CaseType::Capitalize => "capitalized",
                };
                format!("Convert '{column}' to {case}")
            }
            Self::FindReplace {
                column,
                find,
                replace,
            } => format!("Replace /{find}/ with '{replace}' in '{column}'"),
            Self::RemoveCurrency { column } => format!("Remove currency formatting from '{column}'"),
            Self::Round { column, decimals } => {
                format!("Round '{column}' to {decimals} decimal(s)")
            }
            Self::FillNull { column, value } => format!("Fill empty '{column}' with '{value}'"),
            Self::ToNumber { column } => format!("Convert '{column}' to number"),
            Self::ExtractDate {
                column,
                part,
                new_col,
            } => format!(
                "Extract {} from '{column}' into '{}'",
                part.as_str(),
                new_col
                    .clone()
                    .unwrap_or_else(|| default_date_column(column, *part))
            ),
            Self::RemoveDuplicates { key_order } => match key_order {
                KeyOrder::Preserve => "Remove duplicate rows".to_string(),
                KeyOrder::Canonical => "Remove duplicate rows (any key order)".to_string(),
            },
            Self::RemoveNulls { columns } => {
                format!("Remove rows with empty {}", quoted(columns))
            }
            Self::FilterRows {
                column,
                operator,
                value,
            } => format!("Keep rows where '{column}' {operator:?} '{}'", value.to_text()),
            Self::Sort { column, direction } => match direction {
                SortOrder::Asc => format!("Sort by '{column}' ascending"),
                SortOrder::Desc => format!("Sort by '{column}' descending"),
            },
            Self::Limit { count, from } => match from {
                LimitDirection::Top => format!("Keep first {count} row(s)"),
                LimitDirection::Bottom => format!("Keep last {count} row(s)"),
            },
            Self::Rename { old_name, new_name } => format!("Rename '{old_name}' to '{new_name}'"),
            Self::Delete { column } => format!("Delete column '{column}'"),
            Self::Split {
                column,
                separator,
                new_cols,
            } => format!("Split '{column}' on '{separator}' into {}", quoted(new_cols)),
            Self::Concat {
                columns, new_col, ..
            } => format!("Join {} into '{new_col}'", quoted(columns)),
            Self::Calculated { col_name, formula } => format!("Calculate '{col_name}' = {formula}"),
            Self::Unknown => "Unknown step (skipped)".to_string(),
        }
    }
}

/// Output column of `extractDate` when none is given.
#[must_use]
pub fn default_date_column(column: &str, part: DatePart) -> String {
    format!("{column}_{}", part.as_str())
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_params() {
        let step: TransformStep = serde_json::from_str(
            r#"{"type": "split", "column": "name", "separator": ",", "newCols": ["first", "last"]}"#,
        )
        .unwrap();
        assert_eq!(
            step,
            TransformStep::Split {
                column: "name".to_string(),
                separator: ",".to_string(),
                new_cols: vec!["first".to_string(), "last".to_string()],
            }
        );

        let step: TransformStep = serde_json::from_str(
            r#"{"type": "changeCase", "column": "city", "caseType": "capitalize"}"#,
        )
        .unwrap();
        assert_eq!(step.kind(), "changeCase");
    }

    #[test]
    fn test_unknown_type() {
        let step: TransformStep = serde_json::from_str(r#"{"type": "pivotTable"}"#).unwrap();
        assert_eq!(step, TransformStep::Unknown);
    }

    #[test]
    fn test_defaults() {
        let step: TransformStep = serde_json::from_str(r#"{"type": "removeDuplicates"}"#).unwrap();
        assert_eq!(
            step,
            TransformStep::RemoveDuplicates {
                key_order: KeyOrder::Preserve
            }
        );
        let step: TransformStep =
            serde_json::from_str(r#"{"type": "limit", "count": 3, "from": "bottom"}"#).unwrap();
        assert_eq!(
            step,
            TransformStep::Limit {
                count: 3,
                from: LimitDirection::Bottom
            }
        );
    }

    #[test]
    fn test_serialize_tag() {
        let step = TransformStep::Calculated {
            col_name: "margin".to_string(),
            formula: "{revenue}-{cost}".to_string(),
        };
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(
            json,
            r#"{"type":"calculated","colName":"margin","formula":"{revenue}-{cost}"}"#
        );
    }

    #[test]
    fn test_describe() {
        let step = TransformStep::ExtractDate {
            column: "order_date".to_string(),
            part: DatePart::Quarter,
            new_col: None,
        };
        assert_eq!(
            step.describe(),
            "Extract quarter from 'order_date' into 'order_date_quarter'"
        );
        assert_eq!(
            TransformStep::Rename {
                old_name: "a".to_string(),
                new_name: "b".to_string()
            }
            .describe(),
            "Rename 'a' to 'b'"
        );
    }
}
