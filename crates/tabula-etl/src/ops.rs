//! Step execution.

use crate::cell;
use crate::error::{EtlError, Result};
use crate::step::{default_date_column, KeyOrder, TransformStep};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use tabula_core::{Dataset, Formula, Row, Value};
use tabula_query::{compare_values, FilterCondition, LimitDirection, SortOrder};

impl TransformStep {
    /// Apply this step on its own.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::InvalidPattern`] for a `findReplace` step whose
    /// pattern does not compile.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        self.run(dataset.clone().into_rows(), 0).map(Dataset::from_rows)
    }

    pub(crate) fn run(&self, mut rows: Vec<Row>, index: usize) -> Result<Vec<Row>> {
        match self {
            Self::Trim { column } => map_column(&mut rows, column, cell::trim),
            Self::ChangeCase { column, case_type } => {
                map_column(&mut rows, column, |v| cell::change_case(v, *case_type));
            }
            Self::FindReplace {
                column,
                find,
                replace,
            } => {
                let re = Regex::new(find).map_err(|source| EtlError::InvalidPattern {
                    step: index,
                    pattern: find.clone(),
                    source,
                })?;
                map_column(&mut rows, column, |v| {
                    if v.is_null() {
                        Value::Null
                    } else {
                        Value::String(re.replace_all(&v.to_text(), replace.as_str()).into_owned())
                    }
                });
            }
            Self::RemoveCurrency { column } => map_column(&mut rows, column, cell::remove_currency),
            Self::Round { column, decimals } => {
                map_column(&mut rows, column, |v| cell::round(v, *decimals));
            }
            Self::FillNull { column, value } => {
                for row in &mut rows {
                    if row.value(column).is_blank() {
                        row.insert(column.as_str(), value.clone());
                    }
                }
            }
            Self::ToNumber { column } => map_column(&mut rows, column, cell::to_number),
            Self::ExtractDate {
                column,
                part,
                new_col,
            } => {
                let target = new_col
                    .clone()
                    .unwrap_or_else(|| default_date_column(column, *part));
                for row in &mut rows {
                    let derived = cell::date_part(row.value(column), *part);
                    row.insert(target.as_str(), derived);
                }
            }
            Self::RemoveDuplicates { key_order } => remove_duplicates(&mut rows, *key_order),
            Self::RemoveNulls { columns } => {
                rows.retain(|row| columns.iter().all(|c| !row.value(c).is_blank()));
            }
            Self::FilterRows {
                column,
                operator,
                value,
            } => {
                let condition = FilterCondition {
                    field: column.clone(),
                    condition: *operator,
                    value: value.clone(),
                };
                rows.retain(|row| condition.matches(row));
            }
            Self::Sort { column, direction } => sort_blanks_last(&mut rows, column, *direction),
            Self::Limit { count, from } => match from {
                LimitDirection::Top => rows.truncate(*count),
                LimitDirection::Bottom => {
                    rows = rows.split_off(rows.len().saturating_sub(*count));
                }
            },
            Self::Rename { old_name, new_name } => {
                for row in &mut rows {
                    row.rename(old_name, new_name);
                }
            }
            Self::Delete { column } => {
                for row in &mut rows {
                    row.remove(column);
                }
            }
            Self::Split {
                column,
                separator,
                new_cols,
            } => {
                for row in &mut rows {
                    let source = row.value(column);
                    let text = if source.is_null() {
                        String::new()
                    } else {
                        source.to_text().into_owned()
                    };
                    let parts = split(&text, separator);
                    for (i, col) in new_cols.iter().enumerate() {
                        let part = parts.get(i).cloned().unwrap_or_default();
                        row.insert(col.as_str(), part);
                    }
                }
            }
            Self::Concat {
                columns,
                separator,
                new_col,
            } => {
                for row in &mut rows {
                    let joined = columns
                        .iter()
                        .map(|c| match row.value(c) {
                            Value::Null => String::new(),
                            v => v.to_text().into_owned(),
                        })
                        .collect::<Vec<_>>()
                        .join(separator);
                    row.insert(new_col.as_str(), joined);
                }
            }
            Self::Calculated { col_name, formula } => {
                let formula = Formula::new(formula.as_str());
                for row in &mut rows {
                    let value = match formula.evaluate_row(row) {
                        Ok(n) => Value::Number(n),
                        Err(err) => {
                            tracing::trace!(column = %col_name, %err, "formula failed");
                            Value::Null
                        }
                    };
                    row.insert(col_name.as_str(), value);
                }
            }
            Self::Unknown => {
                tracing::warn!(step = index, "skipping unknown transformation step");
            }
        }
        Ok(rows)
    }
}

/// Replace a column's value in every row that has it.
fn map_column(rows: &mut [Row], column: &str, f: impl Fn(&Value) -> Value) {
    for row in rows {
        if let Some(cell) = row.get_mut(column) {
            *cell = f(cell);
        }
    }
}

fn split(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator).map(str::to_string).collect()
    }
}

fn duplicate_key(row: &Row, order: KeyOrder) -> Option<String> {
    match order {
        KeyOrder::Preserve => serde_json::to_string(row).ok(),
        KeyOrder::Canonical => serde_json::to_string(&row.sorted_by_key()).ok(),
    }
}

fn remove_duplicates(rows: &mut Vec<Row>, order: KeyOrder) {
    let mut seen = HashSet::new();
    rows.retain(|row| duplicate_key(row, order).map_or(true, |key| seen.insert(key)));
}

fn sort_blanks_last(rows: &mut [Row], column: &str, direction: SortOrder) {
    rows.sort_by(|a, b| {
        let (x, y) = (a.value(column), b.value(column));
        match (x.is_blank(), y.is_blank()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match direction {
                SortOrder::Asc => compare_values(x, y),
                SortOrder::Desc => compare_values(x, y).reverse(),
            },
        }
    });
}
