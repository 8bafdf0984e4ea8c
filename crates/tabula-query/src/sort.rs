//! Sorting and top/bottom-N limiting.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tabula_core::{parse_number, Dataset, Row, Value};

/// Which field a sort reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortBy {
    /// Second field of the first row (the measure), unless overridden
    Value,
    /// First field of the first row (the label)
    Label,
    /// A named field
    Field(String),
}

impl From<String> for SortBy {
    fn from(token: String) -> Self {
        match token.as_str() {
            "value" => Self::Value,
            "label" => Self::Label,
            _ => Self::Field(token),
        }
    }
}

impl From<&str> for SortBy {
    fn from(token: &str) -> Self {
        Self::from(token.to_string())
    }
}

impl From<SortBy> for String {
    fn from(by: SortBy) -> Self {
        match by {
            SortBy::Value => "value".to_string(),
            SortBy::Label => "label".to_string(),
            SortBy::Field(name) => name,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

/// End of the ranking a limit keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitDirection {
    /// Highest values
    #[default]
    Top,
    /// Lowest values
    Bottom,
}

impl SortBy {
    fn resolve<'a>(&'a self, first: &'a Row, field: Option<&'a str>) -> Option<&'a str> {
        match self {
            Self::Value => field.or_else(|| first.key_at(1)),
            Self::Label => first.key_at(0),
            Self::Field(name) => Some(name.as_str()),
        }
    }
}

/// Numeric reading of a cell for ordering: numbers and non-blank numeric
/// strings.
fn numeric_key(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) if !s.trim().is_empty() => Some(parse_number(s)).filter(|n| !n.is_nan()),
        _ => None,
    }
}

/// Compare two cells. Numeric cells (numbers and numeric strings) compare by
/// value and rank before everything else; the rest compare as text, ignoring
/// case first and using case as the tie-break. This is a total order, so
/// mixed columns sort without panicking.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let (a, b) = (a.to_text(), b.to_text());
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(&b))
        }
    }
}

/// Stable sort by a resolved field. An empty dataset, or a `value`/`label`
/// token that resolves to no field, is returned unchanged.
#[must_use]
pub fn sort_data(dataset: &Dataset, by: &SortBy, order: SortOrder, field: Option<&str>) -> Dataset {
    let Some(first) = dataset.rows().first() else {
        return dataset.clone();
    };
    let Some(key) = by.resolve(first, field) else {
        return dataset.clone();
    };

    let mut rows = dataset.rows().to_vec();
    rows.sort_by(|a, b| {
        let cmp = compare_values(a.value(key), b.value(key));
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
    tracing::debug!(field = key, ?order, "sorted");
    Dataset::from_rows(rows)
}

/// Keep `n` rows. With a value field the rows are first ranked by its
/// numeric value (descending for top, ascending for bottom); without one the
/// first `n` rows are kept. `n <= 0` keeps everything.
#[must_use]
pub fn limit_data(
    dataset: &Dataset,
    n: i64,
    direction: LimitDirection,
    value_field: Option<&str>,
) -> Dataset {
    let Ok(n) = usize::try_from(n) else {
        return dataset.clone();
    };
    if n == 0 {
        return dataset.clone();
    }

    let Some(field) = value_field else {
        return dataset.head(n);
    };

    let mut rows = dataset.rows().to_vec();
    rows.sort_by(|a, b| {
        let (x, y) = (
            a.value(field).to_number_or_zero(),
            b.value(field).to_number_or_zero(),
        );
        match direction {
            LimitDirection::Top => y.total_cmp(&x),
            LimitDirection::Bottom => x.total_cmp(&y),
        }
    });
    rows.truncate(n);
    Dataset::from_rows(rows)
}
