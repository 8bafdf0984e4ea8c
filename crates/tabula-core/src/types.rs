//! Column type inference from a row sample.

use crate::coerce::parse_number;
use crate::date::parse_date;
use crate::row::Dataset;
use crate::value::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Rows inspected when no sample size is configured.
pub const DEFAULT_SAMPLE_ROWS: usize = 20;

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every sampled value is numeric
    Number,
    /// Every sampled value is a date
    Date,
    /// Anything else, including columns with no sampled values
    Text,
}

impl ColumnType {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Date => "date",
            Self::Text => "text",
        }
    }
}

/// Inferred types keyed by field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes {
    columns: Vec<(String, ColumnType)>,
}

impl ColumnTypes {
    /// Type of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, t)| *t)
    }

    /// Fields and types in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, t)| (name.as_str(), *t))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if no columns were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for ColumnTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, t) in &self.columns {
            map.serialize_entry(name, t)?;
        }
        map.end()
    }
}

/// Classify every column using the first [`DEFAULT_SAMPLE_ROWS`] rows.
#[must_use]
pub fn detect_column_types(dataset: &Dataset) -> ColumnTypes {
    detect_column_types_with(dataset, DEFAULT_SAMPLE_ROWS)
}

/// Classify every column using the first `sample_rows` rows.
///
/// Number is tried before date: numeric strings would otherwise pass as
/// dates.
#[must_use]
pub fn detect_column_types_with(dataset: &Dataset, sample_rows: usize) -> ColumnTypes {
    let sample = &dataset.rows()[..dataset.len().min(sample_rows)];

    let mut fields: Vec<&str> = Vec::new();
    for row in sample {
        for key in row.keys() {
            if !fields.contains(&key) {
                fields.push(key);
            }
        }
    }

    let columns = fields
        .into_iter()
        .map(|field| {
            let values: Vec<&Value> = sample
                .iter()
                .map(|row| row.value(field))
                .filter(|v| !v.is_blank())
                .collect();
            (field.to_string(), classify(&values))
        })
        .collect();

    tracing::debug!(rows = sample.len(), "column types inferred");
    ColumnTypes { columns }
}

fn classify(values: &[&Value]) -> ColumnType {
    if values.is_empty() {
        ColumnType::Text
    } else if values.iter().all(|v| is_numeric(v)) {
        ColumnType::Number
    } else if values.iter().all(|v| parse_date(v).is_some()) {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(n) => !n.is_nan(),
        Value::String(s) => !parse_number(s).is_nan(),
        Value::Null | Value::Bool(_) => false,
    }
}
