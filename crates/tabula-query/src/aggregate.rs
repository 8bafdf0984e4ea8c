//! Group-by aggregation, optionally pivoted by a second dimension.
//!
//! Without a `color_by` field the result is long format: one row per
//! dimension key. With one, it is wide format: one row per dimension key and
//! one column per distinct `color_by` value, as grouped/stacked charts need.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabula_core::{Dataset, Row, Value};

/// Reducer applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    /// Sum of values
    #[default]
    Sum,
    /// Sum divided by row count
    Average,
    /// Number of contributing rows
    Count,
    /// Smallest value
    Min,
    /// Largest value
    Max,
}

impl Aggregator {
    /// Reduce a non-empty group.
    #[must_use]
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Self::Sum => values.iter().sum(),
            Self::Average => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Self::Count => values.len() as f64,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// What to group and reduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSpec {
    /// Grouping field
    pub dimension: String,
    /// Reduced field
    pub measure: String,
    /// Reducer
    #[serde(default)]
    pub aggregator: Aggregator,
    /// Secondary grouping field for pivoted output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_by: Option<String>,
}

impl AggregationSpec {
    /// Create a spec without a secondary dimension.
    #[must_use]
    pub fn new(
        dimension: impl Into<String>,
        measure: impl Into<String>,
        aggregator: Aggregator,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            measure: measure.into(),
            aggregator,
            color_by: None,
        }
    }

    /// Pivot by a secondary dimension.
    #[must_use]
    pub fn color_by(mut self, field: impl Into<String>) -> Self {
        self.color_by = Some(field.into());
        self
    }

    fn pivot_field(&self) -> Option<&str> {
        self.color_by
            .as_deref()
            .filter(|field| *field != self.dimension)
    }
}

/// Long-format result: one reduced value per dimension key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSeries {
    /// Grouping field
    pub dimension: String,
    /// Reduced field
    pub measure: String,
    /// `(key, value)` pairs in first-seen key order
    pub points: Vec<(String, f64)>,
}

impl GroupedSeries {
    /// Rows of `{ dimension: key, measure: value }`.
    #[must_use]
    pub fn to_dataset(&self) -> Dataset {
        self.points
            .iter()
            .map(|(key, value)| {
                Row::new()
                    .with(self.dimension.as_str(), key.as_str())
                    .with(self.measure.as_str(), *value)
            })
            .collect()
    }
}

/// Wide-format result: one row per dimension key, one column per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotedSeries {
    /// Grouping field
    pub dimension: String,
    /// Distinct secondary values in first-seen order
    pub series: Vec<String>,
    /// Per dimension key, the reduced value for each series (absent when the
    /// pair had no rows)
    pub rows: Vec<(String, Vec<Option<f64>>)>,
}

impl PivotedSeries {
    /// Rows of `{ dimension: key, series_1: value, ... }`.
    #[must_use]
    pub fn to_dataset(&self) -> Dataset {
        self.rows
            .iter()
            .map(|(key, cells)| {
                let mut row = Row::new().with(self.dimension.as_str(), key.as_str());
                for (series, cell) in self.series.iter().zip(cells) {
                    if let Some(value) = cell {
                        row.insert(series.as_str(), *value);
                    }
                }
                row
            })
            .collect()
    }
}

/// Aggregation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Aggregation {
    /// Long format
    Grouped(GroupedSeries),
    /// Wide format
    Pivoted(PivotedSeries),
}

impl Aggregation {
    /// Flatten into rows.
    #[must_use]
    pub fn to_dataset(&self) -> Dataset {
        match self {
            Self::Grouped(series) => series.to_dataset(),
            Self::Pivoted(series) => series.to_dataset(),
        }
    }

    /// Consume into rows.
    #[must_use]
    pub fn into_dataset(self) -> Dataset {
        self.to_dataset()
    }

    /// Number of dimension keys.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Grouped(series) => series.points.len(),
            Self::Pivoted(series) => series.rows.len(),
        }
    }

    /// Check if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered grouping.
#[derive(Default)]
struct Groups<T> {
    index: HashMap<String, usize>,
    entries: Vec<(String, T)>,
}

impl<T: Default> Groups<T> {
    fn entry(&mut self, key: String) -> &mut T {
        let slot = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }
}

/// Group rows and reduce the measure.
///
/// Keys are string-coerced dimension values. Every measure value is coerced
/// to a number with NaN counting as zero, so dirty cells contribute `0`
/// rather than being dropped.
#[must_use]
pub fn aggregate_data(dataset: &Dataset, spec: &AggregationSpec) -> Aggregation {
    let measure = |row: &Row| row.value(&spec.measure).to_number_or_zero();
    let key = |row: &Row, field: &str| row.value(field).to_text().into_owned();

    if let Some(pivot) = spec.pivot_field() {
        let mut series: Vec<String> = Vec::new();
        let mut groups: Groups<Groups<Vec<f64>>> = Groups::default();
        for row in dataset {
            let color = key(row, pivot);
            if !series.contains(&color) {
                series.push(color.clone());
            }
            groups
                .entry(key(row, &spec.dimension))
                .entry(color)
                .push(measure(row));
        }

        let rows = groups
            .entries
            .into_iter()
            .map(|(dim_key, inner)| {
                let cells = series
                    .iter()
                    .map(|s| {
                        inner
                            .index
                            .get(s)
                            .map(|&i| spec.aggregator.reduce(&inner.entries[i].1))
                    })
                    .collect();
                (dim_key, cells)
            })
            .collect();

        return Aggregation::Pivoted(PivotedSeries {
            dimension: spec.dimension.clone(),
            series,
            rows,
        });
    }

    let mut groups: Groups<Vec<f64>> = Groups::default();
    for row in dataset {
        groups.entry(key(row, &spec.dimension)).push(measure(row));
    }
    let points = groups
        .entries
        .into_iter()
        .map(|(k, values)| (k, spec.aggregator.reduce(&values)))
        .collect();

    Aggregation::Grouped(GroupedSeries {
        dimension: spec.dimension.clone(),
        measure: spec.measure.clone(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tabula_core::row;

    fn sales() -> Dataset {
        Dataset::from_rows(vec![
            row! { "region" => "North", "product" => "A", "revenue" => 100 },
            row! { "region" => "North", "product" => "B", "revenue" => 50 },
            row! { "region" => "South", "product" => "A", "revenue" => 80 },
            row! { "region" => "North", "product" => "A", "revenue" => "n/a" },
        ])
    }

    fn grouped(agg: &Aggregation) -> &GroupedSeries {
        match agg {
            Aggregation::Grouped(g) => g,
            Aggregation::Pivoted(_) => panic!("expected grouped"),
        }
    }

    // ===== Reducer Tests =====

    #[test]
    fn test_reducers() {
        let values = [4.0, 1.0, 7.0];
        assert_eq!(Aggregator::Sum.reduce(&values), 12.0);
        assert_eq!(Aggregator::Average.reduce(&values), 4.0);
        assert_eq!(Aggregator::Count.reduce(&values), 3.0);
        assert_eq!(Aggregator::Min.reduce(&values), 1.0);
        assert_eq!(Aggregator::Max.reduce(&values), 7.0);
    }

    // ===== Grouped Tests =====

    #[test]
    fn test_sum_by_region() {
        let ds = Dataset::from_rows(vec![
            row! { "region" => "North", "revenue" => 100 },
            row! { "region" => "North", "revenue" => 50 },
            row! { "region" => "South", "revenue" => 80 },
        ]);
        let out = aggregate_data(&ds, &AggregationSpec::new("region", "revenue", Aggregator::Sum));
        assert_eq!(
            out.to_dataset(),
            Dataset::from_rows(vec![
                row! { "region" => "North", "revenue" => 150 },
                row! { "region" => "South", "revenue" => 80 },
            ])
        );
    }

    #[test]
    fn test_dirty_values_count_as_zero() {
        let spec = AggregationSpec::new("region", "revenue", Aggregator::Average);
        let out = aggregate_data(&sales(), &spec);
        assert_eq!(grouped(&out).points[0], ("North".to_string(), 50.0));
    }

    #[test]
    fn test_count_counts_rows() {
        let spec = AggregationSpec::new("region", "revenue", Aggregator::Count);
        let out = aggregate_data(&sales(), &spec);
        assert_eq!(grouped(&out).points[0].1, 3.0);
        assert_eq!(grouped(&out).points[1].1, 1.0);
    }

    #[test]
    fn test_min_max() {
        let min = aggregate_data(&sales(), &AggregationSpec::new("region", "revenue", Aggregator::Min));
        assert_eq!(grouped(&min).points[0].1, 0.0);
        let max = aggregate_data(&sales(), &AggregationSpec::new("region", "revenue", Aggregator::Max));
        assert_eq!(grouped(&max).points[0].1, 100.0);
    }

    #[test]
    fn test_keys_are_string_coerced() {
        let ds = Dataset::from_rows(vec![
            row! { "year" => 2023, "v" => 1 },
            row! { "year" => "2023", "v" => 2 },
            row! { "v" => 5 },
        ]);
        let out = aggregate_data(&ds, &AggregationSpec::new("year", "v", Aggregator::Sum));
        let g = grouped(&out);
        assert_eq!(g.points[0], ("2023".to_string(), 3.0));
        assert_eq!(g.points[1], ("null".to_string(), 5.0));
    }

    #[test]
    fn test_color_by_same_as_dimension_is_grouped() {
        let spec = AggregationSpec::new("region", "revenue", Aggregator::Sum).color_by("region");
        assert!(matches!(aggregate_data(&sales(), &spec), Aggregation::Grouped(_)));
    }

    #[test]
    fn test_empty_dataset() {
        let spec = AggregationSpec::new("region", "revenue", Aggregator::Sum);
        assert!(aggregate_data(&Dataset::new(), &spec).is_empty());
    }

    // ===== Pivot Tests =====

    #[test]
    fn test_pivot_by_product() {
        let spec = AggregationSpec::new("region", "revenue", Aggregator::Sum).color_by("product");
        let out = aggregate_data(&sales(), &spec);
        let Aggregation::Pivoted(p) = &out else {
            panic!("expected pivoted");
        };
        assert_eq!(p.series, vec!["A", "B"]);
        assert_eq!(p.rows[0], ("North".to_string(), vec![Some(100.0), Some(50.0)]));
        assert_eq!(p.rows[1], ("South".to_string(), vec![Some(80.0), None]));

        let ds = out.to_dataset();
        assert_eq!(ds.rows()[1], row! { "region" => "South", "A" => 80 });
    }

    #[test]
    fn test_spec_deserialize() {
        let spec: AggregationSpec = serde_json::from_str(
            r#"{"dimension": "region", "measure": "revenue", "aggregator": "average", "colorBy": "product"}"#,
        )
        .unwrap();
        assert_eq!(spec.aggregator, Aggregator::Average);
        assert_eq!(spec.color_by.as_deref(), Some("product"));
    }

    proptest! {
        #[test]
        fn prop_sum_is_preserved(rows in proptest::collection::vec((0u8..5, -1000i32..1000), 0..60)) {
            let ds: Dataset = rows
                .iter()
                .map(|(k, v)| row! { "k" => i32::from(*k), "v" => *v })
                .collect();
            let total: f64 = rows.iter().map(|(_, v)| f64::from(*v)).sum();
            let out = aggregate_data(&ds, &AggregationSpec::new("k", "v", Aggregator::Sum)).to_dataset();
            let aggregated: f64 = out.iter().map(|r| r.value("v").to_number()).sum();
            prop_assert!((total - aggregated).abs() < 1e-6);
        }
    }
}
