//! Dashboard-wide filters: date range, dynamic value filters and search.

use crate::query::WidgetConfig;
use serde::{Deserialize, Serialize};
use tabula_core::{Dataset, Row};

/// A dynamic filter: keep rows whose field is one of `values`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFilter {
    /// Field to test
    pub field: String,
    /// Accepted string forms; empty means no constraint
    #[serde(default)]
    pub values: Vec<String>,
}

impl DynamicFilter {
    /// Create a dynamic filter.
    #[must_use]
    pub fn new<S: Into<String>>(field: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Inclusive date range; either bound may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DateRange {
    fn bound(bound: Option<&String>) -> Option<&str> {
        bound.map(String::as_str).filter(|b| !b.is_empty())
    }

    fn contains(&self, text: &str) -> bool {
        Self::bound(self.start.as_ref()).map_or(true, |start| text >= start)
            && Self::bound(self.end.as_ref()).map_or(true, |end| text <= end)
    }
}

/// Dashboard-global filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalFilterState {
    /// Free-text search
    #[serde(default)]
    pub search: String,
    /// Value filters, ANDed
    #[serde(default)]
    pub dynamic: Vec<DynamicFilter>,
    /// Date range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl GlobalFilterState {
    /// Check if no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.dynamic.iter().all(|d| d.values.is_empty())
            && self.date_range.is_none()
    }
}

/// First field of the first row whose name mentions a date or time.
fn date_field(dataset: &Dataset) -> Option<&str> {
    dataset.rows().first()?.keys().find(|key| {
        let key = key.to_lowercase();
        key.contains("date") || key.contains("time")
    })
}

fn matches_search(row: &Row, needle: &str) -> bool {
    row.values()
        .any(|v| v.to_text().to_lowercase().contains(needle))
}

/// Apply the global filters a widget has opted into.
///
/// Stages run in order: date range, dynamic filters, search.
#[must_use]
pub fn apply_global_filters(
    dataset: &Dataset,
    state: &GlobalFilterState,
    config: &WidgetConfig,
) -> Dataset {
    if !config.apply_global_filters {
        return dataset.clone();
    }

    let mut out = dataset.clone();

    if let Some(range) = &state.date_range {
        if let Some(field) = date_field(dataset) {
            out = out.filtered(|row| range.contains(&row.value(field).to_text()));
            tracing::debug!(%field, rows = out.len(), "global date range applied");
        }
    }

    for filter in state.dynamic.iter().filter(|f| !f.values.is_empty()) {
        out = out.filtered(|row| {
            let text = row.value(&filter.field).to_text();
            filter.values.iter().any(|v| *v == text)
        });
    }

    if !state.search.is_empty() {
        let needle = state.search.to_lowercase();
        out = out.filtered(|row| matches_search(row, &needle));
    }

    out
}
