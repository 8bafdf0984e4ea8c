//! Render-time query chain for a single widget.
//!
//! ```text
//! raw rows -> global filters -> cross filters -> local filters
//!          -> aggregation -> sort -> limit -> chart rows
//! ```

use crate::aggregate::{aggregate_data, AggregationSpec};
use crate::cross::{apply_cross_filters, BindingConfig, LiveValue, WidgetBinding};
use crate::filter::{filter_data, FilterCondition};
use crate::global::{apply_global_filters, GlobalFilterState};
use crate::sort::{limit_data, sort_data, LimitDirection, SortBy, SortOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabula_core::Dataset;

/// Sort options of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// `value`, `label` or a field name
    pub by: SortBy,
    /// Direction
    #[serde(default)]
    pub order: SortOrder,
    /// Field used by the `value` token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Limit options of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSpec {
    /// Rows to keep; non-positive keeps all
    pub count: i64,
    /// Which end to keep
    #[serde(default)]
    pub direction: LimitDirection,
    /// Field ranked by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
}

/// Query options of a widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Cross-filter targeting, for filter widgets
    #[serde(flatten)]
    pub binding: BindingConfig,
    /// Opt into dashboard-global filters
    #[serde(default)]
    pub apply_global_filters: bool,
    /// Widget-local filters
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    /// Grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationSpec>,
    /// Ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Row cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<LimitSpec>,
}

/// A dashboard widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Widget id
    pub id: String,
    /// Widget type
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Options
    #[serde(default)]
    pub config: WidgetConfig,
}

impl Widget {
    /// Create a widget with default options.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            config: WidgetConfig::default(),
        }
    }

    /// Set the options.
    #[must_use]
    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }

    /// Cross-filter view of this widget.
    #[must_use]
    pub fn binding(&self) -> WidgetBinding {
        WidgetBinding {
            id: self.id.clone(),
            kind: self.kind.clone(),
            config: self.config.binding.clone(),
        }
    }
}

/// Everything a widget query depends on besides the rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardContext {
    /// Global filter state
    #[serde(default)]
    pub global: GlobalFilterState,
    /// All widgets on the dashboard
    #[serde(default)]
    pub widgets: Vec<Widget>,
    /// Live values of filter widgets, by widget id
    #[serde(default)]
    pub live: HashMap<String, LiveValue>,
}

impl DashboardContext {
    /// Look up a widget.
    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Run the query chain for the widget `id`.
    #[must_use]
    pub fn query(&self, dataset: &Dataset, id: &str) -> Option<Dataset> {
        self.widget(id)
            .map(|widget| prepare_widget_data(dataset, widget, self))
    }
}

/// Run the full query chain for one widget.
#[must_use]
pub fn prepare_widget_data(dataset: &Dataset, widget: &Widget, context: &DashboardContext) -> Dataset {
    let config = &widget.config;

    let data = apply_global_filters(dataset, &context.global, config);
    let bindings: Vec<WidgetBinding> = context.widgets.iter().map(Widget::binding).collect();
    let data = apply_cross_filters(&data, &widget.id, &bindings, &context.live);
    let mut data = filter_data(&data, &config.filters);
    tracing::debug!(widget = %widget.id, rows = data.len(), "filters applied");

    if let Some(spec) = &config.aggregation {
        data = aggregate_data(&data, spec).into_dataset();
    }
    if let Some(sort) = &config.sort {
        data = sort_data(&data, &sort.by, sort.order, sort.field.as_deref());
    }
    if let Some(limit) = &config.limit {
        data = limit_data(&data, limit.count, limit.direction, limit.value_field.as_deref());
    }

    tracing::debug!(widget = %widget.id, rows = data.len(), "widget data prepared");
    data
}
