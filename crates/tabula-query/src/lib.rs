#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
//! Query core for Tabula dashboards.
//!
//! Every widget's rows pass through the same chain:
//!
//! 1. [`apply_global_filters`]: dashboard-wide date range, value filters and search
//! 2. [`apply_cross_filters`]: live values broadcast by filter widgets
//! 3. [`filter_data`]: the widget's own conditions
//! 4. [`aggregate_data`]: group-by, optionally pivoted
//! 5. [`sort_data`] and [`limit_data`]
//!
//! [`prepare_widget_data`] runs the whole chain for one [`Widget`].

mod aggregate;
mod cross;
mod filter;
mod global;
mod query;
mod sort;

pub use aggregate::{
    aggregate_data, Aggregation, AggregationSpec, Aggregator, GroupedSeries, PivotedSeries,
};
pub use cross::{
    apply_cross_filters, BindingConfig, Bounds, LiveValue, NumericBounds, WidgetBinding,
};
pub use filter::{filter_data, ConditionValue, FilterCondition, Operator};
pub use global::{apply_global_filters, DateRange, DynamicFilter, GlobalFilterState};
pub use query::{prepare_widget_data, DashboardContext, LimitSpec, SortSpec, Widget, WidgetConfig};
pub use sort::{compare_values, limit_data, sort_data, LimitDirection, SortBy, SortOrder};
