//! Tabula: tabular transformation and aggregation engine.
//!
//! Rows go through an optional ETL [`etl::Pipeline`], then at render time
//! through each widget's query chain:
//!
//! ```
//! use tabula::prelude::*;
//!
//! let rows = Dataset::from_rows(vec![
//!     row! { "region" => "North", "revenue" => 100 },
//!     row! { "region" => "North", "revenue" => 50 },
//!     row! { "region" => "South", "revenue" => 80 },
//! ]);
//! let spec = AggregationSpec::new("region", "revenue", Aggregator::Sum);
//! let out = aggregate_data(&rows, &spec).into_dataset();
//! assert_eq!(out.rows()[0], row! { "region" => "North", "revenue" => 150 });
//! ```

pub use tabula_core::*;
pub use tabula_etl as etl;
pub use tabula_manifest as manifest;
pub use tabula_query as query;

/// Common imports.
pub mod prelude {
    pub use tabula_core::{row, Dataset, Row, Value};
    pub use tabula_etl::{Pipeline, TransformStep};
    pub use tabula_manifest::{Manifest, PipelineDocument, Settings};
    pub use tabula_query::{
        aggregate_data, apply_cross_filters, apply_global_filters, filter_data, limit_data,
        prepare_widget_data, sort_data, AggregationSpec, Aggregator, DashboardContext,
        FilterCondition, GlobalFilterState, LimitDirection, LiveValue, Operator, SortBy,
        SortOrder, Widget, WidgetConfig,
    };
}
