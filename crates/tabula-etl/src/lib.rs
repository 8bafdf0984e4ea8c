#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::doc_markdown)]
//! Transformation pipelines for Tabula.
//!
//! A [`Pipeline`] is an ordered list of [`TransformStep`]s. Each step is a
//! pure `Dataset -> Dataset` function; the pipeline runs them in order over a
//! copy of the source:
//!
//! ```
//! use tabula_core::{row, Dataset, Value};
//! use tabula_etl::{Pipeline, TransformStep};
//!
//! let source = Dataset::from_rows(vec![row! { "revenue" => 100, "cost" => 60 }]);
//! let pipeline = Pipeline::new().with_step(TransformStep::Calculated {
//!     col_name: "margin".to_string(),
//!     formula: "{revenue}-{cost}".to_string(),
//! });
//! let out = pipeline.apply(&source).unwrap();
//! assert_eq!(out.rows()[0].value("margin"), &Value::from(40));
//! ```

mod cell;
mod error;
mod ops;
mod pipeline;
mod step;

pub use cell::{CaseType, DatePart};
pub use error::{EtlError, Result};
pub use pipeline::{Pipeline, PREVIEW_ROWS};
pub use step::{default_date_column, KeyOrder, TransformStep};
