#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
//! Core types for the Tabula data engine.
//!
//! This crate provides the foundation every other Tabula crate builds on:
//! - Cell values and rows: [`Value`], [`Row`], [`Dataset`]
//! - Shared coercion rules: [`parse_number`], [`parse_float`], [`format_number`]
//! - Column type inference: [`detect_column_types`]
//! - Calculated-column formulas: [`Formula`], [`evaluate`]

mod coerce;
mod date;
mod formula;
mod row;
mod types;
mod value;

pub use coerce::{format_number, parse_float, parse_number};
pub use date::{parse_date, parse_date_str};
pub use formula::{evaluate, Formula, FormulaError};
pub use row::{Dataset, Row};
pub use types::{
    detect_column_types, detect_column_types_with, ColumnType, ColumnTypes, DEFAULT_SAMPLE_ROWS,
};
pub use value::Value;

/// Build a [`Row`] from `key => value` pairs.
///
/// ```
/// use tabula_core::row;
///
/// let r = row! { "region" => "North", "revenue" => 100 };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! row {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut row = $crate::Row::new();
        $(row.insert($key, $value);)*
        row
    }};
}
