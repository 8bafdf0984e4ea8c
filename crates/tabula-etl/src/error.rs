//! Error types for tabula-etl.

use thiserror::Error;

/// Errors that can escape a pipeline run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A `findReplace` pattern is not a valid regex.
    #[error("invalid pattern '{pattern}' in step {step}: {source}")]
    InvalidPattern {
        /// Zero-based step index
        step: usize,
        /// Offending regex source
        pattern: String,
        /// Compile error
        #[source]
        source: regex::Error,
    },
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EtlError>;
