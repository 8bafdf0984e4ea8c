//! Engine settings loaded from TOML.

use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_core::DEFAULT_SAMPLE_ROWS;
use tabula_etl::PREVIEW_ROWS;

/// Tunables shared by the CLI and manifests.
///
/// ```toml
/// inferenceSample = 50
/// previewRows = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Rows sampled by column type inference
    pub inference_sample: usize,
    /// Rows returned by pipeline previews
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inference_sample: DEFAULT_SAMPLE_ROWS,
            preview_rows: PREVIEW_ROWS,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(source: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading settings");
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.inference_sample, 20);
        assert_eq!(settings.preview_rows, 20);
        assert_eq!(Settings::from_toml("").unwrap(), settings);
    }

    #[test]
    fn test_partial_override() {
        let settings = Settings::from_toml("previewRows = 5").unwrap();
        assert_eq!(settings.preview_rows, 5);
        assert_eq!(settings.inference_sample, 20);
    }

    #[test]
    fn test_invalid_type() {
        let err = Settings::from_toml("inferenceSample = \"many\"").unwrap_err();
        assert!(matches!(err, ManifestError::Toml(_)));
    }
}
