//! Error types for configuration loading.

use thiserror::Error;

/// Error type for manifest, pipeline, settings and dataset loading.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// No widget with this id
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestError::UnknownWidget("chart".to_string());
        assert_eq!(err.to_string(), "Unknown widget: chart");

        let err: ManifestError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn test_error_from_parsers() {
        let yaml = serde_yaml_ng::from_str::<Vec<u8>>("{").unwrap_err();
        assert!(matches!(ManifestError::from(yaml), ManifestError::Yaml(_)));
        let json = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert!(matches!(ManifestError::from(json), ManifestError::Json(_)));
        let toml = toml::from_str::<toml::Table>("=").unwrap_err();
        assert!(matches!(ManifestError::from(toml), ManifestError::Toml(_)));
    }
}
