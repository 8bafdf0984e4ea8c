//! Configuration loading for Tabula: dashboard manifests, pipeline files,
//! engine settings and JSON datasets.

mod error;
mod manifest;
mod settings;

pub use error::ManifestError;
pub use manifest::{load_dataset, Manifest, PipelineDocument};
pub use settings::Settings;
