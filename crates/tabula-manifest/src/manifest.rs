//! Dashboard manifests and pipeline documents.

use crate::error::ManifestError;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tabula_core::Dataset;
use tabula_etl::{Pipeline, TransformStep};
use tabula_query::{prepare_widget_data, DashboardContext, GlobalFilterState, LiveValue, Widget};

/// Dashboard manifest loaded from YAML.
///
/// ```yaml
/// settings: { previewRows: 10 }
/// global:
///   dynamic: [{ field: category, values: [A] }]
/// widgets:
///   - id: chart
///     type: barChart
///     config:
///       applyGlobalFilters: true
///       aggregation: { dimension: region, measure: revenue, aggregator: sum }
/// live: {}
/// pipeline:
///   steps: [{ type: trim, column: region }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Engine settings
    #[serde(default)]
    pub settings: Settings,
    /// Global filter state
    #[serde(default)]
    pub global: GlobalFilterState,
    /// Widgets
    #[serde(default)]
    pub widgets: Vec<Widget>,
    /// Live values of filter widgets
    #[serde(default)]
    pub live: HashMap<String, LiveValue>,
    /// Transformations applied before any widget query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Pipeline>,
}

impl Manifest {
    /// Parse a manifest from YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize manifest to YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Load a manifest from a YAML or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading manifest");
        let source = std::fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&source)?)
        } else {
            Self::from_yaml(&source)
        }
    }

    /// Query context built from the global state, widgets and live values.
    #[must_use]
    pub fn context(&self) -> DashboardContext {
        DashboardContext {
            global: self.global.clone(),
            widgets: self.widgets.clone(),
            live: self.live.clone(),
        }
    }

    /// Run the query chain of the widget `widget_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnknownWidget`] when no widget has this id.
    pub fn query(&self, dataset: &Dataset, widget_id: &str) -> Result<Dataset, ManifestError> {
        let context = self.context();
        let widget = context
            .widget(widget_id)
            .ok_or_else(|| ManifestError::UnknownWidget(widget_id.to_string()))?;
        Ok(prepare_widget_data(dataset, widget, &context))
    }

    /// Apply the manifest pipeline to `dataset`; identity when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a pipeline step fails.
    pub fn prepare(&self, dataset: &Dataset) -> tabula_etl::Result<Dataset> {
        match &self.pipeline {
            Some(pipeline) => pipeline.apply(dataset),
            None => Ok(dataset.clone()),
        }
    }

    /// Run the manifest pipeline and keep the first `settings.previewRows`
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a pipeline step fails.
    pub fn preview(&self, dataset: &Dataset) -> tabula_etl::Result<Dataset> {
        self.prepare(dataset)
            .map(|out| out.head(self.settings.preview_rows))
    }
}

/// A standalone pipeline file.
///
/// ```yaml
/// name: clean orders
/// steps:
///   - { type: trim, column: customer }
///   - { type: removeDuplicates }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    /// Optional name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps in order
    #[serde(default)]
    pub steps: Vec<TransformStep>,
}

impl PipelineDocument {
    /// Parse a pipeline document from YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a pipeline document from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading pipeline");
        let source = std::fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&source)?)
        } else {
            Self::from_yaml(&source)
        }
    }

    /// Build the executable pipeline.
    #[must_use]
    pub fn into_pipeline(self) -> Pipeline {
        Pipeline::from_steps(self.steps)
    }
}

/// Load a dataset from a JSON array of objects.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an array of objects.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, ManifestError> {
    let path = path.as_ref();
    let dataset = Dataset::from_json(&std::fs::read_to_string(path)?)?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "dataset loaded");
    Ok(dataset)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
