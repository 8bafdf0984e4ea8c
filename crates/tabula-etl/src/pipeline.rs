//! Ordered step sequences applied to a source snapshot.

use crate::error::Result;
use crate::step::TransformStep;
use serde::{Deserialize, Serialize};
use tabula_core::Dataset;

/// Rows returned by [`Pipeline::preview`].
pub const PREVIEW_ROWS: usize = 20;

/// An ordered list of transformation steps.
///
/// Applying never touches the source dataset. Every run starts from the
/// source, so editing the step list only requires running again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    steps: Vec<TransformStep>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Create a pipeline from steps.
    #[must_use]
    pub const fn from_steps(steps: Vec<TransformStep>) -> Self {
        Self { steps }
    }

    /// Append a step.
    pub fn push(&mut self, step: TransformStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Builder-style append.
    #[must_use]
    pub fn with_step(mut self, step: TransformStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Insert a step at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, step: TransformStep) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
    }

    /// Remove the step at `index`.
    pub fn remove(&mut self, index: usize) -> Option<TransformStep> {
        (index < self.steps.len()).then(|| self.steps.remove(index))
    }

    /// Move the step at `from` so it ends up at `to`. Returns `false` when
    /// either index is out of range.
    pub fn move_step(&mut self, from: usize, to: usize) -> bool {
        if from >= self.steps.len() || to >= self.steps.len() {
            return false;
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        true
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Human-readable label of every step.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.steps.iter().map(TransformStep::describe).collect()
    }

    /// Run every step over a copy of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EtlError::InvalidPattern`] when a `findReplace`
    /// pattern does not compile.
    pub fn apply(&self, source: &Dataset) -> Result<Dataset> {
        let mut rows = source.clone().into_rows();
        for (index, step) in self.steps.iter().enumerate() {
            rows = step.run(rows, index)?;
            tracing::debug!(step = index, kind = step.kind(), rows = rows.len(), "step applied");
        }
        Ok(Dataset::from_rows(rows))
    }

    /// Run the pipeline and keep the first [`PREVIEW_ROWS`] rows.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::apply`].
    pub fn preview(&self, source: &Dataset) -> Result<Dataset> {
        self.preview_rows(source, PREVIEW_ROWS)
    }

    /// Run the pipeline and keep the first `rows` rows.
    ///
    /// The whole source goes through every step before truncation, so the
    /// cost is that of [`Pipeline::apply`]; only the output is bounded.
    /// Sorts, duplicate removal and bottom limits see every row.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::apply`].
    pub fn preview_rows(&self, source: &Dataset, rows: usize) -> Result<Dataset> {
        self.apply(source).map(|out| out.head(rows))
    }

    /// Materialize the result, consuming the pipeline.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::apply`].
    pub fn commit(self, source: &Dataset) -> Result<Dataset> {
        let out = self.apply(source)?;
        tracing::info!(steps = self.steps.len(), rows = out.len(), "pipeline committed");
        Ok(out)
    }
}

impl From<Vec<TransformStep>> for Pipeline {
    fn from(steps: Vec<TransformStep>) -> Self {
        Self::from_steps(steps)
    }
}

impl FromIterator<TransformStep> for Pipeline {
    fn from_iter<I: IntoIterator<Item = TransformStep>>(iter: I) -> Self {
        Self::from_steps(iter.into_iter().collect())
    }
}
