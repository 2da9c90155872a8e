// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Serves predictions from the persisted artifact:
//
//   Step 1: Loading    — existence check, then load
//   Step 2: Validating — non-empty batch, every row has the
//                        artifact's feature dimension
//   Step 3: Predicting — one label per row, input order
//
// An absent artifact is the normal first-run state and is
// reported as ModelNotTrained without any read. Validation
// happens entirely before the estimator is called, so a bad
// batch never reaches the model.
//
// The store takes no lock on load, so any number of predict
// calls may run against one Pipeline at once.

use crate::application::pipeline::{enter, failed, Pipeline, ServeStage};
use crate::domain::artifact::ModelArtifact;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::Estimator;

impl Pipeline {
    /// Predict one label per feature row using the persisted model.
    pub fn predict(&self, features: &[Vec<f64>]) -> PipelineResult<Vec<String>> {
        let mut stage = ServeStage::Loading;
        self.run_predict(features, &mut stage)
            .map_err(|e| failed("predict", stage, e))
    }

    fn run_predict(&self, features: &[Vec<f64>], stage: &mut ServeStage) -> PipelineResult<Vec<String>> {
        enter("predict", *stage);
        let artifact = self.load_trained()?;
        predict_with(&artifact.estimator, artifact.feature_count, features, stage)
    }

    /// Load the artifact, or `ModelNotTrained` if none has been saved.
    pub(crate) fn load_trained(&self) -> PipelineResult<ModelArtifact> {
        let location = &self.config.artifact_location;
        if !self.store.exists(location) {
            return Err(PipelineError::ModelNotTrained(format!(
                "no model at '{}'; train one first",
                location.display()
            )));
        }
        self.store.load(location)
    }
}

/// Reject an empty batch or any row whose length differs from `dimension`.
pub(crate) fn validate_batch(features: &[Vec<f64>], dimension: usize) -> PipelineResult<()> {
    if features.is_empty() {
        return Err(PipelineError::EmptyInput("no feature rows supplied".to_string()));
    }
    match features.iter().position(|row| row.len() != dimension) {
        Some(idx) => Err(PipelineError::DimensionMismatch(format!(
            "row {} has {} features, model expects {}",
            idx,
            features[idx].len(),
            dimension
        ))),
        None => Ok(()),
    }
}

/// Validate `features` against `dimension`, then predict with `estimator`.
pub(crate) fn predict_with(
    estimator: &dyn Estimator,
    dimension: usize,
    features:  &[Vec<f64>],
    stage:     &mut ServeStage,
) -> PipelineResult<Vec<String>> {
    *stage = ServeStage::Validating;
    enter("predict", *stage);
    validate_batch(features, dimension)?;

    *stage = ServeStage::Predicting;
    enter("predict", *stage);
    let predictions = estimator.predict(features)?;

    *stage = ServeStage::Done;
    enter("predict", *stage);
    tracing::info!("Predicted {} samples", predictions.len());
    Ok(predictions)
}
