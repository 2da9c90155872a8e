// ============================================================
// Layer 2 — Describe Use Case
// ============================================================
// Reports what the persisted model is: algorithm, fitted
// hyperparameters, feature dimension, class labels and
// per-feature importances, plus where it is stored, which
// service version is running and when it was trained.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::pipeline::{enter, failed, Pipeline, ServeStage};
use crate::domain::error::PipelineResult;
use crate::domain::traits::Estimator;

/// Introspection view of the persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub model_type:          String,
    pub hyperparameters:     serde_json::Value,
    pub feature_count:       usize,
    pub class_labels:        Vec<String>,
    pub feature_importances: Vec<f64>,
    pub artifact_location:   PathBuf,
    pub version:             String,
    pub created_at:          DateTime<Utc>,
}

impl Pipeline {
    /// Describe the persisted model, or `ModelNotTrained` if there is none.
    pub fn describe(&self) -> PipelineResult<ModelDescription> {
        let mut stage = ServeStage::Loading;
        self.run_describe(&mut stage)
            .map_err(|e| failed("describe", stage, e))
    }

    fn run_describe(&self, stage: &mut ServeStage) -> PipelineResult<ModelDescription> {
        enter("describe", *stage);
        let artifact = self.load_trained()?;

        *stage = ServeStage::Describing;
        enter("describe", *stage);
        let description = artifact.estimator.describe()?;

        *stage = ServeStage::Done;
        enter("describe", *stage);

        Ok(ModelDescription {
            model_type:          description.algorithm,
            hyperparameters:     description.hyperparameters,
            feature_count:       description.feature_count,
            class_labels:        description.class_labels,
            feature_importances: description.feature_importances,
            artifact_location:   self.config.artifact_location.clone(),
            version:             self.config.version.clone(),
            created_at:          artifact.created_at,
        })
    }
}
