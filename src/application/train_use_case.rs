// ============================================================
// Layer 2 — Train Use Case
// ============================================================
// Runs the full training pipeline in order:
//
//   Step 1: Resolve hyperparameter overrides   (Layer 5 - ml)
//   Step 2: Fetch and parse the dataset        (Layer 4 - data)
//   Step 3: Stratified train/test split        (Layer 4 - data)
//   Step 4: Fit the estimator on train         (Layer 5 - ml)
//   Step 5: Score it on the held-out test rows (Layer 5 - ml)
//   Step 6: Persist the artifact               (Layer 6 - infra)
//   Step 7: Append to the training history     (Layer 6 - infra)
//
// Any failure in steps 1-6 aborts the run: nothing is persisted
// and the error kind reaches the caller unchanged. Step 7 runs
// after the artifact is committed, so its failure is only a
// warning.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::pipeline::{enter, failed, Pipeline, TrainStage};
use crate::data::loader::DEFAULT_DATA_URL;
use crate::data::splitter::stratified_split;
use crate::domain::artifact::{ModelArtifact, TrainingSummary};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::Estimator;
use crate::infra::history::TrainingRecord;
use crate::ml::Classifier;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED:          u64 = 42;

// ─── Request / Outcome ────────────────────────────────────────────────────────
/// Everything a training run needs from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainRequest {
    /// URL or filesystem path of the dataset
    pub locator:         String,
    /// Fraction of rows held out for scoring, strictly in (0, 1)
    pub test_fraction:   f64,
    /// JSON object of hyperparameter overrides, `None` for defaults
    pub hyperparameters: Option<Value>,
    /// Seed for the stratified split
    pub seed:            u64,
}

impl Default for TrainRequest {
    fn default() -> Self {
        Self {
            locator:         DEFAULT_DATA_URL.to_string(),
            test_fraction:   DEFAULT_TEST_FRACTION,
            hyperparameters: None,
            seed:            DEFAULT_SEED,
        }
    }
}

/// What a successful training run reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub accuracy:          f64,
    pub train_samples:     usize,
    pub test_samples:      usize,
    pub artifact_location: PathBuf,
}

// ─── Train flow ───────────────────────────────────────────────────────────────
impl Pipeline {
    /// Fetch, split, fit, score and persist a model.
    pub fn train(&self, request: &TrainRequest) -> PipelineResult<TrainOutcome> {
        let mut stage = TrainStage::Resolving;
        self.run_train(request, &mut stage)
            .map_err(|e| failed("train", stage, e))
    }

    fn run_train(&self, request: &TrainRequest, stage: &mut TrainStage) -> PipelineResult<TrainOutcome> {
        let location = &self.config.artifact_location;

        // ── Step 1: Resolve overrides before touching the network ────────────
        enter("train", *stage);
        if !(request.test_fraction > 0.0 && request.test_fraction < 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "test_size must lie strictly between 0 and 1, got {}",
                request.test_fraction
            )));
        }
        let mut estimator = Classifier::from_overrides(request.hyperparameters.as_ref())?;

        // ── Step 2: Fetch ─────────────────────────────────────────────────────
        *stage = TrainStage::Fetching;
        enter("train", *stage);
        let table = self.source.fetch(&request.locator)?;

        // ── Step 3: Split ─────────────────────────────────────────────────────
        *stage = TrainStage::Splitting;
        enter("train", *stage);
        let split = stratified_split(&table, request.test_fraction, request.seed)?;
        tracing::debug!(
            "Split {} rows into {} train / {} test",
            table.len(),
            split.train.len(),
            split.test.len()
        );

        // ── Step 4: Fit ───────────────────────────────────────────────────────
        *stage = TrainStage::Fitting;
        enter("train", *stage);
        tracing::info!("Training {} model", estimator.algorithm().as_str());
        estimator.fit(&split.train.features(), &split.train.labels())?;

        // ── Step 5: Score ─────────────────────────────────────────────────────
        *stage = TrainStage::Scoring;
        enter("train", *stage);
        let accuracy = estimator.score(&split.test.features(), &split.test.labels())?;
        tracing::info!("Model accuracy: {:.4}", accuracy);

        // ── Step 6: Persist ───────────────────────────────────────────────────
        *stage = TrainStage::Persisting;
        enter("train", *stage);
        let algorithm = estimator.algorithm();
        let artifact  = ModelArtifact::new(
            estimator,
            TrainingSummary {
                source:        request.locator.clone(),
                accuracy,
                train_samples: split.train.len(),
                test_samples:  split.test.len(),
            },
        )?;
        self.store.save(&artifact, location)?;
        tracing::info!("Model saved to {}", location.display());

        // ── Step 7: History ───────────────────────────────────────────────────
        if let Some(history) = &self.history {
            let record = TrainingRecord {
                created_at:    artifact.created_at,
                accuracy,
                train_samples: split.train.len(),
                test_samples:  split.test.len(),
                algorithm:     algorithm.as_str().to_string(),
                source:        request.locator.clone(),
            };
            if let Err(e) = history.append(&record) {
                tracing::warn!("Could not append training history: {:#}", e);
            }
        }

        *stage = TrainStage::Done;
        enter("train", *stage);

        Ok(TrainOutcome {
            accuracy,
            train_samples:     split.train.len(),
            test_samples:      split.test.len(),
            artifact_location: location.clone(),
        })
    }
}
