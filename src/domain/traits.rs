// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline is written against these three traits only:
//
//   DatasetSource  → produces a LabeledTable from a locator
//   Estimator      → fit / predict / score / describe
//   ArtifactStore  → save / load / exists for model artifacts
//
// Concrete implementations live in the data, ml and infra
// layers. Tests substitute their own (in-memory sources,
// counting stores, spy estimators) without touching the
// orchestration code.
//
// All three are Send + Sync so a single Pipeline can be
// shared across request-handling threads.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::artifact::ModelArtifact;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::table::LabeledTable;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Anything that can turn a locator into a labeled table.
///
/// `data::LocatorSource` is the production implementation: it reads
/// `http(s)://` locators over the network and anything else from disk.
pub trait DatasetSource: Send + Sync {
    /// Fetch and parse the dataset behind `locator`.
    ///
    /// Fails with `SourceUnavailable` when the bytes cannot be fetched
    /// and `ParseError` when they do not match the fixed schema.
    fn fetch(&self, locator: &str) -> PipelineResult<LabeledTable>;
}

// ─── Estimator ────────────────────────────────────────────────────────────────
/// Introspection data every fitted estimator can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorDescription {
    /// Algorithm name, e.g. `RandomForestClassifier`
    pub algorithm:           String,
    /// Hyperparameters the estimator was fitted with
    pub hyperparameters:     serde_json::Value,
    /// Feature dimension seen at fit time
    pub feature_count:       usize,
    /// Class labels seen at fit time, sorted
    pub class_labels:        Vec<String>,
    /// Impurity-based importance per feature, summing to 1 (or all 0)
    pub feature_importances: Vec<f64>,
}

/// A pluggable classification algorithm.
///
/// Callers depend only on these four operations, never on
/// algorithm-specific fields.
pub trait Estimator: Send + Sync {
    /// Train on `features` (one D-vector per row) and parallel `labels`.
    /// Calling fit again replaces the previous trained state.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> PipelineResult<()>;

    /// One label per input row, in input order.
    fn predict(&self, features: &[Vec<f64>]) -> PipelineResult<Vec<String>>;

    /// Fraction of `features` whose prediction equals the given label.
    fn score(&self, features: &[Vec<f64>], labels: &[String]) -> PipelineResult<f64> {
        if features.len() != labels.len() {
            return Err(PipelineError::LengthMismatch(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Ok(0.0);
        }

        let predictions = self.predict(features)?;
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();

        Ok(correct as f64 / labels.len() as f64)
    }

    /// Algorithm name, hyperparameters, dimension and labels.
    fn describe(&self) -> PipelineResult<EstimatorDescription>;
}

// ─── ArtifactStore ────────────────────────────────────────────────────────────
/// Single-slot-per-location persistence for model artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Persist `artifact` at `location`, replacing whatever was there.
    /// Readers never observe a partially written artifact.
    fn save(&self, artifact: &ModelArtifact, location: &Path) -> PipelineResult<()>;

    /// Load the artifact at `location`.
    fn load(&self, location: &Path) -> PipelineResult<ModelArtifact>;

    /// Whether anything is persisted at `location`.
    fn exists(&self, location: &Path) -> bool;
}
