// ============================================================
// Layer 2 — Pipeline
// ============================================================
// The orchestrator that every use case runs through. It owns
// its collaborators and its configuration; nothing is read from
// globals once a Pipeline has been built.
//
//   config  → where the artifact lives, which version to report
//   source  → DatasetSource used by the train flow
//   store   → ArtifactStore shared by every flow
//   history → optional training-run log beside the artifact
//
// Each flow walks a fixed sequence of stages. Entering a stage
// is logged at debug; a failure is logged once at error with
// the stage it happened in and its kind, then returned to the
// caller unchanged. Nothing is retried.
//
// The flows themselves live in train_use_case.rs,
// predict_use_case.rs and describe_use_case.rs as further
// `impl Pipeline` blocks.
//
// Reference: Rust Book §17 (Trait Objects)
//            tracing crate documentation (structured fields)

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::error::PipelineError;
use crate::domain::traits::{ArtifactStore, DatasetSource};
use crate::infra::config::{ServiceConfig, DEFAULT_MODEL_PATH, DEFAULT_VERSION};
use crate::infra::history::TrainingHistory;

// ─── Configuration ────────────────────────────────────────────────────────────
/// Settings a Pipeline is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub artifact_location: PathBuf,
    pub version:           String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_location: PathBuf::from(DEFAULT_MODEL_PATH),
            version:           DEFAULT_VERSION.to_string(),
        }
    }
}

impl From<&ServiceConfig> for PipelineConfig {
    fn from(c: &ServiceConfig) -> Self {
        Self {
            artifact_location: c.artifact_location.clone(),
            version:           c.version.clone(),
        }
    }
}

// ─── Stages ───────────────────────────────────────────────────────────────────
/// Where the train flow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainStage {
    Resolving,
    Fetching,
    Splitting,
    Fitting,
    Scoring,
    Persisting,
    Done,
}

/// Where the predict and describe flows are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeStage {
    Loading,
    Validating,
    Predicting,
    Describing,
    Done,
}

impl fmt::Display for TrainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for ServeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub(crate) fn enter(flow: &str, stage: impl fmt::Display) {
    tracing::debug!(flow, %stage, "pipeline stage");
}

/// Log `err` as the terminal failure of `stage` and hand it back.
pub(crate) fn failed(flow: &str, stage: impl fmt::Display, err: PipelineError) -> PipelineError {
    tracing::error!(flow, %stage, kind = %err.kind(), "{}", err.detail());
    err
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────
/// Composes a dataset source and an artifact store into the
/// train, predict and describe flows.
pub struct Pipeline {
    pub(crate) config:  PipelineConfig,
    pub(crate) source:  Box<dyn DatasetSource>,
    pub(crate) store:   Arc<dyn ArtifactStore>,
    pub(crate) history: Option<TrainingHistory>,
}

impl Pipeline {
    /// Build a pipeline that also logs each training run beside the artifact.
    pub fn new(
        config: PipelineConfig,
        source: Box<dyn DatasetSource>,
        store:  Arc<dyn ArtifactStore>,
    ) -> Self {
        let history = Some(TrainingHistory::beside(&config.artifact_location));
        Self { config, source, store, history }
    }

    /// Disable the training history log.
    pub fn without_history(mut self) -> Self {
        self.history = None;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn artifact_location(&self) -> &Path {
        &self.config.artifact_location
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }
}
