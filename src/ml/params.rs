// ============================================================
// Layer 5 — Hyperparameters
// ============================================================
// Serde-backed hyperparameter structs, one per algorithm.
//
// `#[serde(default)]` means any field missing from a request's
// overrides falls back to the Default impl, so an override
// object is effectively merged onto the defaults.
// `deny_unknown_fields` turns typos ("n_estimator") into a
// clear InvalidParameter instead of silently ignoring them.
//
// Defaults for the forest match what the service has always
// trained with: 100 trees, depth 10, random_state 42.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};

/// Which estimator variant a training request builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    RandomForest,
    DecisionTree,
}

impl Algorithm {
    /// Serialised name, as accepted in the `"algorithm"` override.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::RandomForest => "random_forest",
            Algorithm::DecisionTree => "decision_tree",
        }
    }
}

/// How many features each split may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    Log2,
    All,
}

impl MaxFeatures {
    /// Number of candidate features out of `feature_count` (always ≥ 1).
    pub fn resolve(self, feature_count: usize) -> usize {
        let d = feature_count.max(1);
        let k = match self {
            MaxFeatures::Sqrt => (d as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (d as f64).log2().floor() as usize,
            MaxFeatures::All  => d,
        };
        k.clamp(1, d)
    }
}

// ─── Random Forest ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_estimators:      usize,
    /// Maximum tree depth; `None` grows until leaves are pure
    pub max_depth:         Option<usize>,
    /// A node needs at least this many samples to be split
    pub min_samples_split: usize,
    /// Each child of a split keeps at least this many samples
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeatures,
    /// Draw a bootstrap sample per tree instead of using every row
    pub bootstrap:         bool,
    /// Seed for bootstrap sampling and feature sub-sampling
    pub random_state:      u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators:      100,
            max_depth:         Some(10),
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::Sqrt,
            bootstrap:         true,
            random_state:      42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.n_estimators < 1 {
            return Err(PipelineError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        validate_tree_limits(self.max_depth, self.min_samples_split, self.min_samples_leaf)
    }
}

// ─── Single Decision Tree ─────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeParams {
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    /// Seed for the feature visiting order (affects tie-breaking only)
    pub random_state:      u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            random_state:      42,
        }
    }
}

impl TreeParams {
    pub fn validate(&self) -> PipelineResult<()> {
        validate_tree_limits(self.max_depth, self.min_samples_split, self.min_samples_leaf)
    }
}

fn validate_tree_limits(
    max_depth:         Option<usize>,
    min_samples_split: usize,
    min_samples_leaf:  usize,
) -> PipelineResult<()> {
    if max_depth == Some(0) {
        return Err(PipelineError::InvalidParameter(
            "max_depth must be at least 1 (or null for unlimited)".to_string(),
        ));
    }
    if min_samples_split < 2 {
        return Err(PipelineError::InvalidParameter(
            "min_samples_split must be at least 2".to_string(),
        ));
    }
    if min_samples_leaf < 1 {
        return Err(PipelineError::InvalidParameter(
            "min_samples_leaf must be at least 1".to_string(),
        ));
    }
    Ok(())
}
