// ============================================================
// Layer 5 — ML / Estimator Layer
// ============================================================
// Everything algorithm-specific lives here. The rest of the
// system only sees the Estimator trait and the Classifier enum.
//
//   params.rs        — serde hyperparameter structs + defaults
//   tree.rs          — CART tree builder shared by both models
//   forest.rs        — RandomForestClassifier (default)
//   decision_tree.rs — DecisionTreeClassifier
//
// Classifier is a closed enum rather than a boxed trait object
// so that a fitted model can be serialised into an artifact
// and read back without a type registry. It implements
// Estimator by delegating to the wrapped variant.
//
// Reference: Rust Book §17 (Trait Objects vs Enums)

pub mod decision_tree;
pub mod forest;
pub mod params;
pub mod tree;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::{Estimator, EstimatorDescription};

pub use decision_tree::DecisionTreeClassifier;
pub use forest::RandomForestClassifier;
pub use params::{Algorithm, ForestParams, MaxFeatures, TreeParams};

// ─── Classifier ───────────────────────────────────────────────────────────────
/// Every supported estimator, tagged by algorithm when serialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForestClassifier),
    DecisionTree(DecisionTreeClassifier),
}

impl Classifier {
    /// Build an unfitted estimator from request overrides.
    ///
    /// `overrides` is `None`/`null` for all defaults, or a JSON object
    /// whose keys replace individual defaults. The optional
    /// `"algorithm"` key picks the variant.
    pub fn from_overrides(overrides: Option<&Value>) -> PipelineResult<Self> {
        let mut fields = match overrides {
            None | Some(Value::Null) => serde_json::Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(PipelineError::InvalidParameter(format!(
                    "hyperparameters must be a JSON object, got {other}"
                )));
            }
        };

        let algorithm = match fields.remove("algorithm") {
            None | Some(Value::Null) => Algorithm::default(),
            Some(v) => serde_json::from_value::<Algorithm>(v).map_err(|e| {
                PipelineError::InvalidParameter(format!("unknown algorithm: {e}"))
            })?,
        };

        let rest = Value::Object(fields);
        let classifier = match algorithm {
            Algorithm::RandomForest => {
                let params: ForestParams = serde_json::from_value(rest).map_err(|e| {
                    PipelineError::InvalidParameter(format!("random forest hyperparameters: {e}"))
                })?;
                params.validate()?;
                Classifier::RandomForest(RandomForestClassifier::new(params))
            }
            Algorithm::DecisionTree => {
                let params: TreeParams = serde_json::from_value(rest).map_err(|e| {
                    PipelineError::InvalidParameter(format!("decision tree hyperparameters: {e}"))
                })?;
                params.validate()?;
                Classifier::DecisionTree(DecisionTreeClassifier::new(params))
            }
        };

        Ok(classifier)
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Classifier::RandomForest(_) => Algorithm::RandomForest,
            Classifier::DecisionTree(_) => Algorithm::DecisionTree,
        }
    }

    /// Check that the fitted trees are walkable for the recorded
    /// feature count and class list.
    pub fn check_integrity(&self) -> Result<(), String> {
        match self {
            Classifier::RandomForest(m) => m.check_integrity(),
            Classifier::DecisionTree(m) => m.check_integrity(),
        }
    }

    fn inner(&self) -> &dyn Estimator {
        match self {
            Classifier::RandomForest(m) => m,
            Classifier::DecisionTree(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Estimator {
        match self {
            Classifier::RandomForest(m) => m,
            Classifier::DecisionTree(m) => m,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::RandomForest(RandomForestClassifier::new(ForestParams::default()))
    }
}

impl Estimator for Classifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> PipelineResult<()> {
        self.inner_mut().fit(features, labels)
    }

    fn predict(&self, features: &[Vec<f64>]) -> PipelineResult<Vec<String>> {
        self.inner().predict(features)
    }

    fn score(&self, features: &[Vec<f64>], labels: &[String]) -> PipelineResult<f64> {
        self.inner().score(features, labels)
    }

    fn describe(&self) -> PipelineResult<EstimatorDescription> {
        self.inner().describe()
    }
}

// ─── Shared input checks ──────────────────────────────────────────────────────

/// Validate a training matrix and map labels to sorted class indices.
///
/// Returns `(classes, targets)` where `classes` is sorted and
/// `targets[i]` indexes into it.
pub(crate) fn encode_labels(
    features: &[Vec<f64>],
    labels:   &[String],
) -> PipelineResult<(Vec<String>, Vec<usize>)> {
    if features.is_empty() {
        return Err(PipelineError::EmptyTrainingSet(
            "cannot fit on zero rows".to_string(),
        ));
    }
    if features.len() != labels.len() {
        return Err(PipelineError::LengthMismatch(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }

    let dimension = features[0].len();
    if dimension == 0 {
        return Err(PipelineError::DimensionMismatch(
            "feature vectors must have at least one feature".to_string(),
        ));
    }
    if let Some((idx, row)) = features.iter().enumerate().find(|(_, r)| r.len() != dimension) {
        return Err(PipelineError::DimensionMismatch(format!(
            "row {} has {} features, expected {}",
            idx, row.len(), dimension
        )));
    }

    let classes: Vec<String> = labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if classes.len() < 2 {
        return Err(PipelineError::LabelCardinalityError(format!(
            "need at least 2 distinct labels, found {}",
            classes.len()
        )));
    }

    let targets = labels
        .iter()
        .map(|l| classes.binary_search(l).unwrap_or_default())
        .collect();

    Ok((classes, targets))
}

/// Every row of a prediction batch must match the fitted dimension.
pub(crate) fn check_predict_input(features: &[Vec<f64>], dimension: usize) -> PipelineResult<()> {
    match features.iter().enumerate().find(|(_, r)| r.len() != dimension) {
        Some((idx, row)) => Err(PipelineError::DimensionMismatch(format!(
            "row {} has {} features, model expects {}",
            idx, row.len(), dimension
        ))),
        None => Ok(()),
    }
}
