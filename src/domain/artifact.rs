// ============================================================
// Layer 3 — Model Artifact
// ============================================================
// The unit the ArtifactStore persists: a fitted estimator plus
// the metadata needed to serve it safely.
//
// Feature dimension and class labels are copied out of the
// estimator at build time. On load, `validate` cross-checks
// them against the estimator again; any disagreement means
// the bytes on disk were not produced by this code and the
// artifact is treated as corrupt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::Estimator;
use crate::ml::Classifier;

/// Bumped whenever the persisted layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Training-run facts recorded alongside the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Locator the dataset was fetched from
    pub source:        String,
    /// Accuracy on the held-out test split
    pub accuracy:      f64,
    pub train_samples: usize,
    pub test_samples:  usize,
}

/// A trained estimator with its fit-time metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version:  u32,
    pub estimator:       Classifier,
    pub feature_count:   usize,
    pub class_labels:    Vec<String>,
    pub hyperparameters: serde_json::Value,
    pub created_at:      DateTime<Utc>,
    pub training:        TrainingSummary,
}

impl ModelArtifact {
    /// Package a fitted estimator. Fails with `NotFitted` if it is not.
    pub fn new(estimator: Classifier, training: TrainingSummary) -> PipelineResult<Self> {
        let description = estimator.describe()?;
        Ok(Self {
            format_version:  ARTIFACT_FORMAT_VERSION,
            feature_count:   description.feature_count,
            class_labels:    description.class_labels,
            hyperparameters: description.hyperparameters,
            created_at:      Utc::now(),
            estimator,
            training,
        })
    }

    /// Check that the metadata agrees with the estimator it wraps.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(PipelineError::CorruptArtifact(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let description = self.estimator.describe().map_err(|e| {
            PipelineError::CorruptArtifact(format!("persisted estimator is unusable: {e}"))
        })?;
        self.estimator.check_integrity().map_err(|e| {
            PipelineError::CorruptArtifact(format!("persisted estimator is malformed: {e}"))
        })?;

        if description.feature_count != self.feature_count {
            return Err(PipelineError::CorruptArtifact(format!(
                "metadata says {} features but estimator was fitted on {}",
                self.feature_count, description.feature_count
            )));
        }
        if description.class_labels != self.class_labels {
            return Err(PipelineError::CorruptArtifact(
                "metadata class labels disagree with the estimator".to_string(),
            ));
        }

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::ml::{params::TreeParams, Classifier, DecisionTreeClassifier};

    fn fitted() -> Classifier {
        let mut model = Classifier::DecisionTree(DecisionTreeClassifier::new(TreeParams::default()));
        let x = vec![vec![0.0], vec![0.1], vec![1.0], vec![1.1]];
        let y: Vec<String> = ["a", "a", "b", "b"].iter().map(|s| s.to_string()).collect();
        model.fit(&x, &y).unwrap();
        model
    }

    fn summary() -> TrainingSummary {
        TrainingSummary {
            source:        "memory".into(),
            accuracy:      1.0,
            train_samples: 4,
            test_samples:  0,
        }
    }

    #[test]
    fn test_new_copies_metadata() {
        let artifact = ModelArtifact::new(fitted(), summary()).unwrap();
        assert_eq!(artifact.feature_count, 1);
        assert_eq!(artifact.class_labels, vec!["a".to_string(), "b".to_string()]);
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_unfitted_estimator_is_rejected() {
        let model = Classifier::DecisionTree(DecisionTreeClassifier::new(TreeParams::default()));
        let err   = ModelArtifact::new(model, summary()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFitted);
    }

    #[test]
    fn test_validate_detects_tampered_metadata() {
        let mut artifact = ModelArtifact::new(fitted(), summary()).unwrap();
        artifact.feature_count = 7;
        assert_eq!(artifact.validate().unwrap_err().kind(), ErrorKind::CorruptArtifact);

        let mut artifact = ModelArtifact::new(fitted(), summary()).unwrap();
        artifact.format_version = 99;
        assert_eq!(artifact.validate().unwrap_err().kind(), ErrorKind::CorruptArtifact);
    }
}
