// ============================================================
// Layer 5 — Single Decision Tree Classifier
// ============================================================
// One CART tree over the full training set. Mostly useful as a
// fast, fully inspectable alternative to the forest; selected
// with `"algorithm": "decision_tree"` in a training request.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::{Estimator, EstimatorDescription};
use crate::ml::params::TreeParams;
use crate::ml::tree::{argmax, CartBuilder, Tree, TreeConfig};
use crate::ml::{check_predict_input, encode_labels};

pub const DECISION_TREE_NAME: &str = "DecisionTreeClassifier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTree {
    pub classes:             Vec<String>,
    pub n_features:          usize,
    pub tree:                Tree,
    pub feature_importances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    pub params: TreeParams,
    fitted:     Option<FittedTree>,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        Self { params, fitted: None }
    }

    /// Structural check of the fitted state, for artifacts read from disk.
    pub fn check_integrity(&self) -> Result<(), String> {
        match &self.fitted {
            None => Ok(()),
            Some(f) if f.feature_importances.len() != f.n_features => {
                Err("feature importances do not match the feature count".to_string())
            }
            Some(f) => f.tree.validate(f.n_features, f.classes.len()),
        }
    }

    fn fitted(&self) -> PipelineResult<&FittedTree> {
        self.fitted.as_ref().ok_or_else(|| {
            PipelineError::NotFitted("decision tree has not been trained".to_string())
        })
    }
}

impl Estimator for DecisionTreeClassifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> PipelineResult<()> {
        let (classes, targets) = encode_labels(features, labels)?;
        let n_features = features[0].len();

        let config = TreeConfig {
            max_depth:         self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf:  self.params.min_samples_leaf,
            max_features:      n_features,
        };

        let mut rng = StdRng::seed_from_u64(self.params.random_state);
        let (tree, feature_importances) = CartBuilder::new(features, &targets, classes.len(), config)
            .grow((0..features.len()).collect(), &mut rng);

        tracing::debug!("Grew decision tree of depth {} ({} nodes)", tree.depth(), tree.nodes.len());

        self.fitted = Some(FittedTree {
            classes,
            n_features,
            tree,
            feature_importances,
        });
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> PipelineResult<Vec<String>> {
        let fitted = self.fitted()?;
        check_predict_input(features, fitted.n_features)?;

        Ok(features
            .iter()
            .map(|x| fitted.classes[argmax(fitted.tree.distribution(x))].clone())
            .collect())
    }

    fn describe(&self) -> PipelineResult<EstimatorDescription> {
        let fitted = self.fitted()?;
        Ok(EstimatorDescription {
            algorithm:           DECISION_TREE_NAME.to_string(),
            hyperparameters:     serde_json::to_value(&self.params).unwrap_or_default(),
            feature_count:       fitted.n_features,
            class_labels:        fitted.classes.clone(),
            feature_importances: fitted.feature_importances.clone(),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_memorises_training_data() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = labels(&["a", "b", "a", "b"]);
        let mut model = DecisionTreeClassifier::new(TreeParams::default());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_fit_error_taxonomy() {
        let mut model = DecisionTreeClassifier::new(TreeParams::default());

        let err = model.fit(&[], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyTrainingSet);

        let err = model.fit(&[vec![1.0], vec![1.0, 2.0]], &labels(&["a", "b"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);

        let err = model.fit(&[vec![1.0], vec![2.0]], &labels(&["a", "a"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LabelCardinalityError);

        let err = model.fit(&[vec![1.0], vec![2.0]], &labels(&["a"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }

    #[test]
    fn test_refit_replaces_state() {
        let mut model = DecisionTreeClassifier::new(TreeParams::default());
        model.fit(&[vec![0.0], vec![1.0]], &labels(&["a", "b"])).unwrap();
        model.fit(&[vec![0.0, 0.0], vec![1.0, 1.0]], &labels(&["x", "y"])).unwrap();

        let d = model.describe().unwrap();
        assert_eq!(d.feature_count, 2);
        assert_eq!(d.class_labels, labels(&["x", "y"]));
    }
}
