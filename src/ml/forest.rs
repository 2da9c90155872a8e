// ============================================================
// Layer 5 — Random Forest Classifier
// ============================================================
// Bagged ensemble of CART trees (the default estimator).
//
//   fit:
//     1. Validate the training matrix and encode labels as
//        indices into the sorted class list
//     2. Draw one seed per tree from `random_state`
//     3. Grow the trees in parallel with rayon; each tree
//        gets a bootstrap sample and a feature sub-sample
//        driven only by its own seed
//     4. Average the per-tree feature importances
//
//   predict:
//     Average the leaf class distributions of every tree and
//     take the argmax (soft voting).
//
// Because every tree's randomness comes from its own seed,
// the fitted forest is the same no matter how rayon
// schedules the work.
//
// Reference: Breiman (2001) Random Forests
//            rayon crate documentation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::{Estimator, EstimatorDescription};
use crate::ml::params::ForestParams;
use crate::ml::tree::{argmax, CartBuilder, Tree, TreeConfig};
use crate::ml::{check_predict_input, encode_labels};

pub const RANDOM_FOREST_NAME: &str = "RandomForestClassifier";

/// State that only exists after a successful fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedForest {
    pub classes:             Vec<String>,
    pub n_features:          usize,
    pub trees:               Vec<Tree>,
    pub feature_importances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub params: ForestParams,
    fitted:     Option<FittedForest>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self { params, fitted: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Structural check of the fitted state, for artifacts read from disk.
    pub fn check_integrity(&self) -> Result<(), String> {
        let Some(fitted) = &self.fitted else {
            return Ok(());
        };
        if fitted.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if fitted.feature_importances.len() != fitted.n_features {
            return Err("feature importances do not match the feature count".to_string());
        }
        for (i, tree) in fitted.trees.iter().enumerate() {
            tree.validate(fitted.n_features, fitted.classes.len())
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    fn fitted(&self) -> PipelineResult<&FittedForest> {
        self.fitted.as_ref().ok_or_else(|| {
            PipelineError::NotFitted("random forest has not been trained".to_string())
        })
    }
}

impl Estimator for RandomForestClassifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> PipelineResult<()> {
        let (classes, targets) = encode_labels(features, labels)?;
        let n          = features.len();
        let n_features = features[0].len();
        let params     = &self.params;

        let config = TreeConfig {
            max_depth:         params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf:  params.min_samples_leaf,
            max_features:      params.max_features.resolve(n_features),
        };

        let mut master = StdRng::seed_from_u64(params.random_state);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| master.gen()).collect();

        tracing::debug!(
            "Growing {} trees on {} rows x {} features ({} classes)",
            seeds.len(),
            n,
            n_features,
            classes.len()
        );

        let grown: Vec<(Tree, Vec<f64>)> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let sample: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                CartBuilder::new(features, &targets, classes.len(), config).grow(sample, &mut rng)
            })
            .collect();

        let mut feature_importances = vec![0.0; n_features];
        for (_, importances) in &grown {
            for (acc, v) in feature_importances.iter_mut().zip(importances) {
                *acc += v;
            }
        }
        for v in &mut feature_importances {
            *v /= grown.len() as f64;
        }

        self.fitted = Some(FittedForest {
            classes,
            n_features,
            trees: grown.into_iter().map(|(tree, _)| tree).collect(),
            feature_importances,
        });
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> PipelineResult<Vec<String>> {
        let fitted = self.fitted()?;
        check_predict_input(features, fitted.n_features)?;

        let n_trees = fitted.trees.len() as f64;
        let predictions = features
            .iter()
            .map(|x| {
                let mut votes = vec![0.0; fitted.classes.len()];
                for tree in &fitted.trees {
                    for (acc, p) in votes.iter_mut().zip(tree.distribution(x)) {
                        *acc += p / n_trees;
                    }
                }
                fitted.classes[argmax(&votes)].clone()
            })
            .collect();

        Ok(predictions)
    }

    fn describe(&self) -> PipelineResult<EstimatorDescription> {
        let fitted = self.fitted()?;
        Ok(EstimatorDescription {
            algorithm:           RANDOM_FOREST_NAME.to_string(),
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

    fn two_blobs() -> (Vec<Vec<f64>>, Vec<String>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.1;
            x.push(vec![1.0 + jitter, 1.0 - jitter]);
            y.push("low".to_string());
            x.push(vec![5.0 + jitter, 5.0 - jitter]);
            y.push("high".to_string());
        }
        (x, y)
    }

    fn small_forest() -> RandomForestClassifier {
        RandomForestClassifier::new(ForestParams { n_estimators: 15, ..ForestParams::default() })
    }

    #[test]
    fn test_fit_predict_on_training_data() {
        let (x, y) = two_blobs();
        let mut model = small_forest();
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions.len(), x.len());
        assert!(predictions.iter().all(|p| p == "low" || p == "high"));
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_same_seed_gives_same_forest() {
        let (x, y) = two_blobs();
        let mut a = small_forest();
        let mut b = small_forest();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = small_forest();
        let err   = model.predict(&[vec![1.0, 2.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFitted);
        assert_eq!(model.describe().unwrap_err().kind(), ErrorKind::NotFitted);
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let (x, y) = two_blobs();
        let mut model = small_forest();
        model.fit(&x, &y).unwrap();
        let err = model.predict(&[vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
    }

    #[test]
    fn test_describe_reports_metadata() {
        let (x, y) = two_blobs();
        let mut model = small_forest();
        model.fit(&x, &y).unwrap();

        let d = model.describe().unwrap();
        assert_eq!(d.algorithm, RANDOM_FOREST_NAME);
        assert_eq!(d.feature_count, 2);
        assert_eq!(d.class_labels, vec!["high".to_string(), "low".to_string()]);
        assert_eq!(d.hyperparameters["n_estimators"], 15);
        let total: f64 = d.feature_importances.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_length_mismatch() {
        let (x, y) = two_blobs();
        let mut model = small_forest();
        model.fit(&x, &y).unwrap();
        let err = model.score(&x, &y[..3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }
}
