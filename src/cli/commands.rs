// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the five subcommands, one per service operation:
//
//   train   → ModelService::train
//   predict → ModelService::predict
//   info    → ModelService::describe_model
//   health  → ModelService::health
//   home    → ModelService::home
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → f64, u64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::application::train_use_case::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use crate::data::loader::DEFAULT_DATA_URL;
use crate::domain::error::{PipelineError, PipelineResult};

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a dataset, train a model and persist it
    Train(TrainArgs),

    /// Predict labels with the persisted model
    Predict(PredictArgs),

    /// Describe the persisted model
    Info,

    /// Liveness check
    Health,

    /// Service name and version
    Home,
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset URL (http/https) or local file path
    #[arg(long, default_value = DEFAULT_DATA_URL)]
    pub data_url: String,

    /// Fraction of rows held out for scoring, strictly between 0 and 1
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_size: f64,

    /// Hyperparameter overrides as a JSON object,
    /// e.g. '{"algorithm":"random_forest","n_estimators":50}'
    #[arg(long)]
    pub model_params: Option<String>,

    /// Seed for the stratified train/test split
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Require exactly this many feature columns per row
    #[arg(long)]
    pub feature_count: Option<usize>,
}

impl TrainArgs {
    /// The JSON body the train operation expects.
    pub fn to_body(&self) -> PipelineResult<Value> {
        // JSON has no NaN or infinity; serialising one would turn it into null
        if !self.test_size.is_finite() {
            return Err(PipelineError::InvalidParameter(format!(
                "--test-size must lie strictly between 0 and 1, got {}",
                self.test_size
            )));
        }

        let model_params = match &self.model_params {
            None => Value::Null,
            Some(raw) => serde_json::from_str(raw).map_err(|e| {
                PipelineError::InvalidInput(format!("--model-params is not valid JSON: {e}"))
            })?,
        };

        Ok(json!({
            "data_url":     self.data_url,
            "test_size":    self.test_size,
            "model_params": model_params,
            "seed":         self.seed,
        }))
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Feature rows as JSON: '[[5.1,3.5,1.4,0.2]]' or one flat row '[5.1,3.5,1.4,0.2]'
    #[arg(long)]
    pub features: String,
}

impl PredictArgs {
    pub fn to_body(&self) -> PipelineResult<Value> {
        serde_json::from_str(&self.features).map_err(|e| {
            PipelineError::InvalidInput(format!("--features is not valid JSON: {e}"))
        })
    }
}
