// ============================================================
// Layer 2 — ModelService
// ============================================================
// The request/response surface a transport (HTTP routes, the
// CLI) calls into. Each method takes the decoded JSON request
// body, turns it into a typed request, runs one Pipeline flow
// and wraps the result in an ApiResponse. Errors never escape
// as Rust errors here: they become `{"status":"error",…}`.
//
//   train(body)      → POST /train
//   predict(body)    → POST /predict
//   describe_model() → GET  /info
//   health()         → GET  /health
//   home()           → GET  /
//
// Reference: serde_json documentation (Value)

use std::sync::Arc;

use serde_json::Value;

use crate::api::response::{ApiResponse, Body};
use crate::application::pipeline::{Pipeline, PipelineConfig};
use crate::application::train_use_case::TrainRequest;
use crate::data::loader::LocatorSource;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::infra::artifact_store::FsArtifactStore;
use crate::infra::config::ServiceConfig;

pub const SERVICE_NAME: &str = "Iris Classification API";

/// JSON-in, JSON-out wrapper around a Pipeline.
pub struct ModelService {
    pipeline: Pipeline,
}

impl ModelService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Service over the network/filesystem source and the filesystem store.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(Pipeline::new(
            PipelineConfig::from(config),
            Box::new(LocatorSource::new()),
            Arc::new(FsArtifactStore::new()),
        ))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    // ─── Operations ───────────────────────────────────────────────────────────

    /// Train and persist a model from a `{data_url, test_size, model_params, seed}` body.
    pub fn train(&self, body: &Value) -> ApiResponse {
        let outcome = parse_train_request(body).and_then(|req| self.pipeline.train(&req));
        match outcome {
            Ok(o) => ApiResponse::success(Body::Trained {
                message:           "Model trained successfully".to_string(),
                accuracy:          o.accuracy,
                train_samples:     o.train_samples,
                test_samples:      o.test_samples,
                artifact_location: o.artifact_location,
            }),
            Err(e) => ApiResponse::error(&e),
        }
    }

    /// Predict labels for a list of feature rows (or one flat row).
    pub fn predict(&self, body: &Value) -> ApiResponse {
        match parse_feature_rows(body).and_then(|rows| self.pipeline.predict(&rows)) {
            Ok(predictions) => ApiResponse::success(Body::Predictions { predictions }),
            Err(e) => ApiResponse::error(&e),
        }
    }

    pub fn describe_model(&self) -> ApiResponse {
        match self.pipeline.describe() {
            Ok(description) => ApiResponse::success(Body::Model(description)),
            Err(e) => ApiResponse::error(&e),
        }
    }

    pub fn health(&self) -> ApiResponse {
        ApiResponse::ok(Body::Empty {})
    }

    pub fn home(&self) -> ApiResponse {
        ApiResponse::ok(Body::Home {
            message: SERVICE_NAME.to_string(),
            version: self.pipeline.version().to_string(),
        })
    }
}

// ─── Request parsing ──────────────────────────────────────────────────────────

/// Decode a train body. `null` means every default.
pub fn parse_train_request(body: &Value) -> PipelineResult<TrainRequest> {
    let mut request = TrainRequest::default();

    let fields = match body {
        Value::Null => return Ok(request),
        Value::Object(map) => map,
        other => {
            return Err(PipelineError::InvalidInput(format!(
                "train body must be a JSON object, got {}",
                json_type(other)
            )));
        }
    };

    match fields.get("data_url") {
        None | Some(Value::Null) => {}
        Some(Value::String(url)) => request.locator = url.clone(),
        Some(other) => {
            return Err(PipelineError::InvalidInput(format!(
                "data_url must be a string, got {}",
                json_type(other)
            )));
        }
    }

    match fields.get("test_size") {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) => {
            request.test_fraction = n.as_f64().unwrap_or(f64::NAN);
        }
        Some(Value::String(s)) => {
            request.test_fraction = s.trim().parse().map_err(|_| {
                PipelineError::InvalidInput(format!("test_size '{s}' is not a number"))
            })?;
        }
        Some(other) => {
            return Err(PipelineError::InvalidInput(format!(
                "test_size must be a number, got {}",
                json_type(other)
            )));
        }
    }

    match fields.get("model_params") {
        None | Some(Value::Null) => {}
        Some(params) => request.hyperparameters = Some(params.clone()),
    }

    match fields.get("seed") {
        None | Some(Value::Null) => {}
        Some(v) => {
            request.seed = v.as_u64().ok_or_else(|| {
                PipelineError::InvalidInput(format!("seed must be a non-negative integer, got {v}"))
            })?;
        }
    }

    Ok(request)
}

/// Decode a predict body into feature rows.
///
/// Accepts a list of numeric lists, or a single flat numeric list
/// treated as one sample.
pub fn parse_feature_rows(body: &Value) -> PipelineResult<Vec<Vec<f64>>> {
    let items = match body {
        Value::Null => {
            return Err(PipelineError::EmptyInput("no features provided".to_string()));
        }
        Value::Array(items) => items,
        other => {
            return Err(PipelineError::InvalidInput(format!(
                "expected a list of feature rows, got {}",
                json_type(other)
            )));
        }
    };

    if items.is_empty() {
        return Err(PipelineError::EmptyInput("no features provided".to_string()));
    }

    // A flat list of numbers is one sample
    if items.iter().all(Value::is_number) {
        return Ok(vec![numeric_row(items, 0)?]);
    }

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Array(row) => numeric_row(row, idx),
            other => Err(PipelineError::InvalidInput(format!(
                "row {idx} must be a list of numbers, got {}",
                json_type(other)
            ))),
        })
        .collect()
}

fn numeric_row(values: &[Value], row: usize) -> PipelineResult<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(col, v)| {
            v.as_f64().ok_or_else(|| {
                PipelineError::InvalidInput(format!(
                    "row {row}, column {col}: expected a number, got {}",
                    json_type(v)
                ))
            })
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "a list",
        Value::Object(_) => "an object",
    }
}
