// ============================================================
// Layer 2 — API Response Bodies
// ============================================================
// Every service call answers with one ApiResponse. Serialised,
// it is a flat JSON object: the status flag plus the fields of
// whichever body applies.
//
//   {"status":"success","predictions":["Iris-setosa"]}
//   {"status":"error","kind":"ModelNotTrained","message":"…"}
//   {"status":"ok"}
//
// `http_status` tells a transport which status code to send;
// the body never carries internal state beyond the error's
// kind and message.

use std::path::PathBuf;

use serde::Serialize;

use crate::application::describe_use_case::ModelDescription;
use crate::domain::error::{ErrorKind, PipelineError};

/// Outcome flag at the top of every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Liveness and root responses
    Ok,
    /// A train / predict / describe call that worked
    Success,
    Error,
}

/// Operation-specific fields, flattened next to `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Trained {
        message:           String,
        accuracy:          f64,
        train_samples:     usize,
        test_samples:      usize,
        artifact_location: PathBuf,
    },
    Predictions {
        predictions: Vec<String>,
    },
    Model(ModelDescription),
    Home {
        message: String,
        version: String,
    },
    Error {
        kind:    ErrorKind,
        message: String,
    },
    Empty {},
}

/// A complete service response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: Status,
    #[serde(flatten)]
    pub body:   Body,
}

impl ApiResponse {
    pub fn success(body: Body) -> Self {
        Self { status: Status::Success, body }
    }

    pub fn ok(body: Body) -> Self {
        Self { status: Status::Ok, body }
    }

    pub fn error(err: &PipelineError) -> Self {
        Self {
            status: Status::Error,
            body:   Body::Error {
                kind:    err.kind(),
                message: err.detail().to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// The error kind, if this is an error response.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.body {
            Body::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// HTTP status code a transport should answer with.
    pub fn http_status(&self) -> u16 {
        self.error_kind().map_or(200, ErrorKind::http_status)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "status": "error", "message": format!("unserialisable response: {e}") })
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_is_flat() {
        let resp = ApiResponse::error(&PipelineError::ModelNotTrained("train first".into()));
        assert_eq!(
            resp.to_json(),
            json!({ "status": "error", "kind": "ModelNotTrained", "message": "train first" })
        );
        assert_eq!(resp.http_status(), 404);
    }

    #[test]
    fn test_health_body_is_status_only() {
        let resp = ApiResponse::ok(Body::Empty {});
        assert_eq!(resp.to_json(), json!({ "status": "ok" }));
        assert_eq!(resp.http_status(), 200);
    }

    #[test]
    fn test_status_codes_follow_kind() {
        let cases = [
            (PipelineError::InvalidInput("x".into()), 400),
            (PipelineError::SourceUnavailable("x".into()), 502),
            (PipelineError::CorruptArtifact("x".into()), 500),
            (PipelineError::ArtifactNotFound("x".into()), 404),
        ];
        for (err, code) in cases {
            assert_eq!(ApiResponse::error(&err).http_status(), code);
        }
    }

    #[test]
    fn test_predictions_body() {
        let resp = ApiResponse::success(Body::Predictions { predictions: vec!["a".into()] });
        assert_eq!(resp.to_json(), json!({ "status": "success", "predictions": ["a"] }));
        assert!(!resp.is_error());
    }
}
