// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the pipeline can produce, one variant per kind.
//
// Collaborators (data source, splitter, estimator, store) all
// return PipelineError directly, so the orchestrator never has
// to translate or downgrade an error on its way to the caller.
// The ErrorKind enum is the stable, machine-readable tag that
// crosses the request/response boundary; the message is for
// humans.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Recoverable Errors with Result)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result alias used by every pipeline component.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stable machine-readable error tag.
///
/// Serialises as the bare variant name, e.g. `"ModelNotTrained"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceUnavailable,
    ParseError,
    InvalidParameter,
    InsufficientClassSamples,
    DimensionMismatch,
    EmptyTrainingSet,
    LabelCardinalityError,
    LengthMismatch,
    NotFitted,
    ArtifactNotFound,
    CorruptArtifact,
    PersistenceError,
    ModelNotTrained,
    InvalidInput,
    EmptyInput,
}

impl ErrorKind {
    /// The taxonomy name, identical to the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::SourceUnavailable        => "SourceUnavailable",
            ErrorKind::ParseError               => "ParseError",
            ErrorKind::InvalidParameter         => "InvalidParameter",
            ErrorKind::InsufficientClassSamples => "InsufficientClassSamples",
            ErrorKind::DimensionMismatch        => "DimensionMismatch",
            ErrorKind::EmptyTrainingSet         => "EmptyTrainingSet",
            ErrorKind::LabelCardinalityError    => "LabelCardinalityError",
            ErrorKind::LengthMismatch           => "LengthMismatch",
            ErrorKind::NotFitted                => "NotFitted",
            ErrorKind::ArtifactNotFound         => "ArtifactNotFound",
            ErrorKind::CorruptArtifact          => "CorruptArtifact",
            ErrorKind::PersistenceError         => "PersistenceError",
            ErrorKind::ModelNotTrained          => "ModelNotTrained",
            ErrorKind::InvalidInput             => "InvalidInput",
            ErrorKind::EmptyInput               => "EmptyInput",
        }
    }

    /// HTTP status code a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::ModelNotTrained | ErrorKind::ArtifactNotFound => 404,

            ErrorKind::InvalidInput
            | ErrorKind::EmptyInput
            | ErrorKind::InvalidParameter
            | ErrorKind::DimensionMismatch
            | ErrorKind::LengthMismatch
            | ErrorKind::ParseError
            | ErrorKind::InsufficientClassSamples
            | ErrorKind::LabelCardinalityError
            | ErrorKind::EmptyTrainingSet => 400,

            ErrorKind::SourceUnavailable => 502,

            ErrorKind::NotFitted
            | ErrorKind::CorruptArtifact
            | ErrorKind::PersistenceError => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical error type for the whole model lifecycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("cannot parse dataset: {0}")]
    ParseError(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient class samples: {0}")]
    InsufficientClassSamples(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("empty training set: {0}")]
    EmptyTrainingSet(String),

    #[error("label cardinality error: {0}")]
    LabelCardinalityError(String),

    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    #[error("estimator is not fitted: {0}")]
    NotFitted(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("corrupt artifact: {0}")]
    CorruptArtifact(String),

    #[error("persistence error: {0}")]
    PersistenceError(String),

    #[error("model not trained: {0}")]
    ModelNotTrained(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty input: {0}")]
    EmptyInput(String),
}

impl PipelineError {
    /// The taxonomy tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::SourceUnavailable(_)        => ErrorKind::SourceUnavailable,
            PipelineError::ParseError(_)               => ErrorKind::ParseError,
            PipelineError::InvalidParameter(_)         => ErrorKind::InvalidParameter,
            PipelineError::InsufficientClassSamples(_) => ErrorKind::InsufficientClassSamples,
            PipelineError::DimensionMismatch(_)        => ErrorKind::DimensionMismatch,
            PipelineError::EmptyTrainingSet(_)         => ErrorKind::EmptyTrainingSet,
            PipelineError::LabelCardinalityError(_)    => ErrorKind::LabelCardinalityError,
            PipelineError::LengthMismatch(_)           => ErrorKind::LengthMismatch,
            PipelineError::NotFitted(_)                => ErrorKind::NotFitted,
            PipelineError::ArtifactNotFound(_)         => ErrorKind::ArtifactNotFound,
            PipelineError::CorruptArtifact(_)          => ErrorKind::CorruptArtifact,
            PipelineError::PersistenceError(_)         => ErrorKind::PersistenceError,
            PipelineError::ModelNotTrained(_)          => ErrorKind::ModelNotTrained,
            PipelineError::InvalidInput(_)             => ErrorKind::InvalidInput,
            PipelineError::EmptyInput(_)               => ErrorKind::EmptyInput,
        }
    }

    /// The human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            PipelineError::SourceUnavailable(m)
            | PipelineError::ParseError(m)
            | PipelineError::InvalidParameter(m)
            | PipelineError::InsufficientClassSamples(m)
            | PipelineError::DimensionMismatch(m)
            | PipelineError::EmptyTrainingSet(m)
            | PipelineError::LabelCardinalityError(m)
            | PipelineError::LengthMismatch(m)
            | PipelineError::NotFitted(m)
            | PipelineError::ArtifactNotFound(m)
            | PipelineError::CorruptArtifact(m)
            | PipelineError::PersistenceError(m)
            | PipelineError::ModelNotTrained(m)
            | PipelineError::InvalidInput(m)
            | PipelineError::EmptyInput(m) => m,
        }
    }
}
