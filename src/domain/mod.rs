// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what the system
// works with:
//
//   table.rs    — LabeledTable, Row, Split
//   artifact.rs — ModelArtifact and its training summary
//   traits.rs   — DatasetSource, Estimator, ArtifactStore
//   error.rs    — PipelineError and the ErrorKind taxonomy
//
// No file I/O or network calls live here. Everything in the
// other layers either produces or consumes these types.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod artifact;
pub mod error;
pub mod table;
pub mod traits;

pub use artifact::{ModelArtifact, TrainingSummary, ARTIFACT_FORMAT_VERSION};
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use table::{LabeledTable, Row, Split};
pub use traits::{ArtifactStore, DatasetSource, Estimator, EstimatorDescription};
