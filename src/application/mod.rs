// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per flow: training a model, predicting with it, or
// describing it.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No JSON request parsing or printing (that's api / cli)
//   - No direct network or file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Pipeline holds the collaborators; each *_use_case.rs file
// adds one flow to it.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The orchestrator and its stage enums
pub mod pipeline;

// Fetch → split → fit → score → persist
pub mod train_use_case;

// Load → validate → predict
pub mod predict_use_case;

// Load → describe
pub mod describe_use_case;

#[cfg(test)]
pub(crate) mod test_support;

pub use describe_use_case::ModelDescription;
pub use pipeline::{Pipeline, PipelineConfig, ServeStage, TrainStage};
pub use train_use_case::{TrainOutcome, TrainRequest, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
