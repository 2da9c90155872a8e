// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that touch the outside world but
// belong to no single business layer:
//
//   artifact_store.rs — FsArtifactStore: atomic JSON artifact
//                       persistence with per-location writer
//                       locks
//
//   history.rs        — Appends one CSV row per training run
//                       beside the artifact
//
//   config.rs         — ServiceConfig (MODEL_PATH, VERSION,
//                       PORT) with defaults
//
// Keeping these here makes the storage backend swappable: the
// application layer only depends on the ArtifactStore trait.
//
// Reference: Rust Book §7 (Modules)

/// Atomic filesystem artifact persistence
pub mod artifact_store;

/// Environment-backed service configuration
pub mod config;

/// Training-run CSV log
pub mod history;

pub use artifact_store::FsArtifactStore;
pub use config::ServiceConfig;
pub use history::{TrainingHistory, TrainingRecord};
