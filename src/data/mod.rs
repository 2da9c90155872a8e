// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a data locator and a pair of tables the
// estimator can train and be scored on:
//
//   locator (URL or path)
//       │
//       ▼
//   LocatorSource      → fetches bytes (HTTP or filesystem)
//       │
//       ▼
//   parse_table        → validates the fixed CSV schema
//       │
//       ▼
//   LabeledTable
//       │
//       ▼
//   stratified_split   → seeded, class-preserving train/test
//
// Each step is independently testable and replaceable; the
// application layer only sees the DatasetSource trait and
// the split function.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Fetches and parses headerless CSV datasets
pub mod loader;

/// Seeded stratified train/test splitting
pub mod splitter;

pub use loader::{parse_table, LocatorSource, DEFAULT_DATA_URL};
pub use splitter::stratified_split;
