// ============================================================
// Layer 2 — Service API
// ============================================================
// The JSON request/response contract on top of the Pipeline.
// A transport layer (not part of this crate) or the CLI calls
// ModelService and forwards `ApiResponse::http_status` plus
// the serialised body.
//
//   service.rs  — ModelService and request body parsing
//   response.rs — ApiResponse, Status, Body

pub mod response;
pub mod service;

pub use response::{ApiResponse, Body, Status};
pub use service::{parse_feature_rows, parse_train_request, ModelService};
