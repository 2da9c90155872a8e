//! Train, persist and serve a tabular classification model.
//!
//! The crate is layered the same way top to bottom:
//!
//! | Layer | Module        | Role                                          |
//! |-------|---------------|-----------------------------------------------|
//! | 1     | `cli`         | clap front end over the service API           |
//! | 2     | `api`         | JSON request/response contract                |
//! | 2     | `application` | `Pipeline` and the train/predict/describe flows |
//! | 3     | `domain`      | tables, artifacts, traits, error taxonomy     |
//! | 4     | `data`        | dataset fetch/parse and stratified splitting  |
//! | 5     | `ml`          | CART trees, random forest, hyperparameters    |
//! | 6     | `infra`       | artifact store, training history, config      |
//!
//! ```no_run
//! use tabular_classifier::api::ModelService;
//! use tabular_classifier::infra::ServiceConfig;
//!
//! let service = ModelService::from_config(&ServiceConfig::from_env());
//! let trained = service.train(&serde_json::Value::Null);
//! println!("{}", trained.to_json());
//! ```

pub mod api;
pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
