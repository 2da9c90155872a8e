// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to the service API.
//
// Global flags (each also readable from the environment):
//   --model-path       MODEL_PATH  where the artifact lives
//   --service-version  VERSION     version tag for info/home
//   --port             PORT        port a transport would bind
//
// Every subcommand prints the JSON response body on stdout.
// The process exits 0 on a success/ok response, 1 on an error
// response. Logs go to stderr so stdout stays parseable.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

use crate::api::{ApiResponse, ModelService};
use crate::application::pipeline::{Pipeline, PipelineConfig};
use crate::data::loader::LocatorSource;
use crate::infra::artifact_store::FsArtifactStore;
use crate::infra::config::{parse_port, ServiceConfig, DEFAULT_MODEL_PATH, DEFAULT_PORT, DEFAULT_VERSION};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "tabular-classifier",
    version,
    about = "Train, persist and serve a tabular classification model."
)]
pub struct Cli {
    /// Location of the persisted model artifact
    #[arg(long, global = true, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Version tag reported by `info` and `home`
    #[arg(long, global = true, env = "VERSION", default_value = DEFAULT_VERSION)]
    pub service_version: String,

    /// Port an HTTP transport would listen on (unparsable values fall back to 5000)
    #[arg(long, global = true, env = "PORT")]
    pub port: Option<String>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl From<&Cli> for ServiceConfig {
    fn from(cli: &Cli) -> Self {
        ServiceConfig {
            artifact_location: cli.model_path.clone(),
            version:           cli.service_version.clone(),
            port:              cli.port.as_deref().map_or(DEFAULT_PORT, parse_port),
        }
    }
}

impl Cli {
    /// Match on the subcommand, dispatch to the service and print the response.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<ExitCode> {
        let config = ServiceConfig::from(&self);
        tracing::debug!(
            "Config: model_path={} version={} port={}",
            config.artifact_location.display(),
            config.version,
            config.port
        );

        let response = match &self.command {
            Commands::Train(args)   => Self::run_train(&config, args),
            Commands::Predict(args) => Self::run_predict(&config, args),
            Commands::Info          => ModelService::from_config(&config).describe_model(),
            Commands::Health        => ModelService::from_config(&config).health(),
            Commands::Home          => ModelService::from_config(&config).home(),
        };

        println!("{}", serde_json::to_string_pretty(&response.to_json())?);

        Ok(if response.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
    }

    /// Handles the `train` subcommand.
    /// Builds a source that enforces --feature-count when given.
    fn run_train(config: &ServiceConfig, args: &TrainArgs) -> ApiResponse {
        let body = match args.to_body() {
            Ok(body) => body,
            Err(e) => return ApiResponse::error(&e),
        };

        let source = match args.feature_count {
            Some(n) => LocatorSource::new().with_expected_features(n),
            None    => LocatorSource::new(),
        };
        let service = ModelService::new(Pipeline::new(
            PipelineConfig::from(config),
            Box::new(source),
            Arc::new(FsArtifactStore::new()),
        ));

        tracing::info!("Starting training on data from: {}", args.data_url);
        service.train(&body)
    }

    /// Handles the `predict` subcommand.
    fn run_predict(config: &ServiceConfig, args: &PredictArgs) -> ApiResponse {
        match args.to_body() {
            Ok(body) => ModelService::from_config(config).predict(&body),
            Err(e)   => ApiResponse::error(&e),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tabular-classifier",
            "predict",
            "--features",
            "[1,2,3,4]",
            "--model-path",
            "/tmp/m.json",
            "--port",
            "8080",
        ])
        .unwrap();

        let config = ServiceConfig::from(&cli);
        assert_eq!(config.artifact_location, PathBuf::from("/tmp/m.json"));
        assert_eq!(config.port, 8080);
        assert!(matches!(cli.command, Commands::Predict(ref a) if a.features == "[1,2,3,4]"));
    }

    #[test]
    fn test_unparsable_port_falls_back_like_from_env() {
        let cli = Cli::try_parse_from(["tabular-classifier", "health", "--port", "eighty"]).unwrap();
        assert_eq!(ServiceConfig::from(&cli).port, DEFAULT_PORT);

        let env = ServiceConfig::from_lookup(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert_eq!(ServiceConfig::from(&cli).port, env.port);
    }

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["tabular-classifier", "train"]).unwrap();
        match cli.command {
            Commands::Train(args) => {
                assert_eq!(args.test_size, 0.2);
                assert_eq!(args.seed, 42);
                assert!(args.model_params.is_none());
                assert!(args.feature_count.is_none());
            }
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_info_on_empty_dir_is_error_response() {
        let dir    = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            artifact_location: dir.path().join("model.json"),
            ..ServiceConfig::default()
        };
        let resp = ModelService::from_config(&config).describe_model();
        assert!(resp.is_error());
    }
}
