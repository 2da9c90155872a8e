use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tabular_classifier::cli::Cli;

fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only the JSON response
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tabular_classifier=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.run()
}
