use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use update_runner::config::{Config, validate_config};
use update_runner::{CycleOutcome, UpdateRunner, logging};

/// Keep a server built from source running and up to date.
#[derive(Debug, Parser)]
#[command(name = "update-runner", version, about)]
struct Cli {
    /// Configuration file (JSON, or YAML with a .yaml/.yml extension).
    /// Built-in defaults are used when omitted.
    #[arg(short, long, env = "UPDATE_RUNNER_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single update cycle and exit
    #[arg(long)]
    once: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if cli.check_config {
        validate_config(&config)?;
        println!("Configuration is valid");
        return Ok(());
    }

    logging::init(&config.resolve(&config.log_file)).context("initializing logging")?;

    let mut runner = UpdateRunner::new(config)?;

    if cli.once {
        let outcome = runner.run_once().await;
        tracing::info!(?outcome, "Cycle finished");
        if matches!(outcome, CycleOutcome::Aborted { .. }) {
            std::process::exit(1);
        }
        return Ok(());
    }

    tokio::select! {
        _ = runner.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for Ctrl-C")?;
            tracing::info!("Interrupted, shutting down update loop");
        }
    }

    Ok(())
}
