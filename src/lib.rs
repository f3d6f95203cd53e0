/*!
 # Update Runner

 A self-updating supervisor for a server built from source.

 ## Overview

 Update Runner keeps a managed server process alive and up to date:
 - Polls a remote endpoint for the published version
 - On a new version: stops the server, syncs the source tree to the remote
   head, resolves dependencies, rebuilds, records the new version and starts
   the server again
 - Otherwise: restarts the server if it is no longer running

 ## Basic Usage

 ```no_run
 use update_runner::{UpdateRunner, Result};

 #[tokio::main(flavor = "current_thread")]
 async fn main() -> Result<()> {
     let mut runner = UpdateRunner::from_config_file("updater.json")?;

     // One cycle, e.g. from a cron job
     let outcome = runner.run_once().await;
     println!("{:?}", outcome);

     // Or poll forever
     runner.run().await;
     Ok(())
 }
 ```

 ## Configuration

 Every setting is optional; see [`config::Config`] for the keys and their
 defaults.

 ```json
 {
   "remoteVersionUrl": "https://example.com/nas/version.txt",
   "pollIntervalSecs": 600,
   "server": { "command": "./nas-server", "args": [] },
   "pipeline": {
     "sync": [
       { "command": "git", "args": ["fetch", "origin"] },
       { "command": "git", "args": ["reset", "--hard", "origin/main"] }
     ],
     "dependencies": [{ "command": "go", "args": ["mod", "tidy"] }],
     "build": [{ "command": "go", "args": ["build", "-o", "nas-server", "main.go"] }]
   }
 }
 ```

 ## Custom collaborators

 [`controller::UpdateController`] is generic over its version store, version
 source, pipeline and supervisor, so any of them can be swapped out:

 ```no_run
 use async_trait::async_trait;
 use update_runner::config::Config;
 use update_runner::controller::UpdateController;
 use update_runner::pipeline::UpdatePipeline;
 use update_runner::supervisor::ProcessSupervisor;
 use update_runner::version::{FileVersionStore, VersionSource};
 use update_runner::Version;

 struct Pinned;

 #[async_trait]
 impl VersionSource for Pinned {
     async fn fetch(&self) -> Option<Version> {
         Version::parse("2.0.0")
     }
 }

 # async fn example() {
 let config = Config::default();
 let mut controller = UpdateController::new(
     FileVersionStore::from_config(&config),
     Pinned,
     UpdatePipeline::from_config(&config),
     ProcessSupervisor::from_config(&config).recover(),
     config.poll_interval(),
 );
 controller.run_cycle().await;
 # }
 ```
*/

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod supervisor;
pub mod version;

pub use config::Config;
pub use controller::{CycleOutcome, Liveness, UpdateController};
pub use error::{Error, Result};
pub use version::Version;

use pipeline::UpdatePipeline;
use std::path::Path;
use supervisor::ProcessSupervisor;
use version::{FileVersionStore, RemoteVersionFetcher};

/// The controller wired to its production collaborators.
pub type DefaultController =
    UpdateController<FileVersionStore, RemoteVersionFetcher, UpdatePipeline, ProcessSupervisor>;

/// Configure and run the update loop
///
/// This struct is the main entry point: it validates the configuration,
/// builds the production collaborators and drives the controller.
/// All public methods are instrumented with `tracing` spans.
pub struct UpdateRunner {
    /// Configuration
    config: Config,
    /// Control loop over the production collaborators
    controller: DefaultController,
}

impl UpdateRunner {
    /// Create a runner from a configuration file path
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(path), fields(config_path = ?path.as_ref()))]
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        tracing::info!("Loading configuration from file");
        let config = Config::from_file(path)?;
        Self::new(config)
    }

    /// Create a runner from a JSON configuration string
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(config))]
    pub fn from_config_str(config: &str) -> Result<Self> {
        tracing::info!("Loading configuration from string");
        let config = Config::parse_from_str(config)?;
        Self::new(config)
    }

    /// Create a runner from a configuration
    ///
    /// The configuration is validated first. A PID file left by an earlier
    /// run is reconciled before the first cycle.
    #[tracing::instrument(skip(config), fields(url = %config.remote_version_url))]
    pub fn new(config: Config) -> Result<Self> {
        config::validate_config(&config)?;
        tracing::debug!("Configuration is valid");

        let controller = UpdateController::new(
            FileVersionStore::from_config(&config),
            RemoteVersionFetcher::from_config(&config)?,
            UpdatePipeline::from_config(&config),
            ProcessSupervisor::from_config(&config).recover(),
            config.poll_interval(),
        );

        Ok(Self { config, controller })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &DefaultController {
        &self.controller
    }

    /// Run a single update cycle
    pub async fn run_once(&mut self) -> CycleOutcome {
        self.controller.run_cycle().await
    }

    /// Run update cycles until the process is terminated
    pub async fn run(&mut self) {
        tracing::info!(
            interval_secs = self.config.poll_interval_secs,
            "Starting update loop"
        );
        self.controller.run().await
    }
}
