/// The update-and-lifecycle control loop.
///
/// Each cycle compares the local version with the published one. On a
/// mismatch the controller stops the server, runs the update pipeline,
/// records the new version and starts the server again. Otherwise it only
/// makes sure the server is alive, restarting it if it died.
///
/// Cycles never overlap: every collaborator call is awaited before the next
/// one is made, and [`UpdateController::run`] sleeps for the poll interval
/// between cycles.
use crate::pipeline::{Pipeline, StepFailure};
use crate::supervisor::Supervisor;
use crate::version::{Version, VersionSource, VersionStore, display_version};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// State of the server after a cycle that found no update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The server was already running
    Running,
    /// The server was found dead and started again
    Restarted,
    /// The server was found dead and could not be started
    RestartFailed,
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Local and remote versions matched, or the remote version was unavailable.
    UpToDate { liveness: Liveness },
    /// The pipeline completed and the new version was recorded.
    Updated {
        from: Option<Version>,
        to: Version,
        /// Whether the server came back up
        started: bool,
    },
    /// The pipeline failed; the server is left stopped on the old build.
    Aborted { to: Version, failure: StepFailure },
}

/// Drives update cycles over its four collaborators.
pub struct UpdateController<S, F, P, V> {
    store: S,
    source: F,
    pipeline: P,
    supervisor: V,
    poll_interval: Duration,
}

impl<S, F, P, V> UpdateController<S, F, P, V>
where
    S: VersionStore,
    F: VersionSource,
    P: Pipeline,
    V: Supervisor,
{
    pub fn new(store: S, source: F, pipeline: P, supervisor: V, poll_interval: Duration) -> Self {
        Self {
            store,
            source,
            pipeline,
            supervisor,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn supervisor(&self) -> &V {
        &self.supervisor
    }

    /// Run one cycle: compare versions, then update or ensure liveness.
    #[tracing::instrument(skip(self), fields(cycle = %Uuid::new_v4()))]
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        info!("Checking for updates...");

        let local = self.store.read_local().await;
        let remote = self.source.fetch().await;

        match remote {
            Some(remote) if local.as_ref() != Some(&remote) => self.update(local, remote).await,
            _ => self.ensure_running().await,
        }
    }

    /// Run cycles forever, sleeping for the poll interval after each one.
    pub async fn run(&mut self) {
        loop {
            self.run_cycle().await;

            info!("Sleeping for {} seconds...", self.poll_interval.as_secs());
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn ensure_running(&mut self) -> CycleOutcome {
        info!("No update needed.");

        if self.supervisor.is_running().await {
            return CycleOutcome::UpToDate {
                liveness: Liveness::Running,
            };
        }

        info!("Server is not running. Starting it now...");
        let liveness = match self.supervisor.start().await {
            Ok(_) => {
                info!("Server started successfully.");
                Liveness::Restarted
            }
            Err(e) => {
                error!("Failed to start server: {}", e);
                Liveness::RestartFailed
            }
        };

        CycleOutcome::UpToDate { liveness }
    }

    async fn update(&mut self, local: Option<Version>, remote: Version) -> CycleOutcome {
        info!("Update found: {} → {}", display_version(local.as_ref()), remote);

        self.supervisor.stop().await;

        if let Err(failure) = self.pipeline.run().await {
            error!("Update to {} aborted, server left stopped", remote);
            return CycleOutcome::Aborted {
                to: remote,
                failure,
            };
        }

        // on failure the old version stays recorded and the next cycle rebuilds
        if let Err(e) = self.store.write_local(&remote).await {
            error!("{}", e);
        }

        let started = match self.supervisor.start().await {
            Ok(_) => {
                info!("Server updated and running!");
                true
            }
            Err(e) => {
                error!("Failed to start server after update: {}", e);
                false
            }
        };

        CycleOutcome::Updated {
            from: local,
            to: remote,
            started,
        }
    }
}
