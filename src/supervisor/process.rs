// src/supervisor/process.rs
use super::{PidFile, ProcessId, Supervisor, signal};
use crate::config::{CommandConfig, Config};
use crate::error::{Error, Result};
use async_process::{Child, Command, Stdio};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Supervisor for a single managed server process.
///
/// Holds the child handle of the process it spawned itself, next to the
/// on-disk PID file. The PID file survives a restart of the runner and is
/// reconciled by [`ProcessSupervisor::recover`]; the child handle lets the
/// supervisor reap its own process and notice when it has exited.
pub struct ProcessSupervisor {
    /// Server executable, arguments and environment
    server: CommandConfig,
    /// Working directory of the server
    working_dir: PathBuf,
    /// Identity record
    pid_file: PidFile,
    /// How long to wait for an owned child to exit after SIGTERM
    stop_grace: Duration,
    /// Child process spawned by this supervisor, if any
    child: Option<Child>,
}

impl ProcessSupervisor {
    /// Create a supervisor. Nothing is started and the PID file is not read.
    pub fn new(
        server: CommandConfig,
        working_dir: impl Into<PathBuf>,
        pid_file: PidFile,
        stop_grace: Duration,
    ) -> Self {
        Self {
            server,
            working_dir: working_dir.into(),
            pid_file,
            stop_grace,
            child: None,
        }
    }

    /// Create a supervisor from configuration.
    ///
    /// A relative executable path such as `./nas-server` is resolved against
    /// the working directory; bare names are left to `PATH` lookup.
    pub fn from_config(config: &Config) -> Self {
        let mut server = config.server.clone();
        let program = Path::new(&server.command);
        if program.is_relative() && program.components().count() > 1 {
            server.command = config.resolve(program).to_string_lossy().into_owned();
        }

        Self::new(
            server,
            config.working_dir.clone(),
            PidFile::new(config.resolve(&config.pid_file)),
            config.stop_grace(),
        )
    }

    /// Reconcile a PID file left behind by an earlier run.
    ///
    /// The record is kept if the process it names is alive, so control is
    /// re-acquired, and removed as stale otherwise.
    pub fn recover(self) -> Self {
        match self.pid_file.read() {
            Ok(Some(pid)) if signal::probe(pid) => {
                info!("Re-acquired server process with PID {}", pid);
            }
            Ok(Some(pid)) => {
                info!("Removing stale PID file (PID {} not running)", pid);
                self.forget_record();
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Removing unusable PID file: {}", e);
                self.forget_record();
            }
        }
        self
    }

    pub fn pid_file(&self) -> &PidFile {
        &self.pid_file
    }

    fn forget_record(&self) {
        if let Err(e) = self.pid_file.remove() {
            warn!(
                "Failed to remove PID file {}: {}",
                self.pid_file.path().display(),
                e
            );
        }
    }

    /// Wait for an owned child to exit after it was asked to terminate.
    async fn reap(&mut self, pid: ProcessId) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if child.id() != pid.get() {
            return;
        }

        match tokio::time::timeout(self.stop_grace, child.status()).await {
            Ok(Ok(status)) => debug!("Server process {} exited with {}", pid, status),
            Ok(Err(e)) => warn!("Failed to wait for server process {}: {}", pid, e),
            Err(_) => warn!(
                "Server process {} still running {}s after SIGTERM",
                pid,
                self.stop_grace.as_secs()
            ),
        }
    }
}

#[async_trait]
impl Supervisor for ProcessSupervisor {
    #[tracing::instrument(skip(self))]
    async fn start(&mut self) -> Result<ProcessId> {
        info!("Starting server...");

        let mut command = Command::new(&self.server.command);
        command
            .args(&self.server.args)
            .envs(&self.server.env)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());

        let mut child = command.spawn().map_err(|e| {
            Error::Process(format!("Failed to start {}: {}", self.server.display(), e))
        })?;

        let Some(pid) = ProcessId::new(child.id()) else {
            if let Err(e) = child.kill() {
                warn!("Failed to kill unidentified server process: {}", e);
            }
            return Err(Error::Process("Spawned process has no PID".to_string()));
        };

        if let Err(e) = self.pid_file.write(pid) {
            // an unrecorded server could never be stopped by a later run
            if let Err(kill_err) = child.kill() {
                warn!("Failed to kill unrecorded server process {}: {}", pid, kill_err);
            }
            if let Err(wait_err) = child.status().await {
                warn!("Failed to wait for server process {}: {}", pid, wait_err);
            }
            return Err(e);
        }

        info!("Server started with PID {}", pid);
        self.child = Some(child);
        Ok(pid)
    }

    #[tracing::instrument(skip(self))]
    async fn stop(&mut self) {
        let pid = match self.pid_file.read() {
            Ok(Some(pid)) => pid,
            Ok(None) => {
                info!("No PID file found. Server may not be running.");
                return;
            }
            Err(e) => {
                warn!("Failed to stop server: {}", e);
                self.forget_record();
                return;
            }
        };

        match signal::terminate(pid) {
            Ok(()) => {
                info!("Successfully sent SIGTERM to server process with PID: {}", pid);
                self.reap(pid).await;
            }
            Err(e) => warn!("Failed to stop server: {}", e),
        }

        self.forget_record();
    }

    async fn is_running(&mut self) -> bool {
        let pid = match self.pid_file.read() {
            Ok(Some(pid)) => pid,
            Ok(None) => return false,
            Err(e) => {
                debug!("Treating server as not running: {}", e);
                return false;
            }
        };

        if let Some(child) = self.child.as_mut()
            && child.id() == pid.get()
        {
            match child.try_status() {
                Ok(Some(status)) => {
                    info!("Server process {} exited with {}", pid, status);
                    self.child = None;
                    return false;
                }
                Ok(None) => return true,
                Err(e) => debug!("Failed to poll server process {}: {}", pid, e),
            }
        }

        signal::probe(pid)
    }
}
