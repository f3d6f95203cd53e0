/// Supervision of the managed server process.
///
/// This module owns the lifecycle of the server the runner keeps alive:
/// starting it, stopping it, and probing whether it is still alive. The
/// identity of the running process is persisted in a PID file so a restarted
/// runner can re-acquire control of a server it started earlier.
///
/// # Components
///
/// * `pid_file` - The on-disk identity record
/// * `process` - [`ProcessSupervisor`], the production [`Supervisor`]
/// * `signal` - Termination and liveness primitives of the host OS
///
/// # Examples
///
/// ```no_run
/// use update_runner::config::Config;
/// use update_runner::supervisor::{ProcessSupervisor, Supervisor};
///
/// # async fn example() -> update_runner::Result<()> {
/// let config = Config::default();
/// let mut supervisor = ProcessSupervisor::from_config(&config).recover();
///
/// if !supervisor.is_running().await {
///     let pid = supervisor.start().await?;
///     println!("server started as {}", pid);
/// }
/// # Ok(())
/// # }
/// ```
mod pid_file;
mod process;
mod signal;

pub use pid_file::{PidFile, ProcessId};
pub use process::ProcessSupervisor;

use crate::error::Result;
use async_trait::async_trait;

/// Lifecycle operations on the managed server.
///
/// The identity record is the supervisor's notion of "running": it exists
/// exactly while the supervisor believes a managed process is alive.
#[async_trait]
pub trait Supervisor: Send {
    /// Launch the server and record its identity.
    ///
    /// On failure no identity record is written.
    async fn start(&mut self) -> Result<ProcessId>;

    /// Ask the recorded process to terminate and forget it.
    ///
    /// Failures are logged, never returned. The identity record is removed
    /// whether or not the termination signal could be delivered.
    async fn stop(&mut self);

    /// Whether the recorded process is alive.
    async fn is_running(&mut self) -> bool;
}
