use crate::config::CommandConfig;
use crate::error::{Error, Result};
use async_process::Command;
use async_trait::async_trait;
use std::path::Path;

/// Executes one external command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `working_dir`, failing if it cannot be started or
    /// exits unsuccessfully.
    async fn run(&self, command: &CommandConfig, working_dir: &Path) -> Result<()>;
}

/// Runs commands as child processes of the runner.
///
/// Output is inherited, so toolchain progress and errors show up in the
/// runner's own console.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &CommandConfig, working_dir: &Path) -> Result<()> {
        let status = Command::new(&command.command)
            .args(&command.args)
            .envs(&command.env)
            .current_dir(working_dir)
            .status()
            .await
            .map_err(|e| Error::Command(format!("`{}` could not be run: {}", command.display(), e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Command(format!(
                "`{}` exited with {}",
                command.display(),
                status
            )))
        }
    }
}
