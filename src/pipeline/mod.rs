//! The update pipeline: sync source, resolve dependencies, compile.
//!
//! Each [`PipelineStep`] is a list of external commands. Steps run strictly
//! in order and the pipeline stops at the first failing command, reporting
//! the step it belongs to in a [`StepFailure`].
mod runner;
mod update;

pub use runner::{CommandRunner, SystemCommandRunner};
pub use update::UpdatePipeline;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// One independently fallible stage of the update pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    /// Fetch the remote and hard-reset the working copy to it
    Sync,
    /// Bring the dependency manifest in line with the synced source
    ResolveDependencies,
    /// Build the managed executable
    Compile,
}

impl PipelineStep {
    /// All steps in execution order
    pub const ALL: [PipelineStep; 3] = [
        PipelineStep::Sync,
        PipelineStep::ResolveDependencies,
        PipelineStep::Compile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PipelineStep::Sync => "sync",
            PipelineStep::ResolveDependencies => "resolve-dependencies",
            PipelineStep::Compile => "compile",
        }
    }

    /// Progress line logged when the step begins.
    pub fn announcement(self) -> &'static str {
        match self {
            PipelineStep::Sync => "Syncing source with remote...",
            PipelineStep::ResolveDependencies => "Resolving build dependencies...",
            PipelineStep::Compile => "Building server...",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The step at which a pipeline run stopped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Pipeline step '{step}' failed: {reason}")]
pub struct StepFailure {
    pub step: PipelineStep,
    pub reason: String,
}

/// An ordered sequence of fallible update steps.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Run every step in order, stopping at the first failure.
    async fn run(&self) -> Result<(), StepFailure>;
}
