use super::{CommandRunner, Pipeline, PipelineStep, StepFailure, SystemCommandRunner};
use crate::config::{CommandConfig, Config, PipelineConfig};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Sync → resolve dependencies → compile, run through a [`CommandRunner`].
pub struct UpdatePipeline<R = SystemCommandRunner> {
    runner: R,
    working_dir: PathBuf,
    steps: Vec<(PipelineStep, Vec<CommandConfig>)>,
}

impl<R: CommandRunner> UpdatePipeline<R> {
    pub fn new(runner: R, working_dir: impl Into<PathBuf>, commands: &PipelineConfig) -> Self {
        let steps = PipelineStep::ALL
            .into_iter()
            .map(|step| {
                let commands = match step {
                    PipelineStep::Sync => &commands.sync,
                    PipelineStep::ResolveDependencies => &commands.dependencies,
                    PipelineStep::Compile => &commands.build,
                };
                (step, commands.clone())
            })
            .collect();

        Self {
            runner,
            working_dir: working_dir.into(),
            steps,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl UpdatePipeline<SystemCommandRunner> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(SystemCommandRunner, config.working_dir.clone(), &config.pipeline)
    }
}

#[async_trait]
impl<R: CommandRunner> Pipeline for UpdatePipeline<R> {
    #[tracing::instrument(skip(self))]
    async fn run(&self) -> Result<(), StepFailure> {
        for (step, commands) in &self.steps {
            info!("{}", step.announcement());

            for command in commands {
                debug!("Running `{}`", command.display());
                if let Err(e) = self.runner.run(command, &self.working_dir).await {
                    let failure = StepFailure {
                        step: *step,
                        reason: e.to_string(),
                    };
                    error!("{}", failure);
                    return Err(failure);
                }
            }
        }

        Ok(())
    }
}
