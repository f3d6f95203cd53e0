use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use update_runner::config::{CommandConfig, PipelineConfig};
use update_runner::error::{Error, Result};
use update_runner::pipeline::{
    CommandRunner, Pipeline, PipelineStep, SystemCommandRunner, UpdatePipeline,
};

// Records every command line and fails the one named in `fail_on`.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    fn failing_on(command_line: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(command_line.to_string()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandConfig, _working_dir: &Path) -> Result<()> {
        let line = command.display();
        self.calls.lock().unwrap().push(line.clone());

        if self.fail_on.as_deref() == Some(line.as_str()) {
            Err(Error::Command(format!("`{}` exited with exit status: 1", line)))
        } else {
            Ok(())
        }
    }
}

fn pipeline(runner: RecordingRunner) -> UpdatePipeline<RecordingRunner> {
    UpdatePipeline::new(runner, ".", &PipelineConfig::default())
}

#[tokio::test]
async fn test_runs_every_step_in_order() {
    let pipeline = pipeline(RecordingRunner::default());

    assert!(pipeline.run().await.is_ok());
    assert_eq!(
        pipeline.runner().calls(),
        vec![
            "git fetch origin",
            "git reset --hard origin/main",
            "go mod tidy",
            "go build -o nas-server main.go",
        ]
    );
}

#[tokio::test]
async fn test_dependency_failure_skips_compile() {
    let pipeline = pipeline(RecordingRunner::failing_on("go mod tidy"));

    let failure = pipeline.run().await.unwrap_err();

    assert_eq!(failure.step, PipelineStep::ResolveDependencies);
    assert!(failure.reason.contains("go mod tidy"));
    assert_eq!(
        pipeline.runner().calls(),
        vec!["git fetch origin", "git reset --hard origin/main", "go mod tidy"]
    );
}

#[tokio::test]
async fn test_sync_failure_stops_at_first_command() {
    let pipeline = pipeline(RecordingRunner::failing_on("git fetch origin"));

    let failure = pipeline.run().await.unwrap_err();

    assert_eq!(failure.step, PipelineStep::Sync);
    assert_eq!(pipeline.runner().calls(), vec!["git fetch origin"]);
}

#[tokio::test]
async fn test_compile_failure_is_reported_as_compile() {
    let pipeline = pipeline(RecordingRunner::failing_on("go build -o nas-server main.go"));

    let failure = pipeline.run().await.unwrap_err();

    assert_eq!(failure.step, PipelineStep::Compile);
    assert_eq!(pipeline.runner().calls().len(), 4);
    assert_eq!(
        failure.to_string(),
        "Pipeline step 'compile' failed: Command failed: `go build -o nas-server main.go` exited with exit status: 1"
    );
}

#[tokio::test]
async fn test_custom_steps_with_multiple_commands() {
    let commands = PipelineConfig {
        sync: vec![CommandConfig::new("git", &["pull", "--ff-only"])],
        dependencies: vec![
            CommandConfig::new("npm", &["ci"]),
            CommandConfig::new("npm", &["audit", "fix"]),
        ],
        build: vec![CommandConfig::new("npm", &["run", "build"])],
    };
    let pipeline = UpdatePipeline::new(RecordingRunner::failing_on("npm audit fix"), ".", &commands);

    let failure = pipeline.run().await.unwrap_err();

    assert_eq!(failure.step, PipelineStep::ResolveDependencies);
    assert_eq!(
        pipeline.runner().calls(),
        vec!["git pull --ff-only", "npm ci", "npm audit fix"]
    );
}

#[cfg(unix)]
mod system {
    use super::*;

    fn sh(script: &str) -> CommandConfig {
        CommandConfig::new("sh", &["-c", script])
    }

    #[tokio::test]
    async fn test_system_runner_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();

        assert!(SystemCommandRunner.run(&sh("exit 0"), dir.path()).await.is_ok());

        let err = SystemCommandRunner
            .run(&sh("exit 3"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Command(_)));
        assert!(err.to_string().contains("sh -c exit 3"));
    }

    #[tokio::test]
    async fn test_system_runner_reports_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let missing = CommandConfig::new("/nonexistent/toolchain/go", &["build"]);

        let err = SystemCommandRunner.run(&missing, dir.path()).await.unwrap_err();

        assert!(err.to_string().contains("could not be run"));
    }

    #[tokio::test]
    async fn test_system_runner_uses_working_dir_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let mut command = sh("test \"$BUILD_TAG\" = nas && touch built");
        command.env.insert("BUILD_TAG".to_string(), "nas".to_string());

        SystemCommandRunner.run(&command, dir.path()).await.unwrap();

        assert!(dir.path().join("built").exists());
    }

    #[tokio::test]
    async fn test_real_pipeline_aborts_before_compile() {
        let dir = tempfile::tempdir().unwrap();
        let commands = PipelineConfig {
            sync: vec![sh("echo synced > synced.txt")],
            dependencies: vec![sh("exit 1")],
            build: vec![sh("echo built > nas-server")],
        };
        let pipeline = UpdatePipeline::new(SystemCommandRunner, dir.path(), &commands);

        let failure = pipeline.run().await.unwrap_err();

        assert_eq!(failure.step, PipelineStep::ResolveDependencies);
        assert!(dir.path().join("synced.txt").exists());
        assert!(!dir.path().join("nas-server").exists());
    }
}
