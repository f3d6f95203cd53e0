use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// An external command: program, arguments and extra environment.
///
/// Used both for the managed server executable and for every command of the
/// update pipeline.
///
/// # Examples
///
/// ```
/// use update_runner::config::CommandConfig;
/// use std::collections::HashMap;
///
/// let build = CommandConfig {
///     command: "go".to_string(),
///     args: vec!["build".to_string(), "-o".to_string(), "nas-server".to_string()],
///     env: HashMap::new(),
/// };
/// assert_eq!(build.display(), "go build -o nas-server");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program to execute. An absolute path, a path relative to the
    /// working directory, or a name found in `PATH`.
    pub command: String,

    /// Command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables added on top of the inherited environment.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl CommandConfig {
    /// Build a command with no extra environment.
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: HashMap::new(),
        }
    }

    /// Human-readable command line, used in log lines and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Commands making up each step of the update pipeline.
///
/// Every step runs its commands in order and fails on the first one that
/// fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bring the working copy to the remote head, discarding local changes.
    pub sync: Vec<CommandConfig>,
    /// Make the dependency manifest consistent with the synced source.
    pub dependencies: Vec<CommandConfig>,
    /// Compile the managed executable.
    pub build: Vec<CommandConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sync: vec![
                CommandConfig::new("git", &["fetch", "origin"]),
                CommandConfig::new("git", &["reset", "--hard", "origin/main"]),
            ],
            dependencies: vec![CommandConfig::new("go", &["mod", "tidy"])],
            build: vec![CommandConfig::new(
                "go",
                &["build", "-o", "nas-server", "main.go"],
            )],
        }
    }
}

/// Main configuration for the Update Runner.
///
/// Every field has a default, so an empty object (or no file at all) gives a
/// working setup for a Go server checked out in the current directory.
///
/// # JSON Schema
///
/// ```json
/// {
///   "remoteVersionUrl": "https://example.com/version.txt",
///   "fetchTimeoutSecs": 10,
///   "pollIntervalSecs": 600,
///   "stopGraceSecs": 5,
///   "workingDir": ".",
///   "envFile": ".env",
///   "versionKey": "APP_VERSION",
///   "versionMarker": "version.txt",
///   "pidFile": "server.pid",
///   "logFile": "updater.log",
///   "server": { "command": "./nas-server", "args": [] },
///   "pipeline": {
///     "sync": [{ "command": "git", "args": ["fetch", "origin"] }],
///     "dependencies": [{ "command": "go", "args": ["mod", "tidy"] }],
///     "build": [{ "command": "go", "args": ["build", "-o", "nas-server", "main.go"] }]
///   }
/// }
/// ```
///
/// # Examples
///
/// ```
/// use update_runner::config::Config;
///
/// let config = Config::parse_from_str(r#"{ "pollIntervalSecs": 60 }"#).unwrap();
/// assert_eq!(config.poll_interval_secs, 60);
/// assert_eq!(config.version_key, "APP_VERSION");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// URL returning the published version as plain text.
    pub remote_version_url: String,
    /// Timeout for the remote version request, in seconds.
    pub fetch_timeout_secs: u64,
    /// Pause between the end of one cycle and the start of the next, in seconds.
    pub poll_interval_secs: u64,
    /// How long `stop` waits for a process it spawned to exit after SIGTERM.
    pub stop_grace_secs: u64,
    /// Directory the pipeline and the server run in; relative paths below
    /// resolve against it.
    pub working_dir: PathBuf,
    /// Key-value file holding the local version.
    pub env_file: PathBuf,
    /// Key under which the version is stored in `env_file`.
    pub version_key: String,
    /// Plain-text file mirroring the local version.
    pub version_marker: PathBuf,
    /// Identity record of the managed process.
    pub pid_file: PathBuf,
    /// Append-only event log.
    pub log_file: PathBuf,
    /// Managed server executable.
    pub server: CommandConfig,
    /// Update pipeline commands.
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_version_url:
                "https://raw.githubusercontent.com/raunaksingh9800/go_update_sys/main/version.txt"
                    .to_string(),
            fetch_timeout_secs: 10,
            poll_interval_secs: 600,
            stop_grace_secs: 5,
            working_dir: PathBuf::from("."),
            env_file: PathBuf::from(".env"),
            version_key: "APP_VERSION".to_string(),
            version_marker: PathBuf::from("version.txt"),
            pid_file: PathBuf::from("server.pid"),
            log_file: PathBuf::from("updater.log"),
            server: CommandConfig::new("./nas-server", &[]),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else
    /// as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The contents are not valid JSON/YAML
    /// * The document does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| Error::ConfigParse(format!("Failed to parse YAML config: {}", e))),
            _ => Self::parse_from_str(&content),
        }
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or does not conform
    /// to the expected schema.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }

    /// Resolve a configured path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }
}
