use std::path::PathBuf;
use update_runner::config::{CommandConfig, Config, validate_config};
use update_runner::error::{Error, Result};
use update_runner::UpdateRunner;

#[test]
fn test_parse_config() -> Result<()> {
    let config_str = r#"{
        "remoteVersionUrl": "https://example.com/nas/version.txt",
        "pollIntervalSecs": 60,
        "workingDir": "/srv/nas",
        "versionKey": "NAS_VERSION",
        "server": {
            "command": "./nas-server",
            "args": ["--port", "9000"],
            "env": { "GIN_MODE": "release" }
        },
        "pipeline": {
            "build": [
                { "command": "go", "args": ["build", "-o", "nas-server", "."] }
            ]
        }
    }"#;

    let config = Config::parse_from_str(config_str)?;

    assert_eq!(config.remote_version_url, "https://example.com/nas/version.txt");
    assert_eq!(config.poll_interval_secs, 60);
    assert_eq!(config.fetch_timeout_secs, 10);
    assert_eq!(config.version_key, "NAS_VERSION");
    assert_eq!(config.server.args, vec!["--port", "9000"]);
    assert_eq!(config.server.env.get("GIN_MODE"), Some(&"release".to_string()));
    assert_eq!(config.pipeline.build[0].display(), "go build -o nas-server .");
    // steps that are not overridden keep their defaults
    assert_eq!(config.pipeline.dependencies[0].display(), "go mod tidy");
    assert_eq!(config.resolve(&config.pid_file), PathBuf::from("/srv/nas/server.pid"));

    validate_config(&config)?;
    Ok(())
}

#[test]
fn test_defaults_are_valid() -> Result<()> {
    let config = Config::default();

    assert_eq!(config.poll_interval_secs, 600);
    assert_eq!(config.fetch_timeout_secs, 10);
    assert_eq!(config.env_file, PathBuf::from(".env"));
    assert_eq!(config.version_marker, PathBuf::from("version.txt"));
    assert_eq!(config.pid_file, PathBuf::from("server.pid"));
    assert_eq!(config.log_file, PathBuf::from("updater.log"));
    assert_eq!(config.server.command, "./nas-server");

    validate_config(&config)
}

#[test]
fn test_load_yaml_file() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("updater.yaml");
    std::fs::write(
        &path,
        "remoteVersionUrl: http://updates.local/version\npollIntervalSecs: 30\nserver:\n  command: ./nas\n",
    )
    .unwrap();

    let config = Config::from_file(&path)?;

    assert_eq!(config.remote_version_url, "http://updates.local/version");
    assert_eq!(config.poll_interval_secs, 30);
    assert_eq!(config.server.command, "./nas");
    assert!(config.server.args.is_empty());
    Ok(())
}

#[test]
fn test_load_errors() {
    assert!(matches!(
        Config::from_file("/nonexistent/updater.json"),
        Err(Error::ConfigParse(_))
    ));
    assert!(matches!(
        Config::parse_from_str(r#"{ "pollIntervalSecs": "ten minutes" }"#),
        Err(Error::ConfigParse(_))
    ));
}

#[test]
fn test_validate_config_rejects_bad_values() {
    let invalid = [
        Config {
            remote_version_url: "".to_string(),
            ..Config::default()
        },
        Config {
            remote_version_url: "ftp://example.com/version".to_string(),
            ..Config::default()
        },
        Config {
            poll_interval_secs: 0,
            ..Config::default()
        },
        Config {
            fetch_timeout_secs: 0,
            ..Config::default()
        },
        Config {
            version_key: "APP VERSION".to_string(),
            ..Config::default()
        },
        Config {
            version_key: "".to_string(),
            ..Config::default()
        },
        Config {
            server: CommandConfig::new("  ", &[]),
            ..Config::default()
        },
    ];

    for config in invalid {
        assert!(
            matches!(validate_config(&config), Err(Error::ConfigInvalid(_))),
            "expected {:?} to be rejected",
            config
        );
    }

    let mut no_build = Config::default();
    no_build.pipeline.build.clear();
    assert!(validate_config(&no_build).is_err());

    let mut empty_command = Config::default();
    empty_command.pipeline.sync.push(CommandConfig::new("", &[]));
    assert!(validate_config(&empty_command).is_err());
}

#[test]
fn test_runner_rejects_invalid_config() {
    let result = UpdateRunner::from_config_str(r#"{ "pollIntervalSecs": 0 }"#);

    assert!(matches!(result, Err(Error::ConfigInvalid(_))));
}

#[tokio::test]
async fn test_runner_builds_from_valid_config() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        remote_version_url: "http://127.0.0.1:9/version.txt".to_string(),
        working_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let runner = UpdateRunner::new(config)?;

    assert_eq!(runner.config().working_dir, dir.path());
    assert_eq!(runner.controller().poll_interval().as_secs(), 600);
    Ok(())
}
