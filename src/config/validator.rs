use crate::config::{CommandConfig, Config};
use crate::error::{Error, Result};

/// Validates a single command
pub fn validate_command(context: &str, command: &CommandConfig) -> Result<()> {
    if command.command.trim().is_empty() {
        return Err(Error::ConfigInvalid(format!("{} has empty command", context)));
    }

    Ok(())
}

/// Validates the commands of one pipeline step
pub fn validate_step(step: &str, commands: &[CommandConfig]) -> Result<()> {
    if commands.is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Pipeline step '{}' has no commands",
            step
        )));
    }

    for (index, command) in commands.iter().enumerate() {
        validate_command(&format!("Pipeline step '{}' command #{}", step, index + 1), command)?;
    }

    Ok(())
}

/// Full configuration validation
pub fn validate_config(config: &Config) -> Result<()> {
    let url = config.remote_version_url.trim();
    if url.is_empty() {
        return Err(Error::ConfigInvalid("Remote version URL is empty".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::ConfigInvalid(format!(
            "Remote version URL '{}' is not an http(s) URL",
            url
        )));
    }

    if config.poll_interval_secs == 0 {
        return Err(Error::ConfigInvalid("Poll interval must be at least one second".to_string()));
    }
    if config.fetch_timeout_secs == 0 {
        return Err(Error::ConfigInvalid("Fetch timeout must be at least one second".to_string()));
    }

    let key = &config.version_key;
    if key.is_empty() {
        return Err(Error::ConfigInvalid("Version key is empty".to_string()));
    }
    if key.contains('=') || key.chars().any(char::is_whitespace) {
        return Err(Error::ConfigInvalid(format!(
            "Version key '{}' must not contain '=' or whitespace",
            key
        )));
    }

    validate_command("Server", &config.server)?;

    validate_step("sync", &config.pipeline.sync)?;
    validate_step("dependencies", &config.pipeline.dependencies)?;
    validate_step("build", &config.pipeline.build)?;

    Ok(())
}
