use super::Version;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Persistence for the locally recorded version.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Last recorded local version, or `None` if none was ever recorded.
    ///
    /// Never fails: a missing or unreadable store reads as `None`.
    async fn read_local(&self) -> Option<Version>;

    /// Record `version` as the local version.
    async fn write_local(&self, version: &Version) -> Result<()>;
}

/// A dotenv-style `KEY=value` file holding the version under one key.
///
/// The file is shared with the managed server, so writes only touch lines
/// assigning the version key and leave everything else as it was.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    key: String,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of the version key, if the file exists and assigns it.
    pub fn read(&self) -> Option<String> {
        let entries = match dotenvy::from_path_iter(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Env file {} not readable: {}", self.path.display(), e);
                return None;
            }
        };

        let mut value = None;
        for entry in entries {
            match entry {
                Ok((key, v)) if key == self.key => value = Some(v),
                Ok(_) => {}
                Err(e) => debug!("Skipping malformed line in {}: {}", self.path.display(), e),
            }
        }
        value
    }

    /// Set the version key to `value`, creating the file if needed.
    ///
    /// Lines are rewritten only when they assign the version key; every
    /// other line keeps its bytes and its line ending.
    pub fn write(&self, value: &str) -> io::Result<()> {
        let existing = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let assignment = format!("{}={}", self.key, quote_value(value));
        let newline = if existing.contains("\r\n") { "\r\n" } else { "\n" };
        let mut found = false;
        let mut content = String::with_capacity(existing.len() + assignment.len() + 2);

        for line in existing.split_inclusive('\n') {
            let (body, ending) = split_line_ending(line);
            if assigns_key(body, &self.key) {
                found = true;
                content.push_str(&assignment);
                content.push_str(ending);
            } else {
                content.push_str(line);
            }
        }

        if !found {
            if !content.is_empty() && !content.ends_with('\n') {
                content.push_str(newline);
            }
            content.push_str(&assignment);
            content.push_str(newline);
        }

        std::fs::write(&self.path, content)
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Whether `line` assigns `key`, allowing an `export` prefix and spaces
/// around the key.
fn assigns_key(line: &str, key: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line);
    match line.split_once('=') {
        Some((name, _)) => name.trim() == key,
        None => false,
    }
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));
    if !needs_quotes {
        value.to_string()
    } else if !value.contains('\'') {
        // single quotes are taken literally, no escapes or substitution
        format!("'{}'", value)
    } else {
        // double quotes substitute `$`, so it is escaped along with `\` and `"`
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$");
        format!("\"{}\"", escaped)
    }
}

/// A plain-text file whose entire contents are the version.
#[derive(Debug, Clone)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Option<Version> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| Version::parse(&content))
    }

    pub fn write(&self, value: &str) -> io::Result<()> {
        std::fs::write(&self.path, value)
    }
}

/// Version store backed by an env file and a marker file.
///
/// Reads come from the env file. Writes go to both files with no
/// transaction between them; if one write fails the other is still
/// attempted, and the returned error names every file left behind.
#[derive(Debug, Clone)]
pub struct FileVersionStore {
    env: EnvFile,
    marker: MarkerFile,
}

impl FileVersionStore {
    pub fn new(env: EnvFile, marker: MarkerFile) -> Self {
        Self { env, marker }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EnvFile::new(config.resolve(&config.env_file), config.version_key.clone()),
            MarkerFile::new(config.resolve(&config.version_marker)),
        )
    }

    pub fn env_file(&self) -> &EnvFile {
        &self.env
    }

    pub fn marker(&self) -> &MarkerFile {
        &self.marker
    }
}

#[async_trait]
impl VersionStore for FileVersionStore {
    async fn read_local(&self) -> Option<Version> {
        self.env.read().and_then(|raw| Version::parse(&raw))
    }

    #[tracing::instrument(skip_all, fields(version = %version))]
    async fn write_local(&self, version: &Version) -> Result<()> {
        let mut failed = Vec::new();

        if let Err(e) = self.env.write(version.as_str()) {
            error!("Failed to write version to {}: {}", self.env.path().display(), e);
            failed.push(self.env.path().display().to_string());
        }

        if let Err(e) = self.marker.write(version.as_str()) {
            error!("Failed to write version to {}: {}", self.marker.path().display(), e);
            failed.push(self.marker.path().display().to_string());
        }

        if failed.is_empty() {
            debug!("Recorded local version");
            Ok(())
        } else {
            Err(Error::VersionPersist(failed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigns_key() {
        assert!(assigns_key("APP_VERSION=1.0", "APP_VERSION"));
        assert!(assigns_key("  export APP_VERSION = 1.0", "APP_VERSION"));
        assert!(!assigns_key("APP_VERSION_OLD=1.0", "APP_VERSION"));
        assert!(!assigns_key("# APP_VERSION=1.0", "APP_VERSION"));
        assert!(!assigns_key("APP_VERSION", "APP_VERSION"));
    }

    #[test]
    fn test_split_line_ending() {
        assert_eq!(split_line_ending("A=1\r\n"), ("A=1", "\r\n"));
        assert_eq!(split_line_ending("A=1\n"), ("A=1", "\n"));
        assert_eq!(split_line_ending("A=1"), ("A=1", ""));
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("1.1"), "1.1");
        assert_eq!(quote_value("v1.1-rc1+build.5"), "v1.1-rc1+build.5");
        assert_eq!(quote_value("1.1 beta"), "'1.1 beta'");
        assert_eq!(quote_value("a\"b"), "'a\"b'");
        assert_eq!(quote_value("it's"), "\"it's\"");
        assert_eq!(quote_value("it's-$HOME"), "\"it's-\\$HOME\"");
        assert_eq!(quote_value("$1.1"), "'$1.1'");
    }
}
