use super::Version;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of the currently published version.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetch the published version.
    ///
    /// Failures are absorbed: any error reads as `None`, which the controller
    /// treats exactly like "no update available".
    async fn fetch(&self) -> Option<Version>;
}

/// Fetches the published version over HTTP.
///
/// The endpoint must answer `200 OK` with the version as its plain-text
/// body; surrounding whitespace is trimmed.
///
/// # Examples
///
/// ```no_run
/// use update_runner::version::{RemoteVersionFetcher, VersionSource};
/// use std::time::Duration;
///
/// # async fn example() -> update_runner::Result<()> {
/// let fetcher = RemoteVersionFetcher::new(
///     "https://example.com/version.txt",
///     Duration::from_secs(10),
/// )?;
/// if let Some(version) = fetcher.fetch().await {
///     println!("published: {}", version);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RemoteVersionFetcher {
    client: reqwest::Client,
    url: String,
}

impl RemoteVersionFetcher {
    /// Create a fetcher for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("update-runner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.remote_version_url.trim(), config.fetch_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl VersionSource for RemoteVersionFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self) -> Option<Version> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fetching remote version: {}", e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!(
                "Failed to fetch remote version: HTTP {}",
                response.status().as_u16()
            );
            return None;
        }

        match response.text().await {
            Ok(body) => {
                let version = Version::parse(&body);
                match &version {
                    Some(v) => debug!("Remote version is {}", v),
                    None => warn!("Remote version endpoint returned an empty body"),
                }
                version
            }
            Err(e) => {
                warn!("Error reading remote version: {}", e);
                None
            }
        }
    }
}
