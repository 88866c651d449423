//! Raw byte fetching for asset locations.
//!
//! A location is either an absolute `http://` / `https://` URL or a path
//! relative to the game's asset root. [`AssetFetcher`] routes between the two.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::LoaderConfig;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {location}")]
    Status { location: String, status: u16 },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("resource not found: {0}")]
    NotFound(String),
}

/// Fetches the raw bytes behind a location.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

/// Returns true if the location is an absolute HTTP(S) URL.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Join a relative location onto a base URL with exactly one `/` between them.
pub fn join_url(base: &str, location: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        location.trim_start_matches('/')
    )
}

/// Fetches over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(location).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(location);
        tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::Io { path, source },
        })
    }
}

/// Routes absolute URLs to HTTP and relative locations to either the
/// configured base URL or the asset directory.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    http: HttpFetcher,
    files: FileFetcher,
    base_url: Option<String>,
}

impl AssetFetcher {
    pub fn new(http: HttpFetcher, files: FileFetcher, base_url: Option<String>) -> Self {
        Self {
            http,
            files,
            base_url,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            HttpFetcher::new(config.request_timeout())?,
            FileFetcher::new(&config.asset_dir),
            config.base_url.clone(),
        ))
    }
}

#[async_trait]
impl Fetcher for AssetFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        if is_remote(location) {
            return self.http.fetch(location).await;
        }
        match &self.base_url {
            Some(base) => self.http.fetch(&join_url(base, location)).await,
            None => self.files.fetch(location).await,
        }
    }
}
