//! Remote release catalog and artifact downloads.
//!
//! [`ReleaseSource`] is the seam between the pipeline and the network.
//! [`HttpReleaseSource`] talks to a distribution server laid out like
//! `https://go.dev/dl`: the catalog lives at `<server>/<query>` and every
//! artifact at `<server>/<filename>`.
//!
//! There is no retry: any transport failure or non-success status is
//! returned to the caller as is.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::Config;

use super::catalog::CatalogEntry;
use super::{Result, VswitchError};

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("vswitch/", env!("CARGO_PKG_VERSION"));

/// Source of releases: the catalog and the artifact bytes.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the full release catalog, newest first.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;

    /// Streams the artifact named `filename` into `dest`, truncating it.
    ///
    /// A failure part-way through leaves the partially written file behind.
    async fn download(&self, filename: &str, dest: &Path) -> Result<()>;
}

/// [`ReleaseSource`] backed by an HTTP distribution server.
#[derive(Debug, Clone)]
pub struct HttpReleaseSource {
    client: reqwest::Client,
    catalog_url: String,
    dist_server: String,
}

impl HttpReleaseSource {
    /// Creates a source for `dist_server` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(catalog_url: String, dist_server: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                VswitchError::download_error_with_source("failed to create HTTP client", Box::new(e))
            })?;

        Ok(Self {
            client,
            catalog_url,
            dist_server: dist_server.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a source from the configured server, query and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.catalog_url(),
            config.dist_server.clone(),
            config.request_timeout,
        )
    }

    fn artifact_url(&self, filename: &str) -> String {
        format!("{}/{filename}", self.dist_server)
    }
}

/// Describes a non-success status in a way that helps the user act on it.
fn describe_http_error(status: reqwest::StatusCode, url: &str) -> String {
    match status.as_u16() {
        404 => format!("not found at {url}"),
        code if code >= 500 => format!("server error ({code}): {url}"),
        code => format!("HTTP error {code}: {url}"),
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        tracing::debug!(url = %self.catalog_url, "fetching release catalog");

        let response = self
            .client
            .get(&self.catalog_url)
            .send()
            .await
            .map_err(|e| {
                VswitchError::catalog_fetch_with_source(
                    format!("failed to connect to {}", self.catalog_url),
                    Box::new(e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VswitchError::catalog_fetch(describe_http_error(
                status,
                &self.catalog_url,
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            VswitchError::catalog_fetch_with_source(
                format!("failed to read response from {}", self.catalog_url),
                Box::new(e),
            )
        })?;

        serde_json::from_slice(&body).map_err(|source| VswitchError::CatalogParse { source })
    }

    async fn download(&self, filename: &str, dest: &Path) -> Result<()> {
        let url = self.artifact_url(filename);
        tracing::debug!(%url, dest = %dest.display(), "downloading artifact");

        let response = self.client.get(&url).send().await.map_err(|e| {
            VswitchError::download_error_with_source(format!("failed to connect to {url}"), Box::new(e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VswitchError::download_error(describe_http_error(status, &url)));
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            VswitchError::io(format!("failed to create file {}", dest.display()), e)
        })?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                VswitchError::download_error_with_source(
                    format!("failed to read chunk from {url}"),
                    Box::new(e),
                )
            })?;
            file.write_all(&chunk).await.map_err(|e| {
                VswitchError::io(format!("failed to write to {}", dest.display()), e)
            })?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| VswitchError::io(format!("failed to flush {}", dest.display()), e))?;

        tracing::debug!(bytes = downloaded, "download finished");
        Ok(())
    }
}
