//! Catalog retrieval
//!
//! A single blocking-style GET against the well-known catalog endpoint.
//! There is no cache and no retry; one failed fetch is final for the run
//! and the caller degrades to manual instructions.

use std::time::Duration;

use crate::catalog::Catalog;
use crate::error::DriverError;

/// The well-known public driver catalog.
pub const DEFAULT_CATALOG_URL: &str =
    "https://googlechromelabs.github.io/chrome-for-testing/known-good-versions-with-downloads.json";

/// Request timeout for catalog and archive fetches.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("drover/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
}

impl Catalog {
    /// Fetch and parse the catalog from a URL.
    ///
    /// An unreachable endpoint, a non-success status, and an unparsable
    /// body all surface as [`DriverError::Network`].
    pub async fn fetch(url: &str) -> Result<Catalog, DriverError> {
        let network = |source: reqwest::Error| DriverError::Network {
            url: url.to_string(),
            source,
        };

        let client = http_client().map_err(network)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?;

        let catalog: Catalog = response.json().await.map_err(network)?;

        tracing::debug!(url, versions = catalog.versions.len(), "Fetched driver catalog");
        Ok(catalog)
    }
}
