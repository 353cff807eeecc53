//! HTTP access to the remote catalogue endpoint.

use std::fmt::Debug;
use std::time::Duration;

use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;
use crate::error::FetchError;

/// The seam between the sync layer and the transport.
///
/// Alternate implementations:
/// - **HTTP** (production): one GET against the configured endpoint via
///   [`HttpCatalogClient`]
/// - **Mock** (tests): scripted responses without HTTP, see
///   [`crate::mock::MockCatalogSource`]
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Fetch the serialized catalogue body.
    ///
    /// Success means the transport succeeded and the response status was in
    /// the 2xx range; decoding is the sync layer's concern.
    async fn fetch_catalog(&self) -> Result<String, FetchError>;
}

/// A client for the remote catalogue resource.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    catalog_url: Url,
}

impl Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("catalog_url", &self.catalog_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpCatalogClient {
    /// Create a new client from configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = build_http_client(
            config.connect_timeout,
            config.request_timeout,
            config.user_agent.as_deref(),
        )?;
        Ok(Self {
            client,
            catalog_url: config.catalog_url.clone(),
        })
    }
}

impl CatalogSource for HttpCatalogClient {
    #[instrument(skip_all, fields(url = %self.catalog_url))]
    async fn fetch_catalog(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.catalog_url.clone())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Protocol { status });
        }

        let body = response.text().await.map_err(FetchError::Transport)?;
        debug!(bytes = body.len(), "fetched catalogue body");
        Ok(body)
    }
}

fn build_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
    user_agent: Option<&str>,
) -> Result<reqwest::Client, FetchError> {
    let client_builder = reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout);

    let client_builder = if let Some(user_agent) = user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder.build().map_err(FetchError::Transport)
}
