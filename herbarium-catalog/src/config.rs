//! Configuration for catalogue client and sync construction.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Maximum age at which a cached payload avoids a network fetch.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Startup configuration for the catalogue component.
///
/// All values are injected at construction; nothing is read from globals.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the remote catalogue resource.
    pub catalog_url: Url,
    /// Directory holding the single-slot cache record.
    pub cache_dir: PathBuf,
    /// Freshness window for the cached payload.
    pub cache_ttl: Duration,
    /// Overall timeout for one catalogue request. A timeout is treated as a
    /// transport failure.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Optional user agent for catalogue requests.
    pub user_agent: Option<String>,
}

impl CatalogConfig {
    /// Build a configuration with default timeouts and TTL.
    pub fn new(catalog_url: Url, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog_url,
            cache_dir: cache_dir.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: None,
        }
    }
}
