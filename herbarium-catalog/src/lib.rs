//! Herb catalogue synchronization, caching and querying.
//!
//! This crate provides:
//! - A strictly decoded catalogue data model ([`types`])
//! - A single-slot TTL cache for the last fetched payload ([`cache`])
//! - An HTTP catalogue client behind a source trait ([`client`])
//! - Sync orchestration with a fallback chain and request de-duplication
//!   ([`sync`])
//! - A query store with atomic snapshot replacement and subscriptions
//!   ([`store`])
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use herbarium_catalog::{
//!     CatalogCache, CatalogConfig, CatalogStore, CatalogSync, HttpCatalogClient,
//! };
//!
//! let config = CatalogConfig::new(catalog_url, cache_dir);
//! let client = HttpCatalogClient::new(&config)?;
//! let cache = CatalogCache::new(&config.cache_dir);
//! let store = Arc::new(CatalogStore::new());
//!
//! let sync = CatalogSync::new(client, cache, Arc::clone(&store), config.cache_ttl);
//! let outcome = sync.sync(false).await;
//! let herbs = store.by_category("herb");
//! ```

mod bundled;
mod cache;
mod client;
mod config;
mod error;
mod store;
mod sync;
mod types;

#[cfg(any(test, feature = "tests"))]
pub mod mock;

pub use bundled::{bundled_payload, BUNDLED_CATALOG_JSON};
pub use cache::{CacheRecord, CatalogCache, CACHE_SCHEMA_VERSION};
pub use client::{CatalogSource, HttpCatalogClient};
pub use config::{
    CatalogConfig, DEFAULT_CACHE_TTL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{CacheError, DecodeError, FetchError};
pub use store::{CatalogFilter, CatalogStore};
pub use sync::{CatalogSync, PayloadSource, SyncOutcome};
pub use types::{
    decode_payload, CatalogEntry, CatalogPayload, Continent, HerbCategory, Nutrition,
};
