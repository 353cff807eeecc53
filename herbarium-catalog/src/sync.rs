//! Catalogue synchronization: fresh cache, then network, then the fallback
//! chain (stale cache, bundled snapshot, empty catalogue).
//!
//! All transport, protocol, decode and cache failures are resolved here;
//! callers only ever see a [`SyncOutcome`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

use crate::bundled::BUNDLED_CATALOG_JSON;
use crate::cache::{CacheRecord, CatalogCache};
use crate::client::CatalogSource;
use crate::store::CatalogStore;
use crate::types::{decode_payload, CatalogPayload};

/// Where the published payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// Cache record within the freshness window; no network I/O performed.
    FreshCache,
    /// Freshly fetched and decoded from the remote endpoint.
    Network,
    /// Network failed; an expired cache record was served instead.
    StaleCache,
    /// Network failed with no usable cache; the shipped snapshot was served.
    Bundled,
}

/// The resolved result of one sync attempt.
///
/// `Published` covers every recoverable path, with `stale` true when the
/// payload may not reflect the remote catalogue. `Exhausted` means every
/// fallback failed; an empty catalogue was published and the consumer should
/// surface a retryable error state.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Published {
        source: PayloadSource,
        stale: bool,
    },
    Exhausted {
        message: String,
    },
}

impl SyncOutcome {
    fn published(source: PayloadSource) -> Self {
        Self::Published {
            source,
            stale: matches!(source, PayloadSource::StaleCache | PayloadSource::Bundled),
        }
    }

    /// True when the published payload may not reflect the remote catalogue.
    pub fn is_stale(&self) -> bool {
        match self {
            Self::Published { stale, .. } => *stale,
            Self::Exhausted { .. } => true,
        }
    }
}

/// Produces an up-to-date payload for the store.
///
/// Construct with the cache, store and source injected; nothing here is
/// global. Overlapping [`CatalogSync::sync`] calls collapse to a single
/// fetch, with late callers receiving the completed attempt's outcome.
#[derive(Debug)]
pub struct CatalogSync<S> {
    source: S,
    cache: CatalogCache,
    store: Arc<CatalogStore>,
    ttl: Duration,
    bundled: String,
    /// Serializes attempts; holds the last completed outcome for joiners.
    last_outcome: Mutex<Option<SyncOutcome>>,
    /// Bumped after every completed attempt.
    generation: AtomicU64,
}

impl<S: CatalogSource> CatalogSync<S> {
    pub fn new(source: S, cache: CatalogCache, store: Arc<CatalogStore>, ttl: Duration) -> Self {
        Self {
            source,
            cache,
            store,
            ttl,
            bundled: BUNDLED_CATALOG_JSON.to_string(),
            last_outcome: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the shipped snapshot used as the last fallback.
    pub fn with_bundled_payload(mut self, bundled: impl Into<String>) -> Self {
        self.bundled = bundled.into();
        self
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Run one sync attempt, or join one already in flight.
    ///
    /// With `force_refresh` the fresh-cache short circuit is skipped and the
    /// network is always consulted.
    #[instrument(skip(self))]
    pub async fn sync(&self, force_refresh: bool) -> SyncOutcome {
        let observed_generation = self.generation.load(Ordering::Acquire);
        let mut last_outcome = self.last_outcome.lock().await;

        // An attempt completed while we waited on the lock; its outcome
        // answers this call too, without a second fetch.
        if self.generation.load(Ordering::Acquire) != observed_generation {
            if let Some(outcome) = last_outcome.clone() {
                debug!(?outcome, "joined in-flight sync attempt");
                return outcome;
            }
        }

        let outcome = self.attempt(force_refresh).await;
        *last_outcome = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn attempt(&self, force_refresh: bool) -> SyncOutcome {
        let now = OffsetDateTime::now_utc();

        let cached = match self.cache.get() {
            Ok(cached) => cached,
            Err(err) => {
                // Cache trouble never blocks a sync attempt; it only removes
                // the cache from the fallback chain.
                warn!(%err, "failed to read catalogue cache");
                None
            },
        };

        if !force_refresh {
            if let Some(record) = &cached {
                if record.is_fresh(now, self.ttl) {
                    match decode_payload(&record.payload) {
                        Ok(payload) => {
                            debug!(entries = payload.len(), "serving fresh cached catalogue");
                            self.store.replace(payload);
                            return SyncOutcome::published(PayloadSource::FreshCache);
                        },
                        Err(err) => {
                            warn!(%err, "fresh cache record failed to decode, fetching");
                        },
                    }
                }
            }
        }

        match self.source.fetch_catalog().await {
            Ok(body) => match decode_payload(&body) {
                Ok(payload) => {
                    // fetched_at is the instant the fetch completed, not the
                    // instant this attempt started
                    let fetched_at = OffsetDateTime::now_utc();
                    if let Err(err) = self.cache.put(&body, fetched_at) {
                        // The fetch succeeded; only durability is degraded.
                        warn!(%err, "failed to write catalogue cache");
                    }
                    debug!(entries = payload.len(), "publishing fetched catalogue");
                    self.store.replace(payload);
                    SyncOutcome::published(PayloadSource::Network)
                },
                Err(err) => {
                    warn!(%err, "fetched catalogue failed to decode");
                    self.fall_back(cached)
                },
            },
            Err(err) => {
                warn!(%err, "catalogue fetch failed");
                self.fall_back(cached)
            },
        }
    }

    /// Serve the best remaining payload: any cache record regardless of
    /// freshness, then the bundled snapshot, then an empty catalogue.
    fn fall_back(&self, cached: Option<CacheRecord>) -> SyncOutcome {
        if let Some(record) = cached {
            match decode_payload(&record.payload) {
                Ok(payload) => {
                    warn!(
                        fetched_at = %record.fetched_at,
                        "showing possibly stale catalogue from cache"
                    );
                    self.store.replace(payload);
                    return SyncOutcome::published(PayloadSource::StaleCache);
                },
                Err(err) => {
                    warn!(%err, "cache record failed to decode, degrading to bundled snapshot");
                },
            }
        }

        match decode_payload(&self.bundled) {
            Ok(payload) => {
                warn!("showing bundled catalogue snapshot");
                self.store.replace(payload);
                SyncOutcome::published(PayloadSource::Bundled)
            },
            Err(err) => {
                error!(%err, "bundled catalogue snapshot failed to decode");
                self.store.replace(CatalogPayload::default());
                SyncOutcome::Exhausted {
                    message: "no catalogue available: network, cache and bundled snapshot \
                              all failed"
                        .to_string(),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::MockCatalogSource;
    use crate::types::tests::entry_json;

    const TTL: Duration = Duration::from_secs(3600);

    fn sync_with(source: MockCatalogSource) -> (CatalogSync<MockCatalogSource>, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(temp_dir.path());
        let store = Arc::new(CatalogStore::new());
        (CatalogSync::new(source, cache, store, TTL), temp_dir)
    }

    fn payload_json(ids: &[&str]) -> String {
        serde_json::Value::Array(
            ids.iter()
                .map(|id| entry_json(id, "herb", &["AF"]))
                .collect(),
        )
        .to_string()
    }

    fn published_ids(sync: &CatalogSync<MockCatalogSource>) -> Vec<String> {
        sync.store()
            .snapshot()
            .entries
            .iter()
            .map(|entry| entry.id.clone())
            .collect()
    }

    #[tokio::test]
    async fn fresh_cache_short_circuits_the_network() {
        let (sync, _dir) = sync_with(MockCatalogSource::new());
        sync.cache
            .put(&payload_json(&["cached"]), OffsetDateTime::now_utc())
            .unwrap();

        for _ in 0..3 {
            let outcome = sync.sync(false).await;
            assert_eq!(
                outcome,
                SyncOutcome::published(PayloadSource::FreshCache)
            );
        }

        assert_eq!(sync.source.fetch_count(), 0);
        assert_eq!(published_ids(&sync), vec!["cached"]);
    }

    #[tokio::test]
    async fn expired_cache_triggers_a_fetch() {
        let source = MockCatalogSource::new();
        source.push_body(payload_json(&["fetched"]));
        let (sync, _dir) = sync_with(source);

        sync.cache
            .put(
                &payload_json(&["cached"]),
                OffsetDateTime::now_utc() - Duration::from_secs(3601),
            )
            .unwrap();

        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Network));
        assert_eq!(sync.source.fetch_count(), 1);
        assert_eq!(published_ids(&sync), vec!["fetched"]);
    }

    #[tokio::test]
    async fn forced_refresh_skips_a_fresh_cache() {
        let source = MockCatalogSource::new();
        source.push_body(payload_json(&["fetched"]));
        let (sync, _dir) = sync_with(source);

        sync.cache
            .put(&payload_json(&["cached"]), OffsetDateTime::now_utc())
            .unwrap();

        let outcome = sync.sync(true).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Network));
        assert_eq!(sync.source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn successful_fetch_populates_the_cache() {
        let source = MockCatalogSource::new();
        source.push_body(payload_json(&["fetched"]));
        let (sync, _dir) = sync_with(source);

        sync.sync(false).await;

        let record = sync.cache.get().unwrap().unwrap();
        assert_eq!(record.payload, payload_json(&["fetched"]));
    }

    #[tokio::test]
    async fn cache_write_failure_does_not_block_publishing() {
        let source = MockCatalogSource::new();
        source.push_body(payload_json(&["fetched"]));

        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        // cache dir nested under a regular file, so the cache write fails
        let cache = CatalogCache::new(blocker.join("nested"));

        let sync = CatalogSync::new(source, cache, Arc::new(CatalogStore::new()), TTL);

        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Network));
        assert_eq!(published_ids(&sync), vec!["fetched"]);
    }

    #[tokio::test]
    async fn cache_timestamp_reflects_fetch_completion() {
        let source = MockCatalogSource::with_delay(Duration::from_millis(50));
        source.push_body(payload_json(&["fetched"]));
        let (sync, _dir) = sync_with(source);

        let started = OffsetDateTime::now_utc();
        sync.sync(false).await;

        // the record must be stamped after the fetch completed, so at least
        // the mock's delay after the attempt began
        let record = sync.cache.get().unwrap().unwrap();
        assert!(record.fetched_at - started >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_stale_cache() {
        let source = MockCatalogSource::new();
        source.push_status(503);
        let (sync, _dir) = sync_with(source);

        sync.cache
            .put(
                &payload_json(&["cached"]),
                OffsetDateTime::now_utc() - Duration::from_secs(7200),
            )
            .unwrap();

        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::StaleCache));
        assert!(outcome.is_stale());
        assert_eq!(published_ids(&sync), vec!["cached"]);
    }

    #[tokio::test]
    async fn fetch_failure_without_cache_falls_back_to_bundled() {
        let source = MockCatalogSource::new();
        source.push_status(503);
        let (sync, _dir) = sync_with(source);

        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Bundled));
        assert!(outcome.is_stale());
        assert!(!sync.store().snapshot().is_empty());
    }

    #[tokio::test]
    async fn exhausted_fallback_publishes_an_empty_catalogue() {
        let source = MockCatalogSource::new();
        source.push_status(503);
        let (sync, _dir) = sync_with(source);
        let sync = sync.with_bundled_payload("not json");

        let outcome = sync.sync(false).await;
        assert!(matches!(outcome, SyncOutcome::Exhausted { .. }));
        assert!(sync.store().snapshot().is_empty());
    }

    #[tokio::test]
    async fn decode_failure_is_all_or_nothing() {
        // entry 3 of 10 is missing a required field
        let mut entries = (0..10)
            .map(|i| entry_json(&format!("e{i}"), "herb", &["AF"]))
            .collect::<Vec<_>>();
        entries[3].as_object_mut().unwrap().remove("description");

        let source = MockCatalogSource::new();
        source.push_body(serde_json::Value::Array(entries).to_string());
        let (sync, _dir) = sync_with(source);

        let outcome = sync.sync(false).await;

        // the nine well-formed entries are not partially applied; the
        // fallback chain serves the bundled snapshot instead
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Bundled));
        assert!(published_ids(&sync).iter().all(|id| !id.starts_with("e")));
    }

    #[tokio::test]
    async fn request_timeout_enters_the_fallback_chain() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/catalogue.json");
            then.status(200)
                .body(payload_json(&["fetched"]))
                .delay(Duration::from_millis(500));
        });

        let mut config = crate::config::CatalogConfig::new(
            url::Url::parse(&server.url("/catalogue.json")).unwrap(),
            "/unused",
        );
        config.request_timeout = Duration::from_millis(50);
        let client = crate::client::HttpCatalogClient::new(&config).unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(
            client,
            CatalogCache::new(temp_dir.path()),
            Arc::new(CatalogStore::new()),
            TTL,
        );

        // timed out fetch is a transport failure; no cache, so the bundled
        // snapshot is served
        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Bundled));
    }

    #[tokio::test]
    async fn overlapping_syncs_issue_a_single_fetch() {
        let source = MockCatalogSource::with_delay(Duration::from_millis(50));
        source.push_body(payload_json(&["fetched"]));
        let (sync, _dir) = sync_with(source);

        let (first, second) = tokio::join!(sync.sync(false), sync.sync(false));

        assert_eq!(sync.source.fetch_count(), 1);
        assert_eq!(first, SyncOutcome::published(PayloadSource::Network));
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn corrupt_cache_degrades_to_bundled_on_fallback() {
        let source = MockCatalogSource::new();
        source.push_status(503);
        let (sync, dir) = sync_with(source);

        std::fs::write(dir.path().join("catalogue-cache.json"), "not json").unwrap();

        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Bundled));
    }

    #[tokio::test]
    async fn fetch_recovers_from_a_corrupt_fresh_cache_record() {
        let source = MockCatalogSource::new();
        source.push_body(payload_json(&["fetched"]));
        let (sync, _dir) = sync_with(source);

        // fresh by timestamp, but the payload inside does not decode
        sync.cache.put("not json", OffsetDateTime::now_utc()).unwrap();

        let outcome = sync.sync(false).await;
        assert_eq!(outcome, SyncOutcome::published(PayloadSource::Network));
        assert_eq!(published_ids(&sync), vec!["fetched"]);
    }

    #[tokio::test]
    async fn published_payload_preserves_entry_order() {
        let source = MockCatalogSource::new();
        source.push_body(
            json!([
                entry_json("a", "Herb", &["AF"]),
                entry_json("b", "Spice", &["AF"]),
                entry_json("c", "Herb", &["AS"]),
            ])
            .to_string(),
        );
        let (sync, _dir) = sync_with(source);

        sync.sync(false).await;
        assert_eq!(published_ids(&sync), vec!["a", "b", "c"]);
    }
}
