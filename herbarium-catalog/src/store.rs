//! In-memory source of truth for the published catalogue.
//!
//! The store holds the current payload behind a watch channel. `replace`
//! swaps a single `Arc`, so readers always observe a complete snapshot,
//! either entirely old or entirely new. Subscribers are notified with the
//! new snapshot after every replace.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::types::{CatalogEntry, CatalogPayload, Continent};

/// Optional criteria for [`CatalogStore::filter`]; each axis left as [`None`]
/// places no constraint.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive category match.
    pub category: Option<String>,
    pub continent: Option<Continent>,
    /// Case-insensitive substring over name, description, uses and ailments.
    /// Empty text matches everything.
    pub search: Option<String>,
}

/// Holds the current payload and answers read-only queries.
///
/// Mutation happens only through [`CatalogStore::replace`], called by the
/// sync layer on publish; no consumer mutates the store directly.
#[derive(Debug)]
pub struct CatalogStore {
    payload_tx: watch::Sender<Arc<CatalogPayload>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (payload_tx, _) = watch::channel(Arc::new(CatalogPayload::default()));
        Self { payload_tx }
    }

    /// Atomically swap in a new payload and notify subscribers.
    pub fn replace(&self, payload: CatalogPayload) {
        debug!(entries = payload.len(), "replacing published catalogue");
        self.payload_tx.send_replace(Arc::new(payload));
    }

    /// The currently published payload, in full.
    pub fn snapshot(&self) -> Arc<CatalogPayload> {
        self.payload_tx.borrow().clone()
    }

    /// Receive a payload snapshot after every [`Self::replace`].
    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogPayload>> {
        self.payload_tx.subscribe()
    }

    /// Entries whose category matches `category` case-insensitively.
    pub fn by_category(&self, category: &str) -> Vec<CatalogEntry> {
        self.filter(&CatalogFilter {
            category: Some(category.to_string()),
            ..CatalogFilter::default()
        })
    }

    /// Entries whose continent list contains `continent`.
    pub fn by_continent(&self, continent: Continent) -> Vec<CatalogEntry> {
        self.filter(&CatalogFilter {
            continent: Some(continent),
            ..CatalogFilter::default()
        })
    }

    /// Entries matching `text` case-insensitively against name, description,
    /// uses or ailments. Empty text returns the full set.
    pub fn search(&self, text: &str) -> Vec<CatalogEntry> {
        self.filter(&CatalogFilter {
            search: Some(text.to_string()),
            ..CatalogFilter::default()
        })
    }

    /// Conjunction of category, continent and search criteria.
    pub fn filter(&self, criteria: &CatalogFilter) -> Vec<CatalogEntry> {
        let needle = criteria
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|needle| !needle.is_empty());

        self.snapshot()
            .entries
            .iter()
            .filter(|entry| {
                criteria
                    .category
                    .as_deref()
                    .is_none_or(|category| entry.category.eq_ignore_ascii_case(category))
            })
            .filter(|entry| {
                criteria
                    .continent
                    .is_none_or(|continent| entry.continents.contains(&continent))
            })
            .filter(|entry| {
                needle
                    .as_deref()
                    .is_none_or(|needle| entry.matches_lowercase(needle))
            })
            .cloned()
            .collect()
    }
}
