//! Scripted catalogue source for tests.
//!
//! Available to downstream crates through the `tests` feature so that sync
//! behavior can be exercised without HTTP.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::CatalogSource;
use crate::error::FetchError;

/// One scripted fetch result.
#[derive(Debug, Clone)]
pub enum MockFetch {
    /// Respond with this body.
    Body(String),
    /// Fail with a protocol error carrying this status code.
    Status(u16),
}

/// A [`CatalogSource`] that answers from a scripted queue and counts fetches.
///
/// An exhausted script answers with a 503 protocol error, which keeps
/// fallback tests honest about how many fetches they expected.
#[derive(Debug, Default)]
pub struct MockCatalogSource {
    responses: Mutex<VecDeque<MockFetch>>,
    fetches: AtomicUsize,
    delay: Option<Duration>,
}

impl MockCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay each fetch, to widen the window for overlap tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_body(&self, body: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock response queue poisoned")
            .push_back(MockFetch::Body(body.into()));
    }

    pub fn push_status(&self, status: u16) {
        self.responses
            .lock()
            .expect("mock response queue poisoned")
            .push_back(MockFetch::Status(status));
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl CatalogSource for MockCatalogSource {
    async fn fetch_catalog(&self) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .responses
            .lock()
            .expect("mock response queue poisoned")
            .pop_front();

        let status = match next {
            Some(MockFetch::Body(body)) => return Ok(body),
            Some(MockFetch::Status(status)) => status,
            None => 503,
        };

        Err(FetchError::Protocol {
            status: reqwest::StatusCode::from_u16(status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
        })
    }
}
