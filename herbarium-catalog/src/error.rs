//! Error types for catalogue fetch, decode and cache operations.
//!
//! All of these are resolved internally by [`crate::sync::CatalogSync`];
//! consumers of the sync layer only ever see a [`crate::sync::SyncOutcome`].

use thiserror::Error;

/// Failure to obtain a catalogue body from the remote endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network unreachable, DNS failure or timeout.
    #[error("catalogue request failed")]
    Transport(#[source] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("catalogue endpoint returned {status}")]
    Protocol { status: reqwest::StatusCode },
}

/// Failure to turn a fetched or cached body into a valid payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("catalogue payload is not valid JSON")]
    Json(#[source] serde_json::Error),
    #[error("catalogue entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
    #[error("duplicate catalogue entry id `{id}`")]
    DuplicateId { id: String },
}

/// Failure of the local single-slot cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to lock catalogue cache")]
    Lock(#[source] fslock::Error),
    #[error("failed to read catalogue cache")]
    Read(#[source] std::io::Error),
    #[error("failed to write catalogue cache")]
    Write(#[source] std::io::Error),
    #[error("failed to parse catalogue cache record")]
    Deserialize(#[source] serde_json::Error),
    #[error("failed to serialize catalogue cache record")]
    Serialize(#[source] serde_json::Error),
}
