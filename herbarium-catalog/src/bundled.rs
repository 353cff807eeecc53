//! Catalogue snapshot shipped with the binary, the last resort of the
//! fallback chain.

use crate::error::DecodeError;
use crate::types::{decode_payload, CatalogPayload};

/// Serialized bundled snapshot, decoded through the same strict path as a
/// network payload.
pub const BUNDLED_CATALOG_JSON: &str = include_str!("../assets/bundled_catalog.json");

/// Decode the bundled snapshot.
pub fn bundled_payload() -> Result<CatalogPayload, DecodeError> {
    decode_payload(BUNDLED_CATALOG_JSON)
}
