//! Catalogue data model and strict payload decoding.
//!
//! Entries are immutable once decoded; updates only arrive by replacing the
//! whole payload. Decoding is all-or-nothing: a payload with a single
//! malformed entry is rejected entirely rather than served partially.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// The fixed 7-value continent enumeration used by entry `continents` lists.
///
/// An unknown code in the wire format is a decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    #[serde(rename = "AF")]
    Africa,
    #[serde(rename = "AN")]
    Antarctica,
    #[serde(rename = "AS")]
    Asia,
    #[serde(rename = "EU")]
    Europe,
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "OC")]
    Oceania,
    #[serde(rename = "SA")]
    SouthAmerica,
}

/// The known subset of category strings that presentation and dosage logic
/// branch on. The wire `category` field remains an open string; anything
/// outside the known subset parses as [`HerbCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HerbCategory {
    Herb,
    Root,
    Bark,
    Tonic,
    MixedTonic,
    Refresher,
    Spice,
    Other,
}

impl HerbCategory {
    /// Parse a category string, mapping unknown values to [`Self::Other`].
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "herb" => Self::Herb,
            "root" => Self::Root,
            "bark" => Self::Bark,
            "tonic" => Self::Tonic,
            "mixed-tonic" => Self::MixedTonic,
            "refresher" => Self::Refresher,
            "spice" => Self::Spice,
            _ => Self::Other,
        }
    }
}

/// Nutrition summary for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    /// Calories per serving. Non-negative by construction.
    pub calories: u32,
    /// Carbohydrate grams per serving. Must be non-negative and finite.
    pub carbohydrates: f64,
}

/// One herb/remedy record.
///
/// Field names match the snake_case wire format. Every field is required;
/// a missing field or a type mismatch fails the whole payload decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable identifier, assigned at data-authoring time, unique per payload.
    pub id: String,
    pub english_name: String,
    /// Region code to localized name. Keys are unique; no ordering guarantee.
    pub local_names: BTreeMap<String, String>,
    pub scientific_name: String,
    pub description: String,
    pub uses: Vec<String>,
    /// Open category string; see [`HerbCategory`] for the known subset.
    pub category: String,
    pub vitamins: Vec<String>,
    pub nutrition: Nutrition,
    pub ailments: Vec<String>,
    pub locations: Vec<String>,
    pub preparation: String,
    pub dosage: String,
    pub precautions: String,
    pub honey_usage: String,
    pub continents: Vec<Continent>,
    pub wikipedia_url: String,
}

impl CatalogEntry {
    /// Parse the open category string into the known subset.
    pub fn category_kind(&self) -> HerbCategory {
        HerbCategory::from_str_lossy(&self.category)
    }

    /// Case-insensitive substring match against name, description, uses and
    /// ailments. `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.english_name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .uses
                .iter()
                .any(|use_tag| use_tag.to_lowercase().contains(needle))
            || self
                .ailments
                .iter()
                .any(|ailment| ailment.to_lowercase().contains(needle))
    }
}

/// One complete, validated snapshot of the catalogue.
///
/// The wire and cache format is a JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogPayload {
    pub entries: Vec<CatalogEntry>,
}

impl CatalogPayload {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode and validate a serialized catalogue payload.
///
/// Validation rejects empty ids, negative or non-finite carbohydrate values,
/// and duplicate ids within the payload. Any single bad entry fails the
/// whole payload.
pub fn decode_payload(text: &str) -> Result<CatalogPayload, DecodeError> {
    let payload: CatalogPayload = serde_json::from_str(text).map_err(DecodeError::Json)?;

    let mut seen_ids = HashSet::new();
    for (index, entry) in payload.entries.iter().enumerate() {
        if entry.id.is_empty() {
            return Err(DecodeError::InvalidEntry {
                index,
                reason: "empty id".to_string(),
            });
        }
        if !entry.nutrition.carbohydrates.is_finite() || entry.nutrition.carbohydrates < 0.0 {
            return Err(DecodeError::InvalidEntry {
                index,
                reason: format!(
                    "carbohydrates must be a non-negative number, got {}",
                    entry.nutrition.carbohydrates
                ),
            });
        }
        if !seen_ids.insert(entry.id.as_str()) {
            return Err(DecodeError::DuplicateId {
                id: entry.id.clone(),
            });
        }
    }

    Ok(payload)
}
