//! Fixed preparation constants per herb category.

use herbarium_catalog::HerbCategory;
use serde::{Deserialize, Serialize};

/// Ratio, time and temperature for preparing one cup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreparationSpec {
    /// Dried material per cup of water.
    pub herb_grams_per_cup: f64,
    pub steep_minutes: u32,
    pub water_temp_c: u32,
}

/// Look up the preparation constants for a category.
///
/// Roots and barks are decocted at a boil; leafy material steeps cooler and
/// shorter.
pub fn preparation_for(category: HerbCategory) -> PreparationSpec {
    match category {
        HerbCategory::Herb => PreparationSpec {
            herb_grams_per_cup: 2.0,
            steep_minutes: 5,
            water_temp_c: 85,
        },
        HerbCategory::Root => PreparationSpec {
            herb_grams_per_cup: 3.0,
            steep_minutes: 10,
            water_temp_c: 100,
        },
        HerbCategory::Bark => PreparationSpec {
            herb_grams_per_cup: 3.0,
            steep_minutes: 15,
            water_temp_c: 100,
        },
        HerbCategory::Tonic => PreparationSpec {
            herb_grams_per_cup: 2.5,
            steep_minutes: 8,
            water_temp_c: 95,
        },
        HerbCategory::MixedTonic => PreparationSpec {
            herb_grams_per_cup: 2.5,
            steep_minutes: 10,
            water_temp_c: 95,
        },
        HerbCategory::Refresher => PreparationSpec {
            herb_grams_per_cup: 1.5,
            steep_minutes: 4,
            water_temp_c: 80,
        },
        HerbCategory::Spice => PreparationSpec {
            herb_grams_per_cup: 1.0,
            steep_minutes: 6,
            water_temp_c: 95,
        },
        HerbCategory::Other => PreparationSpec {
            herb_grams_per_cup: 2.0,
            steep_minutes: 5,
            water_temp_c: 90,
        },
    }
}
