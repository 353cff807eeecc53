//! Deterministic dosage computation over an entry, a health profile and a
//! condition severity.
//!
//! Pure lookup tables and fixed multipliers; no state, no I/O.

use herbarium_catalog::{CatalogEntry, HerbCategory};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::preparation::{preparation_for, PreparationSpec};
use crate::profile::HealthProfile;

/// Base cups per day before any adjustment.
const BASE_CUPS_PER_DAY: f64 = 2.0;

/// Condition severity reported by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Fixed dosage multiplier per severity level.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Mild => 0.7,
            Self::Moderate => 1.0,
            Self::Severe => 1.3,
        }
    }
}

/// A computed recommendation for one catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageResult {
    pub entry_id: String,
    pub cups_per_day: f64,
    pub preparation: PreparationSpec,
    /// Human-readable summary of the recommendation.
    pub recommendation: String,
    pub warnings: Vec<String>,
    #[serde(with = "time::serde::iso8601")]
    pub computed_at: OffsetDateTime,
}

/// Age-bracket adjustment. Takes precedence over the weight-based one.
fn age_adjustment(age_years: u32) -> Option<f64> {
    match age_years {
        0..=11 => Some(0.5),
        12..=17 => Some(0.75),
        65.. => Some(0.75),
        _ => None,
    }
}

/// Weight-band adjustment applied only when no age bracket matches.
fn weight_adjustment(weight_kg: f64) -> f64 {
    if weight_kg < 50.0 {
        0.8
    } else if weight_kg <= 80.0 {
        1.0
    } else {
        1.2
    }
}

fn body_adjustment(profile: &HealthProfile) -> f64 {
    age_adjustment(profile.age_years)
        .unwrap_or_else(|| weight_adjustment(profile.weight.kilograms()))
}

fn safety_warnings(entry: &CatalogEntry, profile: &HealthProfile) -> Vec<String> {
    let mut warnings = Vec::new();

    if profile.pregnant {
        warnings.push(format!(
            "Consult a professional before using {} during pregnancy.",
            entry.english_name
        ));
    }
    if profile.nursing {
        warnings.push(format!(
            "Consult a professional before using {} while nursing.",
            entry.english_name
        ));
    }

    match entry.category_kind() {
        HerbCategory::Bark | HerbCategory::Root => {
            warnings.push(
                "Strong decoctions should not be taken continuously for more than two weeks."
                    .to_string(),
            );
        },
        HerbCategory::Tonic | HerbCategory::MixedTonic => {
            warnings
                .push("Tonics can interact with prescription medication.".to_string());
        },
        _ => {},
    }

    if !profile.medications.is_empty() {
        warnings.push(format!(
            "You take {} medication(s); check for interactions first.",
            profile.medications.len()
        ));
    }

    let allergy_hit = profile.allergies.iter().find(|allergy| {
        let allergy = allergy.to_lowercase();
        entry.english_name.to_lowercase().contains(&allergy)
            || entry.scientific_name.to_lowercase().contains(&allergy)
    });
    if let Some(allergy) = allergy_hit {
        warnings.push(format!(
            "Your allergy profile lists \"{allergy}\"; avoid this remedy."
        ));
    }

    if !entry.precautions.is_empty() {
        warnings.push(entry.precautions.clone());
    }

    warnings
}

/// Compute a dosage recommendation.
///
/// The severity multiplier (0.7 / 1.0 / 1.3) is scaled by an age-bracket
/// factor when one applies, otherwise by the weight band. Output is rounded
/// to a quarter cup with a half-cup floor.
pub fn compute_dosage(
    entry: &CatalogEntry,
    profile: &HealthProfile,
    severity: Severity,
) -> DosageResult {
    let preparation = preparation_for(entry.category_kind());

    let raw_cups = BASE_CUPS_PER_DAY * severity.multiplier() * body_adjustment(profile);
    let cups_per_day = ((raw_cups * 4.0).round() / 4.0).max(0.5);

    let recommendation = format!(
        "{:.1} g per cup, {} cup(s) per day. Steep for {} minutes at {} °C.",
        preparation.herb_grams_per_cup,
        cups_per_day,
        preparation.steep_minutes,
        preparation.water_temp_c,
    );

    DosageResult {
        entry_id: entry.id.clone(),
        cups_per_day,
        preparation,
        recommendation,
        warnings: safety_warnings(entry, profile),
        computed_at: OffsetDateTime::now_utc(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use herbarium_catalog::{Continent, Nutrition};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::profile::{Height, HeightUnit, Weight, WeightUnit};

    fn entry(category: &str) -> CatalogEntry {
        CatalogEntry {
            id: "ginger".to_string(),
            english_name: "Ginger Root".to_string(),
            local_names: BTreeMap::new(),
            scientific_name: "Zingiber officinale".to_string(),
            description: "Pungent rhizome.".to_string(),
            uses: vec!["digestion".to_string()],
            category: category.to_string(),
            vitamins: vec![],
            nutrition: Nutrition {
                calories: 80,
                carbohydrates: 17.8,
            },
            ailments: vec!["nausea".to_string()],
            locations: vec![],
            preparation: "Simmer sliced root.".to_string(),
            dosage: "Up to three cups daily.".to_string(),
            precautions: String::new(),
            honey_usage: String::new(),
            continents: vec![Continent::Africa],
            wikipedia_url: String::new(),
        }
    }

    fn profile(age_years: u32, weight_kg: f64) -> HealthProfile {
        HealthProfile::new(
            age_years,
            Weight {
                value: weight_kg,
                unit: WeightUnit::Kg,
            },
            Height {
                value: 170.0,
                unit: HeightUnit::Cm,
            },
        )
        .unwrap()
    }

    #[test]
    fn severity_scales_the_base_dose() {
        let entry = entry("root");
        let adult = profile(30, 70.0);

        let mild = compute_dosage(&entry, &adult, Severity::Mild);
        let moderate = compute_dosage(&entry, &adult, Severity::Moderate);
        let severe = compute_dosage(&entry, &adult, Severity::Severe);

        assert_eq!(mild.cups_per_day, 1.5);
        assert_eq!(moderate.cups_per_day, 2.0);
        assert_eq!(severe.cups_per_day, 2.5);
    }

    #[test]
    fn age_bracket_overrides_weight_adjustment() {
        let entry = entry("herb");
        // heavy child: the child bracket (0.5) must win over the
        // heavy-weight band (1.2)
        let child = profile(9, 90.0);
        let result = compute_dosage(&entry, &child, Severity::Moderate);
        assert_eq!(result.cups_per_day, 1.0);
    }

    #[test]
    fn weight_band_applies_to_unbracketed_adults() {
        let entry = entry("herb");

        let light = compute_dosage(&entry, &profile(30, 45.0), Severity::Moderate);
        let heavy = compute_dosage(&entry, &profile(30, 95.0), Severity::Moderate);

        assert_eq!(light.cups_per_day, 1.5);
        assert_eq!(heavy.cups_per_day, 2.5);
    }

    #[test]
    fn elderly_bracket_reduces_the_dose() {
        let entry = entry("herb");
        let elderly = compute_dosage(&entry, &profile(70, 85.0), Severity::Moderate);
        assert_eq!(elderly.cups_per_day, 1.5);
    }

    #[test]
    fn dose_never_rounds_below_half_a_cup() {
        let entry = entry("herb");
        let result = compute_dosage(&entry, &profile(5, 18.0), Severity::Mild);
        assert!(result.cups_per_day >= 0.5);
    }

    #[test]
    fn pregnancy_and_category_warnings_are_collected() {
        let entry = entry("root");
        let mut pregnant = profile(30, 70.0);
        pregnant.pregnant = true;

        let result = compute_dosage(&entry, &pregnant, Severity::Moderate);
        assert!(result
            .warnings
            .iter()
            .any(|warning| warning.contains("pregnancy")));
        assert!(result
            .warnings
            .iter()
            .any(|warning| warning.contains("decoctions")));
    }

    #[test]
    fn allergy_match_produces_a_warning() {
        let entry = entry("root");
        let mut allergic = profile(30, 70.0);
        allergic.allergies.insert("ginger".to_string());

        let result = compute_dosage(&entry, &allergic, Severity::Moderate);
        assert!(result
            .warnings
            .iter()
            .any(|warning| warning.contains("allergy")));
    }

    #[test]
    fn computation_is_deterministic() {
        let entry = entry("tonic");
        let adult = profile(30, 70.0);

        let first = compute_dosage(&entry, &adult, Severity::Severe);
        let second = compute_dosage(&entry, &adult, Severity::Severe);
        assert_eq!(first.cups_per_day, second.cups_per_day);
        assert_eq!(first.recommendation, second.recommendation);
        assert_eq!(first.warnings, second.warnings);
    }
}
