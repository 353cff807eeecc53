//! Personal health profile consumed by the dosage rules.
//!
//! The profile is a read-only input here; ownership and persistence belong
//! to the consumer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("weight must be positive, got {0}")]
    NonPositiveWeight(f64),
    #[error("height must be positive, got {0}")]
    NonPositiveHeight(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Kg,
    Lb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightUnit {
    Cm,
    In,
}

/// Unit-tagged body weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn kilograms(&self) -> f64 {
        match self.unit {
            WeightUnit::Kg => self.value,
            WeightUnit::Lb => self.value * 0.453_592,
        }
    }
}

/// Unit-tagged body height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Height {
    pub value: f64,
    pub unit: HeightUnit,
}

impl Height {
    pub fn centimeters(&self) -> f64 {
        match self.unit {
            HeightUnit::Cm => self.value,
            HeightUnit::In => self.value * 2.54,
        }
    }
}

/// A user's health profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub age_years: u32,
    pub weight: Weight,
    pub height: Height,
    pub conditions: BTreeSet<String>,
    pub allergies: BTreeSet<String>,
    pub medications: BTreeSet<String>,
    pub pregnant: bool,
    pub nursing: bool,
}

impl HealthProfile {
    /// Build a profile, rejecting non-positive weight or height.
    pub fn new(age_years: u32, weight: Weight, height: Height) -> Result<Self, ProfileError> {
        if !weight.value.is_finite() || weight.value <= 0.0 {
            return Err(ProfileError::NonPositiveWeight(weight.value));
        }
        if !height.value.is_finite() || height.value <= 0.0 {
            return Err(ProfileError::NonPositiveHeight(height.value));
        }
        Ok(Self {
            age_years,
            weight,
            height,
            conditions: BTreeSet::new(),
            allergies: BTreeSet::new(),
            medications: BTreeSet::new(),
            pregnant: false,
            nursing: false,
        })
    }
}
