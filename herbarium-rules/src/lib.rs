//! Domain rules for the herb catalogue: health profiles, preparation
//! tables, dosage computation and persisted favorites.
//!
//! Everything here is deterministic over its inputs; the only I/O is the
//! file-backed favorites store.

mod dosage;
mod dosage_log;
mod favorites;
mod preparation;
mod profile;

pub use dosage::{compute_dosage, DosageResult, Severity};
pub use dosage_log::DosageLog;
pub use favorites::{FavoriteRecord, Favorites, FavoritesError, FavoritesGuard, Locked, Unlocked};
pub use preparation::{preparation_for, PreparationSpec};
pub use profile::{
    HealthProfile, Height, HeightUnit, ProfileError, Weight, WeightUnit,
};
