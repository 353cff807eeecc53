//! Persisted favorites: catalogue entry ids the user starred, with an
//! optional rating.
//!
//! A guard is created in an [`Unlocked`] state, in which the favorites can
//! be read but not written. Locking the guard takes a file lock for
//! exclusive access, allowing mutation and a [`FavoritesGuard::commit`] back
//! to the file. Uncommitted mutations are discarded on drop.

use std::fs;
use std::path::{Path, PathBuf};

use fslock::LockFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

const FAVORITES_FILE_NAME: &str = "favorites.json";

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("failed to acquire favorites lock")]
    Lock(#[source] fslock::Error),
    #[error("failed to read favorites")]
    Read(#[source] std::io::Error),
    #[error("failed to write favorites")]
    Write(#[source] std::io::Error),
    #[error("failed to parse favorites")]
    Deserialize(#[source] serde_json::Error),
    #[error("failed to serialize favorites")]
    Serialize(#[source] serde_json::Error),
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("`{0}` is not a favorite")]
    NotFavorite(String),
}

/// One favorite entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub entry_id: String,
    /// 1 to 5, if the user rated the entry.
    pub rating: Option<u8>,
    #[serde(with = "time::serde::iso8601")]
    pub added_at: OffsetDateTime,
}

/// The in-memory favorites collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    records: Vec<FavoriteRecord>,
}

impl Favorites {
    pub fn is_favorite(&self, entry_id: &str) -> bool {
        self.records.iter().any(|record| record.entry_id == entry_id)
    }

    pub fn rating_of(&self, entry_id: &str) -> Option<u8> {
        self.records
            .iter()
            .find(|record| record.entry_id == entry_id)
            .and_then(|record| record.rating)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add an entry. Adding an existing favorite again is a no-op.
    pub fn add(&mut self, entry_id: impl Into<String>, added_at: OffsetDateTime) {
        let entry_id = entry_id.into();
        if self.is_favorite(&entry_id) {
            return;
        }
        self.records.push(FavoriteRecord {
            entry_id,
            rating: None,
            added_at,
        });
    }

    /// Remove an entry; returns whether it was present.
    pub fn remove(&mut self, entry_id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.entry_id != entry_id);
        self.records.len() != before
    }

    /// Rate an existing favorite, 1 to 5.
    pub fn rate(&mut self, entry_id: &str, rating: u8) -> Result<(), FavoritesError> {
        if !(1..=5).contains(&rating) {
            return Err(FavoritesError::InvalidRating(rating));
        }
        let record = self
            .records
            .iter_mut()
            .find(|record| record.entry_id == entry_id)
            .ok_or_else(|| FavoritesError::NotFavorite(entry_id.to_string()))?;
        record.rating = Some(rating);
        Ok(())
    }
}

/// A guard for the favorites file.
#[derive(Debug)]
pub struct FavoritesGuard<LockState> {
    favorites: Favorites,
    favorites_path: PathBuf,
    _lock: LockState,
}

/// The state marker for an unlocked guard.
#[derive(Debug)]
pub struct Unlocked;

/// The state marker for a locked guard.
/// Holds a file lock preventing concurrent writes to the favorites file.
#[derive(Debug)]
pub struct Locked {
    _lock: LockFile,
}

impl<L> FavoritesGuard<L> {
    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }
}

impl FavoritesGuard<Unlocked> {
    /// Read the favorites stored under `data_dir` and return an unlocked
    /// guard. A missing file yields an empty collection.
    pub fn read_in(data_dir: impl AsRef<Path>) -> Result<Self, FavoritesError> {
        let favorites_path = data_dir.as_ref().join(FAVORITES_FILE_NAME);
        let favorites = read_favorites(&favorites_path)?;

        debug!(?favorites_path, count = favorites.len(), "read favorites");

        Ok(FavoritesGuard {
            favorites,
            favorites_path,
            _lock: Unlocked,
        })
    }

    /// Attempt to lock the guard for mutation.
    ///
    /// If the lock is already taken this returns `Ok(Err(self))` without
    /// waiting.
    pub fn lock_if_unlocked(
        self,
    ) -> Result<Result<FavoritesGuard<Locked>, Self>, FavoritesError> {
        let Some(lock) = try_acquire_lock(&self.favorites_path)? else {
            debug!(favorites_path=?self.favorites_path, "favorites lock already taken");
            return Ok(Err(self));
        };

        Ok(Ok(FavoritesGuard {
            favorites: self.favorites,
            favorites_path: self.favorites_path,
            _lock: Locked { _lock: lock },
        }))
    }
}

impl FavoritesGuard<Locked> {
    pub fn favorites_mut(&mut self) -> &mut Favorites {
        &mut self.favorites
    }

    /// Write the current state back to the favorites file.
    pub fn commit(&self) -> Result<(), FavoritesError> {
        if let Some(parent) = self.favorites_path.parent() {
            fs::create_dir_all(parent).map_err(FavoritesError::Write)?;
        }

        let favorites_str =
            serde_json::to_string(&self.favorites).map_err(FavoritesError::Serialize)?;
        fs::write(&self.favorites_path, favorites_str).map_err(FavoritesError::Write)?;

        debug!(favorites_path=?self.favorites_path, count = self.favorites.len(), "wrote favorites");
        Ok(())
    }
}

/// Tries to acquire the favorites file lock without waiting.
fn try_acquire_lock(favorites_path: impl AsRef<Path>) -> Result<Option<LockFile>, FavoritesError> {
    let lock_path = favorites_path.as_ref().with_extension("lock");

    let mut lock = LockFile::open(&lock_path).map_err(FavoritesError::Lock)?;

    if !lock.try_lock().map_err(FavoritesError::Lock)? {
        return Ok(None);
    }

    Ok(Some(lock))
}

fn read_favorites(favorites_path: impl AsRef<Path>) -> Result<Favorites, FavoritesError> {
    if !favorites_path.as_ref().exists() {
        return Ok(Favorites::default());
    }

    let favorites_str = fs::read_to_string(favorites_path).map_err(FavoritesError::Read)?;
    serde_json::from_str(&favorites_str).map_err(FavoritesError::Deserialize)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    use super::*;

    const ADDED_AT: OffsetDateTime = datetime!(2026-08-01 12:00:00 UTC);

    #[test]
    fn favorites_are_empty_if_absent() {
        let temp_dir = tempfile::tempdir().unwrap();

        let guard = FavoritesGuard::read_in(temp_dir.path()).unwrap();
        assert!(guard.favorites().is_empty());
    }

    #[test]
    fn mutations_are_discarded_if_not_committed() {
        let temp_dir = tempfile::tempdir().unwrap();

        let guard = FavoritesGuard::read_in(temp_dir.path()).unwrap();
        let mut locked = guard.lock_if_unlocked().unwrap().unwrap();
        locked.favorites_mut().add("hibiscus", ADDED_AT);
        drop(locked);

        let guard = FavoritesGuard::read_in(temp_dir.path()).unwrap();
        assert!(guard.favorites().is_empty());
    }

    #[test]
    fn committed_favorites_survive_reload() {
        let temp_dir = tempfile::tempdir().unwrap();

        let guard = FavoritesGuard::read_in(temp_dir.path()).unwrap();
        let mut locked = guard.lock_if_unlocked().unwrap().unwrap();
        locked.favorites_mut().add("hibiscus", ADDED_AT);
        locked.favorites_mut().rate("hibiscus", 4).unwrap();
        locked.commit().unwrap();
        drop(locked);

        let guard = FavoritesGuard::read_in(temp_dir.path()).unwrap();
        assert!(guard.favorites().is_favorite("hibiscus"));
        assert_eq!(guard.favorites().rating_of("hibiscus"), Some(4));
    }

    #[test]
    fn lock_does_not_wait_if_taken() {
        let temp_dir = tempfile::tempdir().unwrap();

        let first = FavoritesGuard::read_in(temp_dir.path())
            .unwrap()
            .lock_if_unlocked()
            .unwrap()
            .unwrap();

        let second = FavoritesGuard::read_in(temp_dir.path())
            .unwrap()
            .lock_if_unlocked()
            .unwrap();
        assert!(second.is_err());

        drop(first);
    }

    #[test]
    fn rating_is_validated() {
        let mut favorites = Favorites::default();
        favorites.add("ginger", ADDED_AT);

        assert!(matches!(
            favorites.rate("ginger", 0),
            Err(FavoritesError::InvalidRating(0))
        ));
        assert!(matches!(
            favorites.rate("ginger", 6),
            Err(FavoritesError::InvalidRating(6))
        ));
        assert!(matches!(
            favorites.rate("moringa", 3),
            Err(FavoritesError::NotFavorite(_))
        ));
        favorites.rate("ginger", 5).unwrap();
        assert_eq!(favorites.rating_of("ginger"), Some(5));
    }

    #[test]
    fn adding_twice_is_a_no_op_and_remove_reports_presence() {
        let mut favorites = Favorites::default();
        favorites.add("ginger", ADDED_AT);
        favorites.add("ginger", ADDED_AT);
        assert_eq!(favorites.len(), 1);

        assert!(favorites.remove("ginger"));
        assert!(!favorites.remove("ginger"));
    }
}
