//! Computed dosage results kept per catalogue entry.
//!
//! At most one live result exists per entry; recomputing replaces the
//! previous result. Results are removed explicitly, never expired.

use std::collections::HashMap;

use crate::dosage::DosageResult;

#[derive(Debug, Clone, Default)]
pub struct DosageLog {
    results: HashMap<String, DosageResult>,
}

impl DosageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing any previous one for the same entry.
    pub fn insert(&mut self, result: DosageResult) -> Option<DosageResult> {
        self.results.insert(result.entry_id.clone(), result)
    }

    pub fn get(&self, entry_id: &str) -> Option<&DosageResult> {
        self.results.get(entry_id)
    }

    pub fn remove(&mut self, entry_id: &str) -> Option<DosageResult> {
        self.results.remove(entry_id)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DosageResult> {
        self.results.values()
    }
}
