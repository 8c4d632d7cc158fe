//! In-memory key-value storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ports::{KeyValueStorage, StorageError};

/// In-memory stand-in for origin-scoped persistent storage.
///
/// Writes can be made to fail, mirroring quota exhaustion and restrictive
/// private-browsing modes; reads and removals never fail, as in the real
/// surface.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    fail_sets: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value directly, bypassing failure injection.
    ///
    /// Stands in for state left behind by a previous page load.
    pub fn seed(&self, key: &str, value: &str) {
        self.values().insert(key.to_owned(), value.to_owned());
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Make subsequent `set` calls fail.
    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(StorageError::new("injected quota exhaustion"));
        }

        self.values().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.values().remove(key);
    }
}
