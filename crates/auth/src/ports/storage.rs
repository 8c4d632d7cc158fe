//! Persistent key-value storage contract.

/// Error raised when a storage write is rejected.
///
/// Browsers reject writes when the origin's quota is exhausted or in
/// certain private-browsing modes.
#[derive(thiserror::Error, Debug, Clone)]
#[error("storage write rejected: {0}")]
pub struct StorageError(String);

impl StorageError {
    /// Describe why the write was rejected.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Contract for origin-scoped persistent key-value storage.
///
/// Matches the synchronous browser storage surface: reads and removals never
/// fail observably, writes may be rejected. Contents survive page loads and
/// are cleared only by this library (logout and disabled-account teardown).
pub trait KeyValueStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the underlying storage rejects the
    /// write. Callers treat the stored data as best effort.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}
