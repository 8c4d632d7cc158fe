//! Session cache over persistent key-value storage.
//!
//! Holds exactly two fields, `uid` and `role`, as a page-load hint so a
//! returning visitor can be routed before the authoritative record has been
//! re-read. The document store is the source of truth: the cache is
//! overwritten whenever a fresh role resolution succeeds and cleared on
//! logout or when an account turns out to be disabled.

use std::str::FromStr;
use std::sync::Arc;

use pharma_direct_core::{Role, Uid};

use crate::ports::KeyValueStorage;

/// Storage keys for the cached session fields.
pub mod keys {
    /// Provider-assigned identifier of the signed-in user.
    pub const UID: &str = "uid";
    /// Last role resolved for that user.
    pub const ROLE: &str = "role";
}

/// Cached `{uid, role}` pair over the host's persistent storage.
#[derive(Clone)]
pub struct SessionCache {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionCache {
    /// Wrap the host's storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Store the pair.
    ///
    /// Best effort: a rejected write is logged and ignored. The session
    /// stays valid either way, the next page load just cannot use the hint.
    pub fn store(&self, uid: &Uid, role: Role) {
        if let Err(err) = self.storage.set(keys::UID, uid.as_str()) {
            tracing::debug!(error = %err, "session cache uid write rejected");
        }
        if let Err(err) = self.storage.set(keys::ROLE, role.as_str()) {
            tracing::debug!(error = %err, "session cache role write rejected");
        }
    }

    /// The cached uid, if present.
    #[must_use]
    pub fn uid(&self) -> Option<Uid> {
        self.storage.get(keys::UID).map(Uid::new)
    }

    /// The cached role, if present and well-formed.
    ///
    /// A value that does not parse as a [`Role`] is treated as absent; the
    /// cache is a hint, never an authority.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        let raw = self.storage.get(keys::ROLE)?;
        match Role::from_str(&raw) {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unparseable cached role");
                None
            }
        }
    }

    /// Remove both fields.
    pub fn clear(&self) {
        self.storage.remove(keys::UID);
        self.storage.remove(keys::ROLE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStorage;

    fn cache() -> (Arc<MemoryStorage>, SessionCache) {
        let storage = Arc::new(MemoryStorage::new());
        let cache = SessionCache::new(storage.clone());
        (storage, cache)
    }

    #[test]
    fn test_store_and_read_back() {
        let (_storage, cache) = cache();
        cache.store(&Uid::from("abc123"), Role::Pharmacy);

        assert_eq!(cache.uid(), Some(Uid::from("abc123")));
        assert_eq!(cache.role(), Some(Role::Pharmacy));
    }

    #[test]
    fn test_clear_removes_both_fields() {
        let (storage, cache) = cache();
        cache.store(&Uid::from("abc123"), Role::Admin);
        cache.clear();

        assert_eq!(cache.uid(), None);
        assert_eq!(cache.role(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_unparseable_role_treated_as_absent() {
        let (storage, cache) = cache();
        storage.seed(keys::UID, "abc123");
        storage.seed(keys::ROLE, "superuser");

        assert_eq!(cache.uid(), Some(Uid::from("abc123")));
        assert_eq!(cache.role(), None);
    }

    #[test]
    fn test_rejected_write_is_swallowed() {
        let (storage, cache) = cache();
        storage.fail_sets(true);
        cache.store(&Uid::from("abc123"), Role::User);

        assert_eq!(cache.uid(), None);
        assert_eq!(cache.role(), None);
    }
}
