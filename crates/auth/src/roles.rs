//! Typed access to the per-user and pharmacy partner documents.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use pharma_direct_core::{Role, Uid};

use crate::config::Collections;
use crate::models::{PharmacyRecord, UserRecord};
use crate::ports::{DocumentStore, StoreError, WriteMode};

/// Thin wrapper over the hosted document store for the records this library
/// owns.
///
/// Reads are side-effect free and never retried; each caller decides its own
/// fallback when one fails.
#[derive(Clone)]
pub struct RoleStore {
    store: Arc<dyn DocumentStore>,
    collections: Collections,
}

impl RoleStore {
    /// Wrap the host's document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, collections: Collections) -> Self {
        Self { store, collections }
    }

    /// Resolve the role denormalized onto a user's record.
    ///
    /// A missing record, a record without a `role` field, and a `role` field
    /// that does not parse all resolve to [`Role::User`]. Only the read
    /// itself failing is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    pub async fn fetch_role(&self, uid: &Uid) -> Result<Role, StoreError> {
        let Some(doc) = self.store.read(self.collections.users(), uid.as_str()).await? else {
            return Ok(Role::default());
        };

        let role = doc
            .get("role")
            .and_then(Value::as_str)
            .and_then(|raw| Role::from_str(raw).ok())
            .unwrap_or_default();
        Ok(role)
    }

    /// Fetch the full user record, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails, or when the document is
    /// so mangled it does not deserialize even with lenient defaults.
    pub async fn fetch_record(&self, uid: &Uid) -> Result<Option<UserRecord>, StoreError> {
        match self.store.read(self.collections.users(), uid.as_str()).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Write the record for a freshly registered user.
    pub(crate) async fn create_user_record(
        &self,
        uid: &Uid,
        record: &UserRecord,
    ) -> Result<(), StoreError> {
        let doc = serde_json::to_value(record)?;
        self.store
            .write(self.collections.users(), uid.as_str(), doc, WriteMode::Overwrite)
            .await
    }

    /// Merge-write the pharmacy partner record, preserving any fields an
    /// administrator pre-provisioned.
    pub(crate) async fn upsert_pharmacy_record(
        &self,
        uid: &Uid,
        record: &PharmacyRecord,
    ) -> Result<(), StoreError> {
        let doc = serde_json::to_value(record)?;
        self.store
            .write(self.collections.pharmacies(), uid.as_str(), doc, WriteMode::Merge)
            .await
    }
}
