//! In-memory document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{DocumentStore, StoreError, WriteMode};

type Collections = HashMap<String, HashMap<String, Value>>;

/// In-memory stand-in for the hosted document database.
///
/// Merge writes shallow-merge top-level fields, matching the hosted store's
/// set-with-merge semantics. Read and write failures can be injected to
/// exercise degraded paths.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<Collections>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing failure injection.
    ///
    /// Stands in for state written by external administrative tooling.
    pub fn insert(&self, collection: &str, id: &str, document: Value) {
        self.collections()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), document);
    }

    /// Inspect a document directly, bypassing failure injection.
    #[must_use]
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Make subsequent reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn collections(&self) -> MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn write(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_owned()));
        }

        let mut collections = self.collections();
        let docs = collections.entry(collection.to_owned()).or_default();
        match mode {
            WriteMode::Overwrite => {
                docs.insert(id.to_owned(), document);
            }
            WriteMode::Merge => match (docs.get_mut(id), document) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    for (key, value) in incoming {
                        existing.insert(key, value);
                    }
                }
                (_, document) => {
                    docs.insert(id.to_owned(), document);
                }
            },
        }
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_owned()));
        }

        Ok(self.document(collection, id))
    }
}
