//! Document store contract.

use async_trait::async_trait;
use serde_json::Value;

/// How a write treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the document wholesale.
    Overwrite,
    /// Shallow-merge the given fields into the existing document, creating
    /// it if absent. Fields not named in the write are left untouched.
    Merge,
}

/// Errors surfaced by the hosted document store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or the call timed out.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    /// The store rejected the call under its security rules.
    #[error("document store permission denied")]
    PermissionDenied,
    /// A fetched document did not match the expected shape.
    #[error("document malformed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Contract for the hosted document database.
///
/// Documents are addressed by `(collection, id)` and carry free-form JSON.
/// The schema is shared with external administrative tooling that mutates
/// these documents out-of-band, so readers must stay lenient about missing
/// or extra fields.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a document.
    async fn write(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Read a document. Absence is `Ok(None)`, not an error.
    async fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
}
