//! Contracts for the hosted services this library coordinates.
//!
//! The vendor SDKs are not reimplemented here. A host application implements
//! these traits against its actual bindings (hosted identity SDK, hosted
//! document database, browser location, origin-scoped storage) and hands them
//! to the gateway and coordinator. The [`crate::testing`] module ships
//! in-memory implementations of all four.

mod identity;
mod navigation;
mod storage;
mod store;

pub use identity::{AuthEvent, AuthUser, IdentityError, IdentityProvider};
pub use navigation::{NavigateError, Navigator};
pub use storage::{KeyValueStorage, StorageError};
pub use store::{DocumentStore, StoreError, WriteMode};

pub(crate) use navigation::navigate;
