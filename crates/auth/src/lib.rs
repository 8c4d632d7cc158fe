//! Pharma Direct session library.
//!
//! Client-side authentication and role routing for the Pharma Direct
//! storefront, built on a hosted identity provider and a hosted document
//! database that the host application supplies through port traits.
//!
//! # Architecture
//!
//! - [`ports`] - contracts for the hosted identity provider, the document
//!   store, browser navigation, and persistent key-value storage
//! - [`IdentityGateway`] - register / login / logout over those ports
//! - [`RoleStore`] - typed access to the per-user and pharmacy records
//! - [`SessionCache`] - the persistent `{uid, role}` page-load hint
//! - [`SessionCoordinator`] - watches auth-state events, reconciles cached
//!   against authoritative role, enforces the disabled-account rule, and
//!   routes the browser to the signed-in role's area
//! - [`testing`] - in-memory port doubles
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pharma_direct_auth::testing::{
//!     FakeNavigator, MemoryDocumentStore, MemoryIdentityProvider, MemoryStorage,
//! };
//! use pharma_direct_auth::{IdentityGateway, SessionConfig, SessionCoordinator};
//! use pharma_direct_core::Area;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = Arc::new(MemoryIdentityProvider::new());
//! let store = Arc::new(MemoryDocumentStore::new());
//! let storage = Arc::new(MemoryStorage::new());
//! let navigator = Arc::new(FakeNavigator::new(Area::Login));
//!
//! let config = SessionConfig::default();
//! let gateway = IdentityGateway::new(provider, store, storage, navigator, &config);
//! let coordinator = SessionCoordinator::new(gateway.clone(), &config);
//!
//! // On page load: reconcile any restored session, then follow live events.
//! coordinator.bootstrap().await;
//! let subscription = coordinator.watch();
//! # drop(subscription);
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod models;
pub mod ports;
pub mod roles;
pub mod testing;

pub use cache::SessionCache;
pub use config::{Collections, ConfigError, DEFAULT_REDIRECT_COOLDOWN, SessionConfig};
pub use coordinator::{SessionCoordinator, SessionPhase, Subscription};
pub use error::AuthError;
pub use gateway::{IdentityGateway, Registration};
pub use models::{PharmacyRecord, UserRecord};
pub use roles::RoleStore;
