//! Integration tests for Pharma Direct session handling.
//!
//! Every scenario runs against the in-memory port doubles from
//! [`pharma_direct_auth::testing`], so no hosted identity provider or
//! document database is involved and `cargo test` works offline.
//!
//! The [`TestContext`] wires a full session stack (provider, store,
//! storage, navigator, gateway, coordinator) the same way a host
//! application's composition root would.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Once};
use std::time::Duration;

use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use pharma_direct_auth::ports::AuthUser;
use pharma_direct_auth::testing::{
    FakeNavigator, MemoryDocumentStore, MemoryIdentityProvider, MemoryStorage,
};
use pharma_direct_auth::{IdentityGateway, Registration, SessionConfig, SessionCoordinator};
use pharma_direct_core::{Area, Email, Role};

/// A fully wired session stack over in-memory doubles.
pub struct TestContext {
    /// Identity provider double.
    pub provider: Arc<MemoryIdentityProvider>,
    /// Document store double.
    pub store: Arc<MemoryDocumentStore>,
    /// Key-value storage double.
    pub storage: Arc<MemoryStorage>,
    /// Recording navigator double.
    pub navigator: Arc<FakeNavigator>,
    /// Gateway over the doubles.
    pub gateway: IdentityGateway,
    /// Coordinator over the same gateway.
    pub coordinator: SessionCoordinator,
}

static TRACING: Once = Once::new();

/// Route the library's tracing output through the test harness.
///
/// Honors `RUST_LOG`, defaulting to warnings so failing tests stay readable.
fn init_tracing() {
    TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

impl TestContext {
    /// Wire a fresh stack with the browser sitting in `area`.
    #[must_use]
    pub fn new(area: Area) -> Self {
        init_tracing();

        let provider = Arc::new(MemoryIdentityProvider::new());
        let store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(FakeNavigator::new(area));

        let config = SessionConfig::default();
        let gateway = IdentityGateway::new(
            provider.clone(),
            store.clone(),
            storage.clone(),
            navigator.clone(),
            &config,
        );
        let coordinator = SessionCoordinator::new(gateway.clone(), &config);

        Self {
            provider,
            store,
            storage,
            navigator,
            gateway,
            coordinator,
        }
    }

    /// Register an account through the gateway, leaving it signed in.
    ///
    /// # Panics
    ///
    /// Panics when registration fails; use the gateway directly to test
    /// failure paths.
    pub async fn register(&self, email: &str, role: Role) -> AuthUser {
        self.gateway
            .register(registration(email, role))
            .await
            .expect("registration should succeed")
    }

    /// Sign in through the gateway with the password [`registration`] uses.
    ///
    /// # Panics
    ///
    /// Panics when sign-in fails; use the gateway directly to test failure
    /// paths.
    pub async fn login(&self, email: &str) -> AuthUser {
        self.gateway
            .login(&parse_email(email), &SecretString::from("correct horse"))
            .await
            .expect("login should succeed")
    }
}

/// A plausible registration request for `email`.
///
/// # Panics
///
/// Panics when `email` does not parse.
#[must_use]
pub fn registration(email: &str, role: Role) -> Registration {
    Registration {
        name: "Amina Yusuf".to_owned(),
        email: parse_email(email),
        password: SecretString::from("correct horse"),
        phone: Some("+2348000000000".to_owned()),
        role,
    }
}

/// Parse an email, panicking on bad test input.
///
/// # Panics
///
/// Panics when `email` does not parse.
#[must_use]
pub fn parse_email(email: &str) -> Email {
    Email::parse(email).expect("test email should parse")
}

/// Poll until `condition` holds.
///
/// # Panics
///
/// Panics when the condition is still false after roughly half a second.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..50 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(condition(), "condition did not become true in time");
}
