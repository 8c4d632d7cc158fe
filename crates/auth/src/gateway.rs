//! Identity gateway: registration, login, and logout.

use std::sync::Arc;

use secrecy::SecretString;

use pharma_direct_core::{Destination, Email, Role};

use crate::cache::SessionCache;
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::models::{PharmacyRecord, UserRecord};
use crate::ports::{
    AuthUser, DocumentStore, IdentityProvider, KeyValueStorage, Navigator, navigate,
};
use crate::roles::RoleStore;

/// A registration request.
///
/// The password stays wrapped in a [`SecretString`] until the moment it
/// crosses the provider port, and never appears in logs.
#[derive(Debug)]
pub struct Registration {
    /// Display name for the new account.
    pub name: String,
    /// Email to register with.
    pub email: Email,
    /// Password for the new account.
    pub password: SecretString,
    /// Optional contact phone; stored as an empty string when absent.
    pub phone: Option<String>,
    /// Role requested at sign-up.
    pub role: Role,
}

/// Wrapper over the identity provider that keeps the session cache and the
/// per-user records consistent with provider-side account state.
///
/// Cheap to clone; all clones share the same ports.
#[derive(Clone)]
pub struct IdentityGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    provider: Arc<dyn IdentityProvider>,
    roles: RoleStore,
    cache: SessionCache,
    navigator: Arc<dyn Navigator>,
}

impl IdentityGateway {
    /// Build a gateway over the host's ports.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn KeyValueStorage>,
        navigator: Arc<dyn Navigator>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                provider,
                roles: RoleStore::new(store, config.collections.clone()),
                cache: SessionCache::new(storage),
                navigator,
            }),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new account.
    ///
    /// Creates the identity account (which signs it in), sets its display
    /// name, writes the per-user record, and for pharmacies additionally
    /// merge-writes the partner record. On success the new `{uid, role}`
    /// pair is cached for the session.
    ///
    /// Transactional by compensation: if any step after account creation
    /// fails, the account is deleted again (or, failing that, signed out)
    /// and the original error is returned. A registration either yields an
    /// account with its record or no account at all.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailAlreadyInUse`] or [`AuthError::Provider`]
    /// when the provider rejects account creation, and
    /// [`AuthError::ProfileWrite`] or [`AuthError::Provider`] when a
    /// post-creation step fails (after rollback).
    pub async fn register(&self, registration: Registration) -> Result<AuthUser, AuthError> {
        let user = self
            .inner
            .provider
            .create_account(&registration.email, &registration.password)
            .await?;

        if let Err(err) = self.provision_profile(&user, &registration).await {
            self.roll_back_registration(&user).await;
            return Err(err);
        }

        self.inner.cache.store(&user.uid, registration.role);
        tracing::info!(uid = %user.uid, role = %registration.role, "registered new account");
        Ok(AuthUser {
            display_name: Some(registration.name),
            ..user
        })
    }

    /// Set the display name and write the store records for a new account.
    async fn provision_profile(
        &self,
        user: &AuthUser,
        registration: &Registration,
    ) -> Result<(), AuthError> {
        self.inner
            .provider
            .update_display_name(user, &registration.name)
            .await?;

        let record = UserRecord::new(
            &registration.name,
            &registration.email,
            registration.phone.as_deref(),
            registration.role,
        );
        self.inner
            .roles
            .create_user_record(&user.uid, &record)
            .await
            .map_err(AuthError::ProfileWrite)?;

        if registration.role == Role::Pharmacy {
            let partner = PharmacyRecord::new(
                &registration.name,
                &registration.email,
                registration.phone.as_deref(),
            );
            self.inner
                .roles
                .upsert_pharmacy_record(&user.uid, &partner)
                .await
                .map_err(AuthError::ProfileWrite)?;
        }

        Ok(())
    }

    /// Undo a registration whose profile steps failed, so an identity never
    /// outlives its missing record.
    async fn roll_back_registration(&self, user: &AuthUser) {
        if let Err(delete_err) = self.inner.provider.delete_account(user).await {
            tracing::warn!(
                uid = %user.uid,
                error = %delete_err,
                "rollback delete failed, signing the orphaned account out instead"
            );
            if let Err(sign_out_err) = self.inner.provider.sign_out().await {
                tracing::warn!(
                    uid = %user.uid,
                    error = %sign_out_err,
                    "rollback sign-out failed as well"
                );
            }
        }
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Sign in with an email/password pair.
    ///
    /// On success the authoritative role is resolved from the user's record
    /// and cached. When that resolution fails the session continues with
    /// role `user`: a store outage must degrade the experience, not block
    /// sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the provider rejects
    /// the pair, [`AuthError::Provider`] for other provider failures.
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthUser, AuthError> {
        let user = self.inner.provider.sign_in(email, password).await?;

        let role = match self.inner.roles.fetch_role(&user.uid).await {
            Ok(role) => role,
            Err(err) => {
                tracing::warn!(uid = %user.uid, error = %err, "role resolution failed, defaulting to user");
                Role::default()
            }
        };

        self.inner.cache.store(&user.uid, role);
        tracing::info!(uid = %user.uid, %role, "signed in");
        Ok(user)
    }

    /// End the session.
    ///
    /// The cache is cleared synchronously before the provider sign-out is
    /// awaited, so not even a crash mid-call leaves the cached pair behind.
    /// The browser is then routed to the login page whether or not sign-out
    /// succeeded; a failure is logged, never surfaced.
    pub async fn logout(&self) {
        self.inner.cache.clear();

        if let Err(err) = self.inner.provider.sign_out().await {
            tracing::warn!(error = %err, "provider sign-out failed during logout");
        }

        let href = Destination::Login.href_from(self.inner.navigator.current_area());
        navigate(self.inner.navigator.as_ref(), &href);
        tracing::info!("logged out");
    }

    /// The currently signed-in user, per the provider's local session state.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.inner.provider.current_user()
    }

    // Port accessors for the coordinator.

    pub(crate) fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.provider
    }

    pub(crate) fn roles(&self) -> &RoleStore {
        &self.inner.roles
    }

    pub(crate) fn cache(&self) -> &SessionCache {
        &self.inner.cache
    }

    pub(crate) fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use pharma_direct_core::Area;

    use super::*;
    use crate::testing::{FakeNavigator, MemoryDocumentStore, MemoryIdentityProvider, MemoryStorage};

    struct Harness {
        provider: Arc<MemoryIdentityProvider>,
        store: Arc<MemoryDocumentStore>,
        storage: Arc<MemoryStorage>,
        navigator: Arc<FakeNavigator>,
        gateway: IdentityGateway,
    }

    fn harness(area: Area) -> Harness {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(FakeNavigator::new(area));
        let gateway = IdentityGateway::new(
            provider.clone(),
            store.clone(),
            storage.clone(),
            navigator.clone(),
            &SessionConfig::default(),
        );
        Harness {
            provider,
            store,
            storage,
            navigator,
            gateway,
        }
    }

    fn registration(role: Role) -> Registration {
        Registration {
            name: "Amina Yusuf".to_owned(),
            email: Email::parse("amina@example.com").unwrap(),
            password: SecretString::from("correct horse"),
            phone: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_register_writes_record_and_cache() {
        let h = harness(Area::Register);
        let user = h.gateway.register(registration(Role::User)).await.unwrap();

        let doc = h.store.document("users", user.uid.as_str()).unwrap();
        assert_eq!(doc["name"], "Amina Yusuf");
        assert_eq!(doc["role"], "user");
        assert_eq!(doc["disabled"], false);

        assert_eq!(h.storage.get("uid").as_deref(), Some(user.uid.as_str()));
        assert_eq!(h.storage.get("role").as_deref(), Some("user"));
        assert_eq!(user.display_name.as_deref(), Some("Amina Yusuf"));
    }

    #[tokio::test]
    async fn test_register_pharmacy_writes_partner_record() {
        let h = harness(Area::Register);
        let user = h.gateway.register(registration(Role::Pharmacy)).await.unwrap();

        assert!(h.store.document("users", user.uid.as_str()).is_some());
        let partner = h.store.document("pharmacies", user.uid.as_str()).unwrap();
        assert_eq!(partner["approved"], false);
        assert_eq!(partner["totalOrders"], 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() {
        let h = harness(Area::Register);
        h.gateway.register(registration(Role::User)).await.unwrap();

        let err = h.gateway.register(registration(Role::User)).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyInUse));
    }

    #[tokio::test]
    async fn test_register_rolls_back_on_record_write_failure() {
        let h = harness(Area::Register);
        h.store.fail_writes(true);

        let err = h.gateway.register(registration(Role::User)).await.unwrap_err();
        assert!(matches!(err, AuthError::ProfileWrite(_)));

        // The account must be gone again, not half-registered.
        assert!(!h.provider.account_exists("amina@example.com"));
        assert!(h.provider.current_user().is_none());
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn test_register_signs_out_when_rollback_delete_fails() {
        let h = harness(Area::Register);
        h.store.fail_writes(true);
        h.provider.reject_delete(true);

        let err = h.gateway.register(registration(Role::User)).await.unwrap_err();
        assert!(matches!(err, AuthError::ProfileWrite(_)));

        // Deletion was rejected, so the orphan stays but is signed out.
        assert!(h.provider.account_exists("amina@example.com"));
        assert!(h.provider.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_resolves_and_caches_role() {
        let h = harness(Area::Login);
        let user = h.gateway.register(registration(Role::User)).await.unwrap();

        // Promotion applied out-of-band by administrative tooling.
        h.store.insert("users", user.uid.as_str(), json!({"role": "admin"}));

        let email = Email::parse("amina@example.com").unwrap();
        h.gateway.login(&email, &SecretString::from("correct horse")).await.unwrap();

        assert_eq!(h.storage.get("role").as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_login_defaults_role_when_store_unreachable() {
        let h = harness(Area::Login);
        let user = h.gateway.register(registration(Role::Pharmacy)).await.unwrap();
        h.store.fail_reads(true);

        let email = Email::parse("amina@example.com").unwrap();
        let signed_in = h
            .gateway
            .login(&email, &SecretString::from("correct horse"))
            .await
            .unwrap();

        assert_eq!(signed_in.uid, user.uid);
        assert_eq!(h.storage.get("role").as_deref(), Some("user"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let h = harness(Area::Login);
        h.gateway.register(registration(Role::User)).await.unwrap();

        let email = Email::parse("amina@example.com").unwrap();
        let err = h
            .gateway
            .login(&email, &SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_logout_clears_cache_even_when_sign_out_rejected() {
        let h = harness(Area::UserDashboard);
        h.gateway.register(registration(Role::User)).await.unwrap();
        h.provider.reject_sign_out(true);

        h.gateway.logout().await;

        assert!(h.storage.is_empty());
        let nav = h.navigator.last().unwrap();
        assert_eq!(nav.href, "../login/");
    }

    #[tokio::test]
    async fn test_logout_from_root_uses_bare_href() {
        let h = harness(Area::Root);
        h.gateway.logout().await;

        let nav = h.navigator.last().unwrap();
        assert_eq!(nav.href, "login/");
    }
}
