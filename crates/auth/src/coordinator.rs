//! Session coordinator: auth-state reconciliation and role routing.
//!
//! One coordinator lives for the page's lifetime, owned by the composition
//! root. It watches the identity provider's auth-state events, reconciles
//! the cached role against the authoritative user record, enforces the
//! disabled-account rule, and routes the browser to the signed-in role's
//! area at most once per transition.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use pharma_direct_core::{Destination, Role};

use crate::config::SessionConfig;
use crate::gateway::IdentityGateway;
use crate::ports::{AuthEvent, AuthUser, navigate};

/// Observable session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No auth event has been processed yet.
    Uninitialized,
    /// The provider reported no active session.
    Anonymous,
    /// An active session with a resolved role.
    Authenticated(Role),
    /// The account was found disabled and the session has been torn down.
    Disabled,
}

/// Mutable coordinator bookkeeping.
///
/// The guard is held only between suspension points. Events are delivered
/// one at a time by the listener task, and the rare overlapping caller
/// converges through the redirect cooldown plus the already-at-destination
/// check rather than through long-held locks.
#[derive(Debug, Default)]
struct CoordinatorState {
    user: Option<AuthUser>,
    role: Option<Role>,
    disabled: bool,
    redirected: bool,
    last_redirect: Option<Instant>,
    initialized: bool,
}

impl CoordinatorState {
    const fn phase(&self) -> SessionPhase {
        if self.disabled {
            SessionPhase::Disabled
        } else if let Some(role) = self.role {
            SessionPhase::Authenticated(role)
        } else if self.initialized {
            SessionPhase::Anonymous
        } else {
            SessionPhase::Uninitialized
        }
    }
}

/// Session coordinator.
///
/// Cheap to clone; all clones share the same state and ports.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    gateway: IdentityGateway,
    cooldown: Duration,
    state: Mutex<CoordinatorState>,
}

impl SessionCoordinator {
    /// Build a coordinator over the gateway's ports.
    #[must_use]
    pub fn new(gateway: IdentityGateway, config: &SessionConfig) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                gateway,
                cooldown: config.redirect_cooldown,
                state: Mutex::new(CoordinatorState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Session restoration
    // =========================================================================

    /// Reconcile a session the provider restored before this coordinator
    /// existed.
    ///
    /// Only acts when the provider already holds a user *and* the cache
    /// holds a role; partial leftovers are ignored and resolved later by
    /// the first auth event. The session becomes provisionally
    /// `Authenticated` with the cached role while the authoritative record
    /// is fetched: a disabled record tears the session down, a differing
    /// role is adopted and recached, and a failed read leaves the cached
    /// role standing. Redirect eligibility is evaluated immediately so a
    /// signed-in visitor landing on an entry page is routed without waiting
    /// for a fresh event.
    pub async fn bootstrap(&self) {
        let Some(user) = self.inner.gateway.current_user() else {
            return;
        };
        let Some(cached_role) = self.inner.gateway.cache().role() else {
            return;
        };
        tracing::debug!(uid = %user.uid, role = %cached_role, "restoring existing session");

        {
            let mut state = self.state();
            state.user = Some(user.clone());
            state.role = Some(cached_role);
        }

        let mut role = cached_role;
        match self.inner.gateway.roles().fetch_record(&user.uid).await {
            Ok(Some(record)) if record.disabled => {
                self.enter_disabled().await;
                return;
            }
            Ok(Some(record)) => {
                if record.role != cached_role {
                    tracing::info!(
                        uid = %user.uid,
                        cached = %cached_role,
                        authoritative = %record.role,
                        "cached role out of date, adopting record role"
                    );
                    role = record.role;
                    self.state().role = Some(role);
                    self.inner.gateway.cache().store(&user.uid, role);
                }
            }
            Ok(None) => {
                tracing::warn!(uid = %user.uid, "user record missing, keeping cached role");
            }
            Err(err) => {
                tracing::warn!(uid = %user.uid, error = %err, "record read failed, keeping cached role");
            }
        }

        if self.should_redirect() {
            self.perform_redirect(role);
        }
        self.state().initialized = true;
    }

    // =========================================================================
    // Auth-state events
    // =========================================================================

    /// Process one auth-state-change event.
    ///
    /// Public so a host that bridges a foreign callback API can feed events
    /// in directly; most hosts attach via [`watch`](Self::watch) instead.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        if self.state().disabled {
            tracing::debug!("session torn down as disabled, dropping auth event");
            return;
        }

        match event {
            AuthEvent::SignedOut => {
                {
                    let mut state = self.state();
                    state.user = None;
                    state.role = None;
                }
                self.inner.gateway.cache().clear();
                tracing::debug!("signed out, session state cleared");
            }
            AuthEvent::SignedIn(user) => {
                let cached_role = self.inner.gateway.cache().role();

                let role = match self.inner.gateway.roles().fetch_record(&user.uid).await {
                    Ok(Some(record)) if record.disabled => {
                        self.enter_disabled().await;
                        return;
                    }
                    Ok(Some(record)) => record.role,
                    Ok(None) => {
                        tracing::warn!(uid = %user.uid, "user record missing, falling back to cached role");
                        cached_role.unwrap_or_default()
                    }
                    Err(err) => {
                        tracing::warn!(uid = %user.uid, error = %err, "record read failed, falling back to cached role");
                        cached_role.unwrap_or_default()
                    }
                };

                {
                    let mut state = self.state();
                    state.user = Some(user.clone());
                    state.role = Some(role);
                }
                self.inner.gateway.cache().store(&user.uid, role);

                if self.should_redirect() {
                    self.perform_redirect(role);
                }
            }
        }

        self.state().initialized = true;
    }

    /// Attach to the provider's auth-state events.
    ///
    /// Spawns a listener task feeding every event through
    /// [`handle_auth_event`](Self::handle_auth_event). The returned
    /// [`Subscription`] detaches the listener when dropped or cancelled, so
    /// teardown is deterministic rather than tied to process exit.
    #[must_use = "dropping the subscription detaches the auth listener"]
    pub fn watch(&self) -> Subscription {
        let mut events = self.inner.gateway.provider().subscribe();
        let coordinator = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => coordinator.handle_auth_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth event stream lagged, continuing with latest events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription { handle }
    }

    // =========================================================================
    // Redirects
    // =========================================================================

    /// Redirect is eligible on the first processed transition, and any time
    /// the session sits on an entry page (login or registration).
    fn should_redirect(&self) -> bool {
        if !self.state().initialized {
            return true;
        }
        self.inner.gateway.navigator().current_area().is_entry()
    }

    /// Route the browser to `role`'s area, at most once per cooldown window.
    fn perform_redirect(&self, role: Role) {
        let now = Instant::now();
        {
            let mut state = self.state();
            let within_cooldown = state
                .last_redirect
                .is_some_and(|last| now.duration_since(last) < self.inner.cooldown);
            if state.redirected && within_cooldown {
                tracing::debug!(%role, "redirect suppressed within cooldown");
                return;
            }
            state.redirected = true;
            state.last_redirect = Some(now);
        }

        let area = self.inner.gateway.navigator().current_area();
        let destination = Destination::for_role(role);
        if area == destination.area() {
            // Release the flag so the next genuine transition within the
            // cooldown window is not swallowed.
            self.state().redirected = false;
            tracing::debug!(%role, ?area, "already at destination, not navigating");
            return;
        }

        let href = destination.href_from(area);
        tracing::info!(%role, %href, "routing session to role area");
        navigate(self.inner.gateway.navigator().as_ref(), &href);
    }

    // =========================================================================
    // Disabled accounts and teardown
    // =========================================================================

    /// Tear down a session whose record is disabled.
    ///
    /// The provider sign-out is attempted first but its failure does not
    /// stop the teardown: the cache and in-memory state are cleared and the
    /// browser is routed to the disabled page regardless. Afterwards the
    /// coordinator stays latched in [`SessionPhase::Disabled`] and drops
    /// further auth events until [`reset`](Self::reset).
    async fn enter_disabled(&self) {
        tracing::warn!("account disabled, tearing down session");

        if let Err(err) = self.inner.gateway.provider().sign_out().await {
            tracing::warn!(error = %err, "sign-out failed during disabled teardown");
        }
        self.inner.gateway.cache().clear();

        {
            let mut state = self.state();
            state.user = None;
            state.role = None;
            state.disabled = true;
        }

        let area = self.inner.gateway.navigator().current_area();
        let href = Destination::Disabled.href_from(area);
        navigate(self.inner.gateway.navigator().as_ref(), &href);
    }

    /// Forget all session state, including the disabled latch and the
    /// redirect bookkeeping.
    pub fn reset(&self) {
        *self.state() = CoordinatorState::default();
    }

    /// End the session.
    ///
    /// Coordinator state is reset first, then the gateway clears the cache,
    /// signs out, and routes to the login page.
    pub async fn logout(&self) {
        self.reset();
        self.inner.gateway.logout().await;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.state().user.clone()
    }

    /// The resolved role, if any.
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.state().role
    }

    /// The observable session phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state().phase()
    }
}

/// Disposer for an attached auth-state listener.
///
/// Dropping it aborts the listener task, detaching the coordinator from the
/// provider's event stream.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Whether the listener task is still running.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use pharma_direct_core::{Area, Email, Uid};

    use super::*;
    use crate::ports::{IdentityProvider, KeyValueStorage};
    use crate::testing::{FakeNavigator, MemoryDocumentStore, MemoryIdentityProvider, MemoryStorage};

    struct Harness {
        provider: Arc<MemoryIdentityProvider>,
        store: Arc<MemoryDocumentStore>,
        storage: Arc<MemoryStorage>,
        navigator: Arc<FakeNavigator>,
        coordinator: SessionCoordinator,
    }

    fn harness(area: Area) -> Harness {
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
        Harness {
            provider,
            store,
            storage,
            navigator,
            coordinator: SessionCoordinator::new(gateway, &config),
        }
    }

    fn signed_in(uid: &str) -> AuthEvent {
        AuthEvent::SignedIn(AuthUser {
            uid: Uid::from(uid),
            email: Email::parse("someone@example.com").unwrap(),
            display_name: None,
        })
    }

    #[tokio::test]
    async fn test_phase_starts_uninitialized() {
        let h = harness(Area::Root);
        assert_eq!(h.coordinator.phase(), SessionPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_signed_out_event_yields_anonymous() {
        let h = harness(Area::Root);
        h.coordinator.handle_auth_event(AuthEvent::SignedOut).await;

        assert_eq!(h.coordinator.phase(), SessionPhase::Anonymous);
        assert!(h.coordinator.current_user().is_none());
    }

    #[tokio::test]
    async fn test_signed_in_event_resolves_role_and_redirects() {
        let h = harness(Area::Login);
        h.store.insert("users", "u1", json!({"role": "pharmacy"}));

        h.coordinator.handle_auth_event(signed_in("u1")).await;

        assert_eq!(h.coordinator.phase(), SessionPhase::Authenticated(Role::Pharmacy));
        assert_eq!(h.storage.get("role").as_deref(), Some("pharmacy"));
        assert_eq!(h.navigator.last().unwrap().href, "../pharmacy/");
    }

    #[tokio::test]
    async fn test_subsequent_events_do_not_redirect_off_content_pages() {
        let h = harness(Area::Cart);
        h.store.insert("users", "u1", json!({"role": "user"}));

        // First event initializes; the user sits on a content page and the
        // home redirect fires once.
        h.coordinator.handle_auth_event(signed_in("u1")).await;
        let first = h.navigator.navigations().len();

        h.navigator.set_area(Area::Categories);
        h.coordinator.handle_auth_event(signed_in("u1")).await;

        assert_eq!(h.navigator.navigations().len(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_cooldown_suppresses_bursts() {
        let h = harness(Area::Login);
        h.store.insert("users", "u1", json!({"role": "admin"}));

        h.coordinator.handle_auth_event(signed_in("u1")).await;
        h.coordinator.handle_auth_event(signed_in("u1")).await;
        assert_eq!(h.navigator.navigations().len(), 1);

        // Past the cooldown a fresh eligible event may navigate again.
        tokio::time::advance(Duration::from_millis(2001)).await;
        h.coordinator.handle_auth_event(signed_in("u1")).await;
        assert_eq!(h.navigator.navigations().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_at_destination_releases_cooldown_flag() {
        let h = harness(Area::Admin);
        h.store.insert("users", "u1", json!({"role": "admin"}));

        // Admin already sits in the admin area: nothing to do.
        h.coordinator.handle_auth_event(signed_in("u1")).await;
        assert!(h.navigator.navigations().is_empty());

        // Demoted out-of-band; the next event must be free to navigate even
        // though it lands inside the would-be cooldown window.
        h.store.insert("users", "u1", json!({"role": "user"}));
        h.navigator.set_area(Area::Login);
        h.coordinator.handle_auth_event(signed_in("u1")).await;

        assert_eq!(h.navigator.last().unwrap().href, "../");
    }

    #[tokio::test]
    async fn test_disabled_record_latches_and_drops_later_events() {
        let h = harness(Area::Login);
        h.store.insert("users", "u1", json!({"role": "user", "disabled": true}));

        h.coordinator.handle_auth_event(signed_in("u1")).await;
        assert_eq!(h.coordinator.phase(), SessionPhase::Disabled);
        assert_eq!(h.navigator.last().unwrap().href, "../disabled/");

        // Re-enable the record; the latch still drops events until reset.
        h.store.insert("users", "u1", json!({"role": "user"}));
        h.coordinator.handle_auth_event(signed_in("u1")).await;
        assert_eq!(h.coordinator.phase(), SessionPhase::Disabled);

        h.coordinator.reset();
        assert_eq!(h.coordinator.phase(), SessionPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_bootstrap_requires_user_and_cached_role() {
        let h = harness(Area::Root);

        // No provider session, no cache: nothing happens.
        h.coordinator.bootstrap().await;
        assert_eq!(h.coordinator.phase(), SessionPhase::Uninitialized);

        // Cache alone is not enough either.
        h.storage.seed("uid", "u1");
        h.storage.seed("role", "admin");
        h.coordinator.bootstrap().await;
        assert_eq!(h.coordinator.phase(), SessionPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_bootstrap_adopts_fresh_role_over_cached() {
        let h = harness(Area::Root);
        let email = Email::parse("someone@example.com").unwrap();
        let user = h.provider.seed_account(&email, "secret-pw", Some("Someone"));
        h.provider.force_sign_in(&user);
        h.storage.seed("uid", user.uid.as_str());
        h.storage.seed("role", "user");
        h.store.insert("users", user.uid.as_str(), json!({"role": "admin"}));

        h.coordinator.bootstrap().await;

        assert_eq!(h.coordinator.phase(), SessionPhase::Authenticated(Role::Admin));
        assert_eq!(h.storage.get("role").as_deref(), Some("admin"));
        // First transition on the home page: the admin redirect fires.
        assert_eq!(h.navigator.last().unwrap().href, "admin/");
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_cached_role_when_read_fails() {
        let h = harness(Area::Categories);
        let email = Email::parse("someone@example.com").unwrap();
        let user = h.provider.seed_account(&email, "secret-pw", None);
        h.provider.force_sign_in(&user);
        h.storage.seed("uid", user.uid.as_str());
        h.storage.seed("role", "pharmacy");
        h.store.fail_reads(true);

        h.coordinator.bootstrap().await;

        assert_eq!(h.coordinator.phase(), SessionPhase::Authenticated(Role::Pharmacy));
        // Bootstrap counts as the first transition, so routing still runs.
        assert_eq!(h.navigator.last().unwrap().href, "../pharmacy/");
    }

    #[tokio::test]
    async fn test_watch_feeds_provider_events_through() {
        let h = harness(Area::Login);
        let subscription = h.coordinator.watch();
        assert!(subscription.is_attached());

        let email = Email::parse("someone@example.com").unwrap();
        let user = h.provider.seed_account(&email, "secret-pw", None);
        h.store.insert("users", user.uid.as_str(), json!({"role": "admin"}));
        h.provider
            .sign_in(&email, &secrecy::SecretString::from("secret-pw"))
            .await
            .unwrap();

        // Wait for the listener task to drain the event.
        for _ in 0..50 {
            if h.coordinator.phase() != SessionPhase::Uninitialized {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(h.coordinator.phase(), SessionPhase::Authenticated(Role::Admin));

        subscription.cancel();
    }

    #[tokio::test]
    async fn test_dropped_subscription_detaches_listener() {
        let h = harness(Area::Login);
        let subscription = h.coordinator.watch();
        drop(subscription);

        let email = Email::parse("someone@example.com").unwrap();
        let user = h.provider.seed_account(&email, "secret-pw", None);
        h.store.insert("users", user.uid.as_str(), json!({"role": "admin"}));
        h.provider
            .sign_in(&email, &secrecy::SecretString::from("secret-pw"))
            .await
            .unwrap();
        tokio::task::yield_now().await;

        assert_eq!(h.coordinator.phase(), SessionPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_logout_resets_and_routes_to_login() {
        let h = harness(Area::UserDashboard);
        h.store.insert("users", "u1", json!({"role": "user", "disabled": true}));
        h.coordinator.handle_auth_event(signed_in("u1")).await;
        assert_eq!(h.coordinator.phase(), SessionPhase::Disabled);

        h.coordinator.logout().await;

        assert_eq!(h.coordinator.phase(), SessionPhase::Uninitialized);
        assert!(h.storage.is_empty());
        assert_eq!(h.navigator.last().unwrap().href, "../login/");
    }
}
