//! Identity provider contract.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::broadcast;

use pharma_direct_core::{Email, Uid};

/// A signed-in (or newly created) identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Provider-assigned identifier.
    pub uid: Uid,
    /// Email the account was created with.
    pub email: Email,
    /// Display name, once one has been set.
    pub display_name: Option<String>,
}

/// Auth-state-change notification delivered to subscribers.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A session became active (sign-in or account creation).
    SignedIn(AuthUser),
    /// The active session ended (sign-out or account deletion).
    SignedOut,
}

impl AuthEvent {
    /// The user carried by the event, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::SignedOut => None,
        }
    }
}

/// Errors surfaced by the hosted identity provider.
#[derive(thiserror::Error, Debug, Clone)]
pub enum IdentityError {
    /// The provider rejected the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// An account already exists for this email.
    #[error("email already in use")]
    EmailAlreadyInUse,
    /// The provider rejected the password as too weak.
    #[error("password rejected as too weak")]
    WeakPassword,
    /// Any other provider-side failure (network, quota, outage).
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Contract for the hosted identity provider.
///
/// Implementations wrap the vendor SDK. The async calls go over the network
/// and may fail; [`current_user`](IdentityProvider::current_user) and
/// [`subscribe`](IdentityProvider::subscribe) are synchronous views of
/// SDK-local session state.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new account and sign it in.
    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthUser, IdentityError>;

    /// Sign in with an email/password pair.
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthUser, IdentityError>;

    /// End the active session.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Permanently delete an account.
    ///
    /// Used to compensate a registration whose profile writes failed.
    async fn delete_account(&self, user: &AuthUser) -> Result<(), IdentityError>;

    /// Set the display name on an account.
    async fn update_display_name(&self, user: &AuthUser, name: &str)
    -> Result<(), IdentityError>;

    /// The currently signed-in user, if the SDK already holds a session.
    ///
    /// Hosted SDKs restore sessions across page loads, so this can be `Some`
    /// before any call in this process signed anyone in.
    fn current_user(&self) -> Option<AuthUser>;

    /// Subscribe to auth-state-change events.
    ///
    /// Events arrive in order. A receiver that falls behind observes a lag
    /// error and continues with later events; convergence relies on the
    /// latest event, not on replay.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
