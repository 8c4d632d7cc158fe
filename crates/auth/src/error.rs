//! Error taxonomy for gateway operations.

use crate::ports::{IdentityError, StoreError};

/// Errors surfaced to callers of the identity gateway.
///
/// Only registration and login propagate errors. Every other external call
/// in this library (role reads after sign-in, cache writes, sign-out,
/// navigation) degrades to a safe default instead of failing the caller.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// The provider rejected the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("an account with this email already exists")]
    EmailAlreadyInUse,

    /// The provider failed for a reason other than the credentials
    /// themselves (weak password, network, quota).
    #[error("identity provider error")]
    Provider(#[source] IdentityError),

    /// A record write failed after the identity account was created. The
    /// account has been rolled back before this is returned.
    #[error("profile write failed")]
    ProfileWrite(#[source] StoreError),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::EmailAlreadyInUse => Self::EmailAlreadyInUse,
            other => Self::Provider(other),
        }
    }
}
