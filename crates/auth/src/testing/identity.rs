//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use uuid::Uuid;

use pharma_direct_core::{Email, Uid};

use crate::ports::{AuthEvent, AuthUser, IdentityError, IdentityProvider};

/// Event channel capacity; tests never come close to filling it.
const EVENT_CAPACITY: usize = 16;

/// Minimum password length the hosted provider enforces.
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone)]
struct Account {
    uid: Uid,
    password: String,
    display_name: Option<String>,
}

/// In-memory stand-in for the hosted identity provider.
///
/// Accounts are keyed by email and uids are minted at creation. Session
/// state mirrors the hosted SDK: creating an account signs the new user in,
/// deleting the signed-in account signs it out, and every transition is
/// broadcast to subscribers.
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<AuthUser>>,
    events: broadcast::Sender<AuthEvent>,
    reject_sign_out: AtomicBool,
    reject_delete: AtomicBool,
}

impl MemoryIdentityProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            events,
            reject_sign_out: AtomicBool::new(false),
            reject_delete: AtomicBool::new(false),
        }
    }

    /// Create an account without signing it in or emitting events.
    ///
    /// Stands in for an account that existed before this page load.
    pub fn seed_account(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthUser {
        let uid = mint_uid();
        let account = Account {
            uid: uid.clone(),
            password: password.to_owned(),
            display_name: display_name.map(str::to_owned),
        };
        self.accounts()
            .insert(email.as_str().to_owned(), account);
        AuthUser {
            uid,
            email: email.clone(),
            display_name: display_name.map(str::to_owned),
        }
    }

    /// Mark a user as signed in without emitting events.
    ///
    /// Stands in for the SDK restoring a session from a previous page load
    /// before any listener attached.
    pub fn force_sign_in(&self, user: &AuthUser) {
        *self.current() = Some(user.clone());
    }

    /// Whether an account is still retrievable under this email.
    #[must_use]
    pub fn account_exists(&self, email: &str) -> bool {
        self.accounts().contains_key(email)
    }

    /// Make subsequent `sign_out` calls fail.
    pub fn reject_sign_out(&self, reject: bool) {
        self.reject_sign_out.store(reject, Ordering::SeqCst);
    }

    /// Make subsequent `delete_account` calls fail.
    pub fn reject_delete(&self, reject: bool) {
        self.reject_delete.store(reject, Ordering::SeqCst);
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> MutexGuard<'_, Option<AuthUser>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: AuthEvent) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthUser, IdentityError> {
        let password = password.expose_secret();
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::WeakPassword);
        }

        let user = {
            let mut accounts = self.accounts();
            if accounts.contains_key(email.as_str()) {
                return Err(IdentityError::EmailAlreadyInUse);
            }

            let uid = mint_uid();
            accounts.insert(
                email.as_str().to_owned(),
                Account {
                    uid: uid.clone(),
                    password: password.to_owned(),
                    display_name: None,
                },
            );
            AuthUser {
                uid,
                email: email.clone(),
                display_name: None,
            }
        };

        *self.current() = Some(user.clone());
        self.emit(AuthEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthUser, IdentityError> {
        let user = {
            let accounts = self.accounts();
            let account = accounts
                .get(email.as_str())
                .ok_or(IdentityError::InvalidCredentials)?;
            if account.password != password.expose_secret() {
                return Err(IdentityError::InvalidCredentials);
            }
            AuthUser {
                uid: account.uid.clone(),
                email: email.clone(),
                display_name: account.display_name.clone(),
            }
        };

        *self.current() = Some(user.clone());
        self.emit(AuthEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if self.reject_sign_out.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("sign-out rejected".to_owned()));
        }

        if self.current().take().is_some() {
            self.emit(AuthEvent::SignedOut);
        }
        Ok(())
    }

    async fn delete_account(&self, user: &AuthUser) -> Result<(), IdentityError> {
        if self.reject_delete.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("delete rejected".to_owned()));
        }

        self.accounts()
            .retain(|_, account| account.uid != user.uid);

        let was_current = {
            let mut current = self.current();
            if current.as_ref().is_some_and(|c| c.uid == user.uid) {
                *current = None;
                true
            } else {
                false
            }
        };
        if was_current {
            self.emit(AuthEvent::SignedOut);
        }
        Ok(())
    }

    async fn update_display_name(
        &self,
        user: &AuthUser,
        name: &str,
    ) -> Result<(), IdentityError> {
        for account in self.accounts().values_mut() {
            if account.uid == user.uid {
                account.display_name = Some(name.to_owned());
            }
        }

        let mut current = self.current();
        if let Some(current) = current.as_mut()
            && current.uid == user.uid
        {
            current.display_name = Some(name.to_owned());
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn mint_uid() -> Uid {
    Uid::new(Uuid::new_v4().simple().to_string())
}
