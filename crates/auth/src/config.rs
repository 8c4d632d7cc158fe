//! Session configuration supplied by the composition root.

use std::time::Duration;

/// Default cooldown during which repeat redirect attempts are suppressed.
///
/// Auth-state events arrive in bursts (a sign-in typically fires the
/// listener twice within a few hundred milliseconds), and each eligible
/// event would otherwise issue its own navigation.
pub const DEFAULT_REDIRECT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A document-store collection name was empty.
    #[error("collection name for {0} must not be empty")]
    EmptyCollectionName(&'static str),
}

/// Names of the document-store collections this library touches.
///
/// The defaults match the production database; overriding them is mainly
/// useful for staging environments that share a database instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    users: String,
    pharmacies: String,
}

impl Collections {
    /// Build a collection table with explicit names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCollectionName`] if either name is empty.
    pub fn new(
        users: impl Into<String>,
        pharmacies: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let users = users.into();
        let pharmacies = pharmacies.into();

        if users.is_empty() {
            return Err(ConfigError::EmptyCollectionName("users"));
        }
        if pharmacies.is_empty() {
            return Err(ConfigError::EmptyCollectionName("pharmacies"));
        }

        Ok(Self { users, pharmacies })
    }

    /// Collection holding the per-user records.
    #[must_use]
    pub fn users(&self) -> &str {
        &self.users
    }

    /// Collection holding the pharmacy partner records.
    #[must_use]
    pub fn pharmacies(&self) -> &str {
        &self.pharmacies
    }
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            users: "users".to_owned(),
            pharmacies: "pharmacies".to_owned(),
        }
    }
}

/// Configuration for the identity gateway and session coordinator.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Document-store collection names.
    pub collections: Collections,
    /// Cooldown during which repeat redirect attempts are suppressed.
    pub redirect_cooldown: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            collections: Collections::default(),
            redirect_cooldown: DEFAULT_REDIRECT_COOLDOWN,
        }
    }
}
