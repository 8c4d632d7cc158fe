//! Storefront account roles.

use serde::{Deserialize, Serialize};

/// Account role stored on the per-user record and cached per session.
///
/// The role is denormalized onto the user's document as a plain string and
/// decides which storefront area a signed-in session is routed to. Anything
/// unrecognized degrades to [`Role::User`], never to an error: the worst
/// outcome of a mangled role must be a customer seeing the regular shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper, routed to the storefront home page.
    #[default]
    User,
    /// Store administrator, routed to the admin dashboard.
    Admin,
    /// Pharmacy partner, routed to the pharmacy dashboard.
    Pharmacy,
}

impl Role {
    /// String form as written to records and the session cache.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Pharmacy => "pharmacy",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "pharmacy" => Ok(Self::Pharmacy),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for role in [Role::User, Role::Admin, Role::Pharmacy] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Role::Pharmacy).unwrap();
        assert_eq!(json, "\"pharmacy\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
