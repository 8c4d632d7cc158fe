//! Document-store record types.
//!
//! Wire shapes are shared with the external administrative tooling that
//! reads and mutates these documents out-of-band, so field names stay
//! camelCase and every field is defaulted on read: a record that tooling
//! has stripped down must still deserialize.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pharma_direct_core::{Email, Role};

/// Per-user record in the users collection, keyed by uid.
///
/// Written once at registration. Afterwards only external administrative
/// tooling mutates it; this library re-reads it on every auth-state change
/// to pick up role changes and the disabled flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Display name captured at registration.
    #[serde(default)]
    pub name: String,
    /// Email the account was created with.
    #[serde(default)]
    pub email: String,
    /// Contact phone; empty when none was given.
    #[serde(default)]
    pub phone: String,
    /// Routing role. Defaults to `user` when tooling dropped the field.
    #[serde(default)]
    pub role: Role,
    /// Set by administrators to lock the account out.
    #[serde(default)]
    pub disabled: bool,
    /// Completed order count, maintained by external tooling.
    #[serde(default)]
    pub successful_orders: u32,
    /// Lifetime spend, a plain JSON number on the wire.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    /// Whether cash-on-delivery checkout is unlocked for this account.
    #[serde(default)]
    pub cod_unlocked: bool,
    /// Registration instant, milliseconds since the epoch on the wire.
    #[serde(default = "epoch", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Record for a freshly registered account.
    ///
    /// Cash on delivery starts unlocked for administrators only; everyone
    /// else earns it through the order history that external tooling
    /// maintains.
    #[must_use]
    pub fn new(name: &str, email: &Email, phone: Option<&str>, role: Role) -> Self {
        Self {
            name: name.to_owned(),
            email: email.as_str().to_owned(),
            phone: phone.unwrap_or_default().to_owned(),
            role,
            disabled: false,
            successful_orders: 0,
            total_spent: Decimal::ZERO,
            cod_unlocked: matches!(role, Role::Admin),
            created_at: Utc::now(),
        }
    }
}

/// Pharmacy partner record in the pharmacies collection, keyed by uid.
///
/// Created alongside the user record when a pharmacy registers. Always
/// merge-written: administrators sometimes pre-provision partner documents,
/// and registration must not wipe out fields it does not own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyRecord {
    /// Pharmacy display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Contact phone; empty when none was given.
    #[serde(default)]
    pub phone: String,
    /// Flipped by administrators once the partner is vetted.
    #[serde(default)]
    pub approved: bool,
    /// Product listings; schema owned by external tooling.
    #[serde(default)]
    pub products: Vec<Value>,
    /// Fulfilled order count, maintained by external tooling.
    #[serde(default)]
    pub total_orders: u32,
}

impl PharmacyRecord {
    /// Record for a freshly registered pharmacy partner.
    #[must_use]
    pub fn new(name: &str, email: &Email, phone: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            email: email.as_str().to_owned(),
            phone: phone.unwrap_or_default().to_owned(),
            approved: false,
            products: Vec::new(),
            total_orders: 0,
        }
    }
}

const fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::parse("account@example.com").unwrap()
    }

    #[test]
    fn test_user_record_wire_shape() {
        let record = UserRecord::new("Amina Yusuf", &email(), Some("+2348000000000"), Role::User);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "Amina Yusuf");
        assert_eq!(json["email"], "account@example.com");
        assert_eq!(json["phone"], "+2348000000000");
        assert_eq!(json["role"], "user");
        assert_eq!(json["disabled"], false);
        assert_eq!(json["successfulOrders"], 0);
        assert_eq!(json["totalSpent"], 0.0);
        assert_eq!(json["codUnlocked"], false);
        assert!(json["createdAt"].is_i64(), "createdAt must be epoch millis");
    }

    #[test]
    fn test_phone_defaults_to_empty() {
        let record = UserRecord::new("Amina", &email(), None, Role::User);
        assert_eq!(record.phone, "");
    }

    #[test]
    fn test_cod_unlocked_for_admins_only() {
        assert!(UserRecord::new("A", &email(), None, Role::Admin).cod_unlocked);
        assert!(!UserRecord::new("U", &email(), None, Role::User).cod_unlocked);
        assert!(!UserRecord::new("P", &email(), None, Role::Pharmacy).cod_unlocked);
    }

    #[test]
    fn test_user_record_reads_stripped_documents() {
        // External tooling may leave only the fields it cares about.
        let record: UserRecord =
            serde_json::from_value(serde_json::json!({"role": "admin", "disabled": true}))
                .unwrap();

        assert_eq!(record.role, Role::Admin);
        assert!(record.disabled);
        assert_eq!(record.name, "");
        assert_eq!(record.total_spent, Decimal::ZERO);
        assert_eq!(record.created_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_user_record_roundtrip() {
        let record = UserRecord::new("Amina", &email(), None, Role::Pharmacy);
        let json = serde_json::to_value(&record).unwrap();
        let back: UserRecord = serde_json::from_value(json).unwrap();

        assert_eq!(back.role, Role::Pharmacy);
        assert_eq!(back.created_at.timestamp_millis(), record.created_at.timestamp_millis());
    }

    #[test]
    fn test_pharmacy_record_wire_shape() {
        let record = PharmacyRecord::new("City Pharmacy", &email(), None);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "City Pharmacy");
        assert_eq!(json["approved"], false);
        assert_eq!(json["products"], serde_json::json!([]));
        assert_eq!(json["totalOrders"], 0);
    }
}
