//! Session Principals

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Marketplace role attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A shopper browsing and ordering from markets.
    Customer,

    /// A personal shopper fulfilling orders.
    Shopper,

    /// A market administrator.
    Admin,
}

/// User Record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user identifier.
    pub uuid: UserUuid,

    /// Sign-in email address.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Marketplace role.
    pub role: UserRole,

    /// Account creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,
}
