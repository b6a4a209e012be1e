use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Represents an operator of the admin console.
///
/// Once loaded into a session the record is immutable: permission grants
/// are never edited in place mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    /// The unique identifier for the user.
    #[garde(skip)]
    pub id: i64,
    /// The user's email address.
    #[garde(email)]
    pub email: String,
    /// The user's display name.
    #[garde(length(min = 1))]
    pub name: String,
    /// Whether the account is active.
    #[garde(skip)]
    pub active: bool,
    /// The capability grants held by the user. Order is irrelevant.
    #[garde(skip)]
    pub permissions: HashSet<String>,
    /// The timestamp when the account was created.
    #[garde(skip)]
    pub created_at: DateTime<Utc>,
    /// The timestamp of the user's last login, if any.
    #[garde(skip)]
    pub last_login_at: Option<DateTime<Utc>>,
}
