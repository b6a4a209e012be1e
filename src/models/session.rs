use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Represents an authenticated session: an opaque token pair bound to
/// exactly one user.
///
/// A session is either fully present or entirely absent. Consumers never
/// observe a session with a missing token or user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The opaque access token.
    pub access_token: String,
    /// The opaque refresh token.
    pub refresh_token: String,
    /// The user this session belongs to.
    pub user: User,
}
