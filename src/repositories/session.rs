use garde::Validate;
use std::sync::Arc;

use crate::error::Result;
use crate::models::session::Session;
use crate::models::user::User;
use crate::store::kv::KeyValueStore;

/// The key holding the opaque access token.
pub const KEY_ACCESS_TOKEN: &str = "access_token";
/// The key holding the opaque refresh token.
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
/// The key holding the serialized user profile.
pub const KEY_USER: &str = "user";

/// Durable persistence of the single session over a key/value medium.
///
/// Owns no session logic: only the session manager writes through this
/// store, page and feature code never touches it directly.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Creates a new `SessionStore` over the given key/value backend.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Restores the persisted session, if there is a valid one.
    ///
    /// Fail-safe: a missing key, unparseable user entry, schema
    /// violation, or backend read failure quarantines the persisted
    /// state — the entries are cleared and `None` is returned. Never
    /// surfaces an error to the caller.
    pub async fn load(&self) -> Option<Session> {
        let access_token = match self.kv.get(KEY_ACCESS_TOKEN).await {
            Ok(v) => v,
            Err(e) => return self.quarantine(&format!("access token read failed: {e}")).await,
        };
        let refresh_token = match self.kv.get(KEY_REFRESH_TOKEN).await {
            Ok(v) => v,
            Err(e) => return self.quarantine(&format!("refresh token read failed: {e}")).await,
        };
        let user_json = match self.kv.get(KEY_USER).await {
            Ok(v) => v,
            Err(e) => return self.quarantine(&format!("user read failed: {e}")).await,
        };

        match (access_token, refresh_token, user_json) {
            (None, None, None) => {
                tracing::debug!("🔍 No persisted session found");
                None
            }
            (Some(access_token), Some(refresh_token), Some(user_json)) => {
                let user = match parse_user(&user_json) {
                    Ok(user) => user,
                    Err(reason) => return self.quarantine(&reason).await,
                };
                tracing::info!("✅ Persisted session restored for user: {}", user.id);
                Some(Session {
                    access_token,
                    refresh_token,
                    user,
                })
            }
            _ => self.quarantine("partial session entries").await,
        }
    }

    /// Persists the session.
    ///
    /// The access token is committed last; `load` treats its absence as
    /// absence of the whole session, so a concurrently issued `load`
    /// never observes a partially written one.
    pub async fn save(&self, session: &Session) -> Result<()> {
        let user_json = sonic_rs::to_string(&session.user)?;
        self.kv.set(KEY_USER, &user_json).await?;
        self.kv.set(KEY_REFRESH_TOKEN, &session.refresh_token).await?;
        self.kv.set(KEY_ACCESS_TOKEN, &session.access_token).await?;
        tracing::debug!("💾 Session persisted for user: {}", session.user.id);
        Ok(())
    }

    /// Removes all session entries. Idempotent; backend failures are
    /// logged and swallowed.
    ///
    /// The access token is removed first, mirroring the `save` order,
    /// so an interrupted clear never leaves a loadable session behind.
    pub async fn clear(&self) {
        for key in [KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_USER] {
            if let Err(e) = self.kv.delete(key).await {
                tracing::warn!("❌ Failed to clear session key '{}': {}", key, e);
            }
        }
        tracing::debug!("🧹 Session entries cleared");
    }

    async fn quarantine(&self, reason: &str) -> Option<Session> {
        tracing::warn!("⚠️ Corrupt persisted session discarded: {}", reason);
        self.clear().await;
        None
    }
}

/// Parses and schema-validates a persisted user entry.
fn parse_user(user_json: &str) -> std::result::Result<User, String> {
    let user: User =
        sonic_rs::from_str(user_json).map_err(|e| format!("invalid user JSON: {e}"))?;
    user.validate()
        .map_err(|e| format!("user schema violation: {e}"))?;
    Ok(user)
}
