use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

use crate::crypto::token;
use crate::error::{AuthError, Result};
use crate::models::session::Session;
use crate::permissions;
use crate::repositories::session::SessionStore;
use crate::services::credentials::CredentialValidator;
use crate::validation::auth::{validate_email, validate_password};

/// The observable state of the session lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup restore of a persisted session is still in flight.
    Hydrating,
    /// No authenticated session.
    Anonymous,
    /// An established session.
    Authenticated(Session),
}

impl SessionState {
    /// Returns `true` if a session is established.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the established session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// A collaborator notified when logout requires navigation back to the
/// login view. Owned by the UI/routing layer, not by this core.
pub trait NavigationSignal: Send + Sync {
    /// Requests a redirect to the login view.
    fn redirect_to_login(&self);
}

/// A `NavigationSignal` that does nothing, for headless consumers and
/// tests.
pub struct NoopNavigation;

impl NavigationSignal for NoopNavigation {
    fn redirect_to_login(&self) {}
}

struct ManagerInner {
    state: RwLock<SessionState>,
    /// Bumped by every login and logout; async results are applied only
    /// if the epoch they captured is still current.
    epoch: AtomicU64,
    store: SessionStore,
    validator: Arc<dyn CredentialValidator>,
    navigation: Arc<dyn NavigationSignal>,
    hydration_done: AtomicBool,
    hydration_notify: Notify,
}

impl ManagerInner {
    /// Applies `state` only if `epoch` is still current. Returns whether
    /// it was applied.
    fn apply_if_current(&self, epoch: u64, state: SessionState) -> bool {
        let mut current = self.state.write();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        *current = state;
        true
    }
}

/// Orchestrates the session lifecycle: startup hydration, login, logout.
///
/// Owns the only mutable session state in the process. Construct one
/// instance per client and hand it (cheaply cloned) to consumers; there
/// is deliberately no ambient singleton.
///
/// Lifecycle: construction immediately starts hydration from the
/// [`SessionStore`]; the manager reads as [`SessionState::Hydrating`]
/// until the restore resolves to `Authenticated` or `Anonymous`. Login
/// and logout transition between `Authenticated` and `Anonymous`
/// directly and write through to the store.
#[derive(Clone)]
pub struct AuthSessionManager {
    inner: Arc<ManagerInner>,
}

impl AuthSessionManager {
    /// Creates the manager and immediately begins hydrating the
    /// persisted session on the current tokio runtime.
    pub fn new(
        store: SessionStore,
        validator: Arc<dyn CredentialValidator>,
        navigation: Arc<dyn NavigationSignal>,
    ) -> Self {
        let inner = Arc::new(ManagerInner {
            state: RwLock::new(SessionState::Hydrating),
            epoch: AtomicU64::new(0),
            store,
            validator,
            navigation,
            hydration_done: AtomicBool::new(false),
            hydration_notify: Notify::new(),
        });

        let hydrate = inner.clone();
        let epoch = hydrate.epoch.load(Ordering::SeqCst);
        tokio::spawn(async move {
            let restored = hydrate.store.load().await;
            let next = match restored {
                Some(session) => SessionState::Authenticated(session),
                None => SessionState::Anonymous,
            };
            if hydrate.apply_if_current(epoch, next) {
                tracing::info!("✅ Hydration settled");
            } else {
                // a login or logout won the race; its state stands
                tracing::debug!("🔄 Hydration result discarded after epoch change");
            }
            hydrate.hydration_done.store(true, Ordering::Release);
            hydrate.hydration_notify.notify_waiters();
        });

        Self { inner }
    }

    /// Synchronous, non-blocking snapshot of the current state.
    pub fn current_state(&self) -> SessionState {
        self.inner.state.read().clone()
    }

    /// Returns whether the session's permissions satisfy `required`.
    ///
    /// Convenience over [`permissions::has_permission`] and
    /// [`current_state`](Self::current_state); hydration in flight
    /// counts as no session.
    pub fn has_permission(&self, required: &str) -> bool {
        let state = self.inner.state.read();
        permissions::has_permission(state.session(), required)
    }

    /// Completes once startup hydration has resolved (even if its
    /// result was discarded by an interim login or logout).
    pub async fn hydrated(&self) {
        if self.inner.hydration_done.load(Ordering::Acquire) {
            return;
        }
        let notified = self.inner.hydration_notify.notified();
        if self.inner.hydration_done.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }

    /// Attempts to establish a session from a credential pair.
    ///
    /// Delegates to the configured [`CredentialValidator`]. On success a
    /// session with freshly generated opaque tokens is persisted and the
    /// manager transitions to `Authenticated`. A rejected pair returns
    /// [`AuthError::Credentials`] and writes nothing; only validator
    /// infrastructure failures surface as [`AuthError::Transport`].
    ///
    /// If a newer `login` or `logout` is issued while validation is in
    /// flight, this attempt resolves to [`AuthError::Superseded`] and
    /// its result is discarded.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        validate_email(email)?;
        validate_password(password)?;

        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("🔐 Login attempt: {}", email);

        let mut user = match self.inner.validator.validate(email, password).await {
            Ok(user) => user,
            Err(e) => {
                self.settle_failed_attempt(epoch);
                return Err(e);
            }
        };

        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            tracing::info!("🔄 Login result discarded: superseded during validation");
            return Err(AuthError::Superseded);
        }

        user.last_login_at = Some(Utc::now());
        let session = Session {
            access_token: token::generate_token(),
            refresh_token: token::generate_token(),
            user,
        };

        if let Err(e) = self.inner.store.save(&session).await {
            tracing::error!("❌ Session write-through failed: {}", e);
            self.settle_failed_attempt(epoch);
            return Err(e);
        }

        if self.inner.apply_if_current(epoch, SessionState::Authenticated(session.clone())) {
            tracing::info!("✅ User logged in: {}", session.user.id);
            Ok(session)
        } else {
            // a logout raced the write-through; leave nothing behind
            tracing::info!("🔄 Login result discarded: superseded during persist");
            self.inner.store.clear().await;
            Err(AuthError::Superseded)
        }
    }

    /// Settles the state after a login attempt that will not establish
    /// a session. A still-hydrating manager becomes anonymous (its
    /// hydration result is already doomed by the epoch bump); an
    /// established session is never torn down by a bad retry.
    fn settle_failed_attempt(&self, epoch: u64) {
        let mut state = self.inner.state.write();
        if self.inner.epoch.load(Ordering::SeqCst) == epoch && *state == SessionState::Hydrating {
            *state = SessionState::Anonymous;
        }
    }

    /// Tears down the session unconditionally.
    ///
    /// Callable from any state, including mid-hydration: the epoch bump
    /// guarantees any in-flight hydration or login result is discarded.
    /// Clears the store, transitions to `Anonymous`, and signals the
    /// navigation collaborator to redirect to the login view.
    pub async fn logout(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.inner.state.write();
            if let SessionState::Authenticated(session) = &*state {
                tracing::info!("👋 User logged out: {}", session.user.id);
            }
            *state = SessionState::Anonymous;
        }
        self.inner.store.clear().await;
        self.inner.navigation.redirect_to_login();
    }
}
