use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use tokio::sync::Notify;

use onion360_session::{
    AuthError, AuthSessionManager, CredentialValidator, KeyValueStore, MemoryStore,
    NavigationSignal, NoopNavigation, RouteDecision, RouteGuard, SessionState, SessionStore,
    StaticCredentialValidator, User,
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .try_init();
});

fn demo_guard() -> RouteGuard {
    RouteGuard::new(["/login".to_string(), "/register".to_string()], "/login")
}

fn demo_sessions() -> (Arc<MemoryStore>, SessionStore) {
    let kv = Arc::new(MemoryStore::new());
    (kv.clone(), SessionStore::new(kv))
}

fn demo_manager(sessions: SessionStore) -> AuthSessionManager {
    AuthSessionManager::new(
        sessions,
        Arc::new(StaticCredentialValidator::with_demo_accounts().unwrap()),
        Arc::new(NoopNavigation),
    )
}

/// Records whether a redirect to the login view was requested.
#[derive(Default)]
struct RecordingNavigation {
    redirected: AtomicBool,
}

impl NavigationSignal for RecordingNavigation {
    fn redirect_to_login(&self) {
        self.redirected.store(true, Ordering::SeqCst);
    }
}

/// A validator that parks inside `validate` until the test releases it.
struct GatedValidator {
    inner: StaticCredentialValidator,
    entered: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
    release: Arc<Notify>,
}

#[async_trait]
impl CredentialValidator for GatedValidator {
    async fn validate(&self, email: &str, password: &str) -> onion360_session::Result<User> {
        self.entered.store(true, Ordering::SeqCst);
        loop {
            let notified = self.release.notified();
            if self.released.load(Ordering::SeqCst) {
                break;
            }
            notified.await;
        }
        self.inner.validate(email, password).await
    }
}

/// A key/value store whose reads park until the test releases them and
/// then serve a frozen snapshot, emulating a hydration read that was
/// issued before later writes landed. Writes pass straight through.
struct GatedStore {
    stale: MemoryStore,
    inner: MemoryStore,
    released: Arc<AtomicBool>,
    release: Arc<Notify>,
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> onion360_session::Result<Option<String>> {
        loop {
            let notified = self.release.notified();
            if self.released.load(Ordering::SeqCst) {
                break;
            }
            notified.await;
        }
        self.stale.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> onion360_session::Result<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> onion360_session::Result<()> {
        self.inner.delete(key).await
    }
}

async fn wait_for(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hydration_restores_persisted_session() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();

        // establish and persist a session with a first manager
        let manager = demo_manager(sessions.clone());
        manager.hydrated().await;
        let session = manager.login("admin@onion360.com", "admin123").await.unwrap();

        // a fresh manager over the same store restores it
        let restarted = demo_manager(sessions);
        let early = restarted.current_state();
        assert!(early == SessionState::Hydrating || early == SessionState::Authenticated(session.clone()));
        restarted.hydrated().await;
        assert_eq!(restarted.current_state(), SessionState::Authenticated(session));
    }

    #[tokio::test]
    async fn hydration_with_empty_store_settles_anonymous() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();
        let manager = demo_manager(sessions);
        manager.hydrated().await;
        assert_eq!(manager.current_state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn corrupt_persisted_session_hydrates_anonymous_and_is_cleared() {
        Lazy::force(&TRACING);
        let (kv, sessions) = demo_sessions();
        kv.set("access_token", "a").await.unwrap();
        kv.set("refresh_token", "r").await.unwrap();
        let bad_user = serde_json::json!({ "id": "not-a-number" }).to_string();
        kv.set("user", &bad_user).await.unwrap();

        let manager = demo_manager(sessions.clone());
        manager.hydrated().await;
        assert_eq!(manager.current_state(), SessionState::Anonymous);

        // corruption is cleared, not repeated
        assert_eq!(kv.get("user").await.unwrap(), None);
        assert!(sessions.load().await.is_none());
    }

    #[tokio::test]
    async fn admin_login_succeeds_end_to_end() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();
        let manager = demo_manager(sessions.clone());
        manager.hydrated().await;

        let session = manager.login("admin@onion360.com", "admin123").await.unwrap();
        assert!(session.user.permissions.contains("admin"));
        assert!(session.user.last_login_at.is_some());
        assert_ne!(session.access_token, session.refresh_token);

        assert!(manager.has_permission("admin"));
        assert_eq!(manager.current_state(), SessionState::Authenticated(session.clone()));

        // written through to the store
        assert_eq!(sessions.load().await, Some(session));
    }

    #[tokio::test]
    async fn rejected_credentials_leave_anonymous_and_write_nothing() {
        Lazy::force(&TRACING);
        let (kv, sessions) = demo_sessions();
        let manager = demo_manager(sessions.clone());
        manager.hydrated().await;

        let err = manager.login("nobody@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Credentials));
        assert_eq!(manager.current_state(), SessionState::Anonymous);
        assert_eq!(kv.get("access_token").await.unwrap(), None);
        assert!(sessions.load().await.is_none());
    }

    #[tokio::test]
    async fn logout_clears_store_and_signals_navigation() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();
        let navigation = Arc::new(RecordingNavigation::default());
        let manager = AuthSessionManager::new(
            sessions.clone(),
            Arc::new(StaticCredentialValidator::with_demo_accounts().unwrap()),
            navigation.clone(),
        );
        manager.hydrated().await;
        manager.login("gerente@onion360.com", "gerente123").await.unwrap();

        manager.logout().await;
        assert_eq!(manager.current_state(), SessionState::Anonymous);
        assert!(sessions.load().await.is_none());
        assert!(navigation.redirected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn logout_during_pending_login_discards_the_login() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();
        let entered = Arc::new(AtomicBool::new(false));
        let released = Arc::new(AtomicBool::new(false));
        let release = Arc::new(Notify::new());
        let validator = Arc::new(GatedValidator {
            inner: StaticCredentialValidator::with_demo_accounts().unwrap(),
            entered: entered.clone(),
            released: released.clone(),
            release: release.clone(),
        });
        let manager = AuthSessionManager::new(sessions.clone(), validator, Arc::new(NoopNavigation));
        manager.hydrated().await;

        let pending = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.login("admin@onion360.com", "admin123").await })
        };
        wait_for(&entered).await;

        // logout lands while the validator is still deliberating
        manager.logout().await;
        released.store(true, Ordering::SeqCst);
        release.notify_waiters();

        let outcome = pending.await.unwrap();
        assert!(matches!(outcome, Err(AuthError::Superseded)));
        assert_eq!(manager.current_state(), SessionState::Anonymous);
        assert!(sessions.load().await.is_none());
    }

    #[tokio::test]
    async fn slow_hydration_does_not_overwrite_an_interim_login() {
        Lazy::force(&TRACING);
        let released = Arc::new(AtomicBool::new(false));
        let release = Arc::new(Notify::new());
        let gated = GatedStore {
            stale: MemoryStore::new(),
            inner: MemoryStore::new(),
            released: released.clone(),
            release: release.clone(),
        };

        // a stale session sits in storage from a previous run
        let stale_user = User {
            id: 2,
            email: "gerente@onion360.com".to_string(),
            name: "Gerente de Reservas".to_string(),
            active: true,
            permissions: ["bookings.read".to_string()].into_iter().collect(),
            created_at: chrono::Utc::now(),
            last_login_at: None,
        };
        gated.stale.set("user", &serde_json::to_string(&stale_user).unwrap()).await.unwrap();
        gated.stale.set("refresh_token", "stale-refresh").await.unwrap();
        gated.stale.set("access_token", "stale-access").await.unwrap();

        let sessions = SessionStore::new(Arc::new(gated));
        let manager = demo_manager(sessions.clone());
        assert_eq!(manager.current_state(), SessionState::Hydrating);

        // login completes while hydration is still stuck reading
        let session = manager.login("admin@onion360.com", "admin123").await.unwrap();
        assert_eq!(manager.current_state(), SessionState::Authenticated(session.clone()));

        released.store(true, Ordering::SeqCst);
        release.notify_waiters();
        manager.hydrated().await;

        // the stale hydration result was discarded
        assert_eq!(manager.current_state(), SessionState::Authenticated(session));
        assert_ne!(
            manager.current_state().session().unwrap().access_token,
            "stale-access"
        );
    }

    #[tokio::test]
    async fn route_guard_end_to_end() {
        Lazy::force(&TRACING);
        let guard = demo_guard();
        let (_, sessions) = demo_sessions();
        let manager = demo_manager(sessions);
        manager.hydrated().await;

        assert_eq!(
            guard.decide("/dashboard", &manager.current_state()),
            RouteDecision::Redirect("/login".to_string())
        );

        manager.login("admin@onion360.com", "admin123").await.unwrap();
        assert_eq!(
            guard.decide("/login", &manager.current_state()),
            RouteDecision::Render { shell: false }
        );
        assert_eq!(
            guard.decide("/dashboard", &manager.current_state()),
            RouteDecision::Render { shell: true }
        );
    }

    #[tokio::test]
    async fn anonymous_caller_has_no_permissions() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();
        let manager = demo_manager(sessions);
        manager.hydrated().await;

        assert!(!manager.has_permission("anything"));
        assert!(!manager.has_permission("admin"));
        // the empty requirement is satisfied even without a session
        assert!(manager.has_permission(""));
    }

    #[tokio::test]
    async fn scoped_account_sees_only_its_grants() {
        Lazy::force(&TRACING);
        let (_, sessions) = demo_sessions();
        let manager = demo_manager(sessions);
        manager.hydrated().await;
        manager.login("gerente@onion360.com", "gerente123").await.unwrap();

        assert!(manager.has_permission("bookings.read"));
        assert!(manager.has_permission("bookings.*"));
        assert!(!manager.has_permission("admin"));
        assert!(!manager.has_permission("payments.refund"));
    }
}
