//! Scripted walkthrough of the session core: hydrate, log in with the
//! demo admin account, evaluate permissions and routes, log out.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onion360_session::{
    AuthSessionManager, Config, FileStore, NoopNavigation, RouteGuard, SessionStore,
    StaticCredentialValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let store = FileStore::open(&config.store_dir).await?;
    let sessions = SessionStore::new(Arc::new(store));
    let validator = Arc::new(StaticCredentialValidator::with_demo_accounts()?);
    let manager = AuthSessionManager::new(sessions, validator, Arc::new(NoopNavigation));
    let guard = RouteGuard::from_config(&config);

    manager.hydrated().await;
    tracing::info!("🔍 State after hydration: {:?}", manager.current_state());

    if !manager.current_state().is_authenticated() {
        let session = manager.login("admin@onion360.com", "admin123").await?;
        tracing::info!("✅ Logged in as {}", session.user.email);
    }

    for path in ["/dashboard", "/login", "/reports"] {
        tracing::info!(
            "🚦 {} -> {:?}",
            path,
            guard.decide(path, &manager.current_state())
        );
    }
    for permission in ["admin", "bookings.read", "payments.*"] {
        tracing::info!(
            "🔑 has_permission({}) = {}",
            permission,
            manager.has_permission(permission)
        );
    }

    manager.logout().await;
    tracing::info!("🔍 State after logout: {:?}", manager.current_state());

    Ok(())
}
