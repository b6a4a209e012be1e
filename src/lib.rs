//! Session & access-control core for the Onion360 admin console.
//!
//! Everything a client needs to establish, persist, restore and tear
//! down an authenticated session, and to gate views and actions on a
//! permission grammar:
//!
//! - [`AuthSessionManager`] — the session lifecycle (hydration on
//!   startup, epoch-guarded login/logout, synchronous state snapshot).
//! - [`SessionStore`] — fail-safe persistence of the session over an
//!   abstract [`KeyValueStore`] medium.
//! - [`permissions::has_permission`] — pure wildcard permission
//!   evaluation.
//! - [`RouteGuard`] — declarative allow/redirect/suspend decisions per
//!   navigation.
//!
//! Credential validation is a pluggable seam ([`CredentialValidator`]);
//! the shipped [`StaticCredentialValidator`] holds the demo accounts.
//! This is a local library boundary — no wire protocol is defined here.

pub mod config;
pub mod error;
pub mod guard;
pub mod permissions;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod session;
}

pub mod services {
    pub mod auth;
    pub mod credentials;
}

pub mod store {
    pub mod file;
    pub mod kv;
    pub mod memory;
}

pub mod validation {
    pub mod auth;
}

pub use config::Config;
pub use error::{AuthError, Result};
pub use guard::{RouteDecision, RouteGuard};
pub use models::session::Session;
pub use models::user::User;
pub use repositories::session::SessionStore;
pub use services::auth::{AuthSessionManager, NavigationSignal, NoopNavigation, SessionState};
pub use services::credentials::{CredentialValidator, StaticCredentialValidator};
pub use store::file::FileStore;
pub use store::kv::KeyValueStore;
pub use store::memory::MemoryStore;
