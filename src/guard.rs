use std::collections::HashSet;

use crate::config::Config;
use crate::services::auth::SessionState;

/// The declarative outcome of a route-access check.
///
/// The guard decides, the caller applies: rendering, redirecting and
/// loading placeholders stay in the routing layer, never as side
/// effects inside decision logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Hydration is still in flight: suspend rendering and show a
    /// loading placeholder.
    Suspend,
    /// Redirect to the given path instead of rendering.
    Redirect(String),
    /// Render the requested content; with `shell` set, wrap it in the
    /// full application shell.
    Render {
        /// Whether to wrap the content in the application shell.
        shell: bool,
    },
}

impl RouteDecision {
    /// Returns `true` if the requested content may render.
    pub fn allows_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }

    /// Returns the redirect target, if the decision is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect(path) => Some(path),
            _ => None,
        }
    }
}

/// Gates which views may render for the current session state.
///
/// Consulted once per navigation; keeps no memory between navigations
/// beyond the fixed whitelist it was built with.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    public_paths: HashSet<String>,
    login_path: String,
}

impl RouteGuard {
    /// Creates a guard from a public-path whitelist and the login path.
    pub fn new(public_paths: impl IntoIterator<Item = String>, login_path: impl Into<String>) -> Self {
        Self {
            public_paths: public_paths.into_iter().collect(),
            login_path: login_path.into(),
        }
    }

    /// Creates a guard from the library configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.public_paths.iter().cloned(), config.login_path.clone())
    }

    /// Decides whether `path` may render under `state`.
    ///
    /// While hydrating, every path suspends. Anonymous callers only
    /// reach whitelisted paths and are otherwise redirected to the
    /// login path. Authenticated callers reach everything; whitelisted
    /// paths render bare (no forced redirect away from them), all
    /// others render inside the application shell.
    pub fn decide(&self, path: &str, state: &SessionState) -> RouteDecision {
        let public = self.public_paths.contains(path);

        let decision = match state {
            SessionState::Hydrating => RouteDecision::Suspend,
            SessionState::Anonymous if public => RouteDecision::Render { shell: false },
            SessionState::Anonymous => RouteDecision::Redirect(self.login_path.clone()),
            SessionState::Authenticated(_) if public => RouteDecision::Render { shell: false },
            SessionState::Authenticated(_) => RouteDecision::Render { shell: true },
        };

        tracing::debug!("🚦 Route '{}' -> {:?}", path, decision);
        decision
    }
}
