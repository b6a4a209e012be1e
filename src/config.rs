use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};

/// The library's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The path of the login view, used as the redirect target for
    /// anonymous access to protected paths.
    pub login_path: String,
    /// Paths reachable without an authenticated session.
    pub public_paths: Vec<String>,
    /// The directory backing the file-based session store.
    pub store_dir: PathBuf,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let login_path = env::var("AUTH_LOGIN_PATH")
            .unwrap_or_else(|_| "/login".to_string());

        let public_paths: Vec<String> = env::var("AUTH_PUBLIC_PATHS")
            .unwrap_or_else(|_| "/login,/register".to_string())
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if !public_paths.contains(&login_path) {
            anyhow::bail!("AUTH_PUBLIC_PATHS must include the login path ({})", login_path);
        }

        let store_dir: PathBuf = env::var("AUTH_STORE_DIR")
            .unwrap_or_else(|_| ".onion360-session".to_string())
            .parse()
            .context("Invalid AUTH_STORE_DIR")?;

        Ok(Self {
            login_path,
            public_paths,
            store_dir,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            public_paths: vec!["/login".to_string(), "/register".to_string()],
            store_dir: PathBuf::from(".onion360-session"),
        }
    }
}
