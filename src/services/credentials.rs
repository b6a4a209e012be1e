use async_trait::async_trait;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::{AuthError, Result};
use crate::models::user::User;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Validates a credential pair against an identity backend.
///
/// This is the pluggable seam between the session core and whatever
/// actually knows the accounts. A production implementation calls an
/// identity provider and maps its outages to
/// [`AuthError::Transport`](crate::error::AuthError::Transport);
/// [`StaticCredentialValidator`] is the shipped local allow-list.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Resolves a credential pair to the account's user record.
    ///
    /// # Errors
    ///
    /// [`AuthError::Credentials`](crate::error::AuthError::Credentials)
    /// for a rejected pair,
    /// [`AuthError::Transport`](crate::error::AuthError::Transport) if
    /// the backend could not be reached.
    async fn validate(&self, email: &str, password: &str) -> Result<User>;
}

/// Hashes a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AuthError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AuthError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Internal(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

struct Account {
    user: User,
    password_hash: String,
}

/// A static allow-list credential validator.
///
/// Stands in for a real identity provider; ships the two Onion360 demo
/// accounts. Passwords are held as Argon2id hashes, never in plain
/// text, and inactive accounts are rejected.
pub struct StaticCredentialValidator {
    accounts: Vec<Account>,
}

impl StaticCredentialValidator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self { accounts: Vec::new() }
    }

    /// Creates a validator holding the two demo accounts.
    ///
    /// # Returns
    ///
    /// A `Result` containing the validator.
    pub fn with_demo_accounts() -> Result<Self> {
        let mut validator = Self::new();

        validator.add_account(
            User {
                id: 1,
                email: "admin@onion360.com".to_string(),
                name: "Administrador".to_string(),
                active: true,
                permissions: ["*", "admin"].iter().map(|p| p.to_string()).collect(),
                created_at: Utc::now(),
                last_login_at: None,
            },
            "admin123",
        )?;

        validator.add_account(
            User {
                id: 2,
                email: "gerente@onion360.com".to_string(),
                name: "Gerente de Reservas".to_string(),
                active: true,
                permissions: [
                    "bookings.read",
                    "bookings.write",
                    "reports.view",
                    "notifications.read",
                ]
                .iter()
                .map(|p| p.to_string())
                .collect(),
                created_at: Utc::now(),
                last_login_at: None,
            },
            "gerente123",
        )?;

        Ok(validator)
    }

    /// Registers an account with the given plain-text password, which
    /// is hashed before storage.
    pub fn add_account(&mut self, user: User, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;
        self.accounts.push(Account { user, password_hash });
        Ok(())
    }
}

#[async_trait]
impl CredentialValidator for StaticCredentialValidator {
    async fn validate(&self, email: &str, password: &str) -> Result<User> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email) && a.user.active)
            .ok_or_else(|| {
                tracing::warn!("❌ Unknown or inactive account: {}", email);
                AuthError::Credentials
            })?;

        if !verify_password(password, &account.password_hash)? {
            tracing::warn!("❌ Wrong password for: {}", email);
            return Err(AuthError::Credentials);
        }

        tracing::debug!("✅ Credentials accepted for: {}", email);
        Ok(account.user.clone())
    }
}

impl Default for StaticCredentialValidator {
    fn default() -> Self {
        Self::new()
    }
}
