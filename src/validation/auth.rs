use crate::error::{AuthError, Result};

/// Validates the shape of a login email.
///
/// Shape checks only; whether the address belongs to an account is the
/// credential validator's call. Rejections surface as the same
/// credential error a failed lookup would.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || email.len() > 255 {
        tracing::warn!("❌ Login rejected: email length out of range");
        return Err(AuthError::Credentials);
    }

    let Some((local, domain)) = email.split_once('@') else {
        tracing::warn!("❌ Login rejected: email has no '@'");
        return Err(AuthError::Credentials);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        tracing::warn!("❌ Login rejected: malformed email");
        return Err(AuthError::Credentials);
    }

    Ok(())
}

/// Validates the shape of a login password.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() || password.len() > 128 {
        tracing::warn!("❌ Login rejected: password length out of range");
        return Err(AuthError::Credentials);
    }

    Ok(())
}
