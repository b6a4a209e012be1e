use rand::RngCore;
use rand::rngs::OsRng;
use base64::{Engine as _, engine::general_purpose};

/// The size of a session token in bytes.
const TOKEN_SIZE: usize = 32;

/// Generates a new opaque session token.
///
/// # Returns
///
/// A URL-safe base64-encoded random token.
pub fn generate_token() -> String {
    let mut token = [0u8; TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}
