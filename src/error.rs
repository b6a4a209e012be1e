use thiserror::Error;

/// The library's error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The email/password pair was rejected. This is a user-facing
    /// rejection, never an infrastructure failure.
    #[error("Invalid email or password")]
    Credentials,

    /// The credential validator could not be reached. Only produced by
    /// remote validator implementations; the caller must resubmit
    /// explicitly, no retry is performed here.
    #[error("Credential service unavailable: {0}")]
    Transport(String),

    /// A login completed after a newer login or logout changed the
    /// session epoch. Not a credential failure: the attempt was valid
    /// but its result was discarded, and no state was written.
    #[error("Login superseded by a newer login or logout")]
    Superseded,

    /// A storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] sonic_rs::Error),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AuthError` as the error type.
pub type Result<T> = std::result::Result<T, AuthError>;
