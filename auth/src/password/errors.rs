use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Password does not match hash")]
    Mismatch,

    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
}
