//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repo(String),

    /// Username or email already taken (UNIQUE constraint).
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// Weight file missing or not matching the network architecture. Fatal at startup.
    #[error("Model error: {0}")]
    Model(String),

    #[error("Image decode failed: {0}")]
    Image(String),

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in")]
    NotAuthenticated,
}

/// Registration failures shown back to the user.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("User already exists. Try a different email or username.")]
    UserExists,

    #[error("{0} must not be empty.")]
    MissingField(&'static str),

    #[error(transparent)]
    Storage(#[from] DomainError),
}
