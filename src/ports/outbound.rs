//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, ImageTensor, Prediction, UserRecord};

/// Credential store. Durable, keyed by unique username and unique email.
#[async_trait::async_trait]
pub trait UserRepoPort: Send + Sync {
    /// Create the users table if absent. Safe to call repeatedly.
    async fn initialize(&self) -> Result<(), DomainError>;

    /// Persist a new user. Fails with `DomainError::DuplicateKey` when the
    /// username or email is already taken; nothing is written in that case.
    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), DomainError>;

    /// Stored hash for `email`, or `None` when no such user exists.
    async fn find_password_hash(&self, email: &str) -> Result<Option<String>, DomainError>;

    /// Full record for `email`.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;
}

/// Salted, iterated one-way password hashing.
pub trait PasswordHasherPort: Send + Sync {
    /// Hash with a fresh random salt. Output is self-describing (algorithm, params, salt).
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Constant-time check of `password` against a stored hash.
    /// A malformed stored hash verifies as `false`.
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Fixed, pre-trained image classifier.
pub trait ClassifierPort: Send + Sync {
    /// One forward pass. Deterministic for given weights and input.
    fn predict(&self, image: &ImageTensor) -> Result<Prediction, DomainError>;
}

/// Decodes uploaded bytes into the classifier's input format.
pub trait ImageDecoderPort: Send + Sync {
    /// Returns the preprocessed tensor and the original (width, height).
    fn preprocess(&self, bytes: &[u8]) -> Result<(ImageTensor, (u32, u32)), DomainError>;
}
