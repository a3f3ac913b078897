//! Registration and login against the credential store.
//!
//! Passwords only ever leave this module as PBKDF2 hashes. Hashing runs on the
//! blocking pool since it is deliberately slow.

use crate::domain::{DomainError, RegistrationError, UserRecord};
use crate::ports::{PasswordHasherPort, UserRepoPort};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AuthService {
    repo: Arc<dyn UserRepoPort>,
    hasher: Arc<dyn PasswordHasherPort>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepoPort>, hasher: Arc<dyn PasswordHasherPort>) -> Self {
        Self { repo, hasher }
    }

    /// Create an account. Checks the confirmation first, then required fields,
    /// then lets the store's UNIQUE constraints decide duplicates.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), RegistrationError> {
        if password != confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }
        if username.trim().is_empty() {
            return Err(RegistrationError::MissingField("Username"));
        }
        if email.trim().is_empty() {
            return Err(RegistrationError::MissingField("Email"));
        }
        if password.is_empty() {
            return Err(RegistrationError::MissingField("Password"));
        }

        let hash = self.hash_blocking(password.to_owned()).await?;
        match self.repo.insert(username, email, &hash).await {
            Ok(()) => {
                info!(username, email, "registration succeeded");
                Ok(())
            }
            Err(DomainError::DuplicateKey(column)) => {
                warn!(username, email, column = %column, "registration rejected: user exists");
                Err(RegistrationError::UserExists)
            }
            Err(e) => Err(RegistrationError::Storage(e)),
        }
    }

    /// `true` only if `email` exists and `password` matches its hash.
    /// Unknown email and wrong password both yield `false`.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, DomainError> {
        let Some(stored) = self.repo.find_password_hash(email).await? else {
            info!(email, "login failed");
            return Ok(false);
        };
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| DomainError::Hash(e.to_string()))?;
        if ok {
            info!(email, "login succeeded");
        } else {
            info!(email, "login failed");
        }
        Ok(ok)
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        self.repo.find_by_email(email).await
    }

    async fn hash_blocking(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::Hash(e.to_string()))?
    }
}
