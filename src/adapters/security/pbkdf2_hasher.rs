//! PBKDF2-HMAC-SHA256 password hashing. Implements PasswordHasherPort.
//!
//! Hashes are PHC strings (`$pbkdf2-sha256$i=...,l=32$salt$hash`), so the
//! round count travels with each hash and can be raised without migrating old rows.

use crate::domain::DomainError;
use crate::ports::PasswordHasherPort;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Algorithm, Params, Pbkdf2};

/// Default iteration count for new hashes.
pub const DEFAULT_ROUNDS: u32 = 600_000;

/// Derived key length in bytes.
const OUTPUT_LEN: usize = 32;

pub struct Pbkdf2Hasher {
    rounds: u32,
}

impl Pbkdf2Hasher {
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl PasswordHasherPort for Pbkdf2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params {
            rounds: self.rounds,
            output_length: OUTPUT_LEN,
        };
        let hash = Pbkdf2
            .hash_password_customized(
                password.as_bytes(),
                Some(Algorithm::Pbkdf2Sha256.ident()),
                None,
                params,
                &salt,
            )
            .map_err(|e| DomainError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        // Round count comes from the stored hash, not from `self`.
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Pbkdf2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_and_rejects_wrong_password() {
        let hasher = Pbkdf2Hasher::new(1_000);
        let hash = hasher.hash("Secret1!").unwrap();

        assert!(hash.starts_with("$pbkdf2-sha256$"));
        assert!(!hash.contains("Secret1!"));
        assert!(hasher.verify("Secret1!", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_salts_differ_per_hash() {
        let hasher = Pbkdf2Hasher::new(1_000);
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn test_verify_uses_rounds_from_stored_hash() {
        let old = Pbkdf2Hasher::new(1_000).hash("pw").unwrap();
        assert!(Pbkdf2Hasher::new(2_000).verify("pw", &old));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let hasher = Pbkdf2Hasher::new(1_000);
        assert!(!hasher.verify("pw", "not-a-phc-string"));
        assert!(!hasher.verify("pw", ""));
    }
}
