//! Password hashing and verification using Argon2id.

use std::sync::{Arc, OnceLock};

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;

use crate::{Error, Result, TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET};

/// One-way, salted password hashing.
///
/// Implementations must be slow and embed a per-call random salt in their
/// output. Plaintext passwords are never stored, logged or compared directly.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into an opaque, self-describing string.
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` for a wrong password and an error only when the
    /// stored hash is unusable or the primitive itself fails.
    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool>;

    /// Performs a verification that always fails but costs as much as a real one.
    ///
    /// Used when no account matches, so response timing does not reveal
    /// whether an account exists.
    fn verify_dummy_password(&self, password: &str) -> bool;
}

/// Argon2id [`PasswordHasher`] with OWASP recommended parameters by default.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<OnceLock<Option<String>>>,
}

impl Argon2PasswordHasher {
    /// Creates a new instance with the default Argon2id parameters.
    pub fn new() -> Self {
        Self::from_argon2(Argon2::default())
    }

    /// Creates a new instance with custom cost parameters.
    ///
    /// # Arguments
    ///
    /// * `m_cost` - Memory size in KiB
    /// * `t_cost` - Number of iterations
    /// * `p_cost` - Degree of parallelism
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None).map_err(|e| {
            Error::invalid_input("Invalid Argon2 parameters").with_source(e)
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self::from_argon2(argon2))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        Self {
            argon2,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Returns a lazily computed hash of a random password.
    fn dummy_hash(&self) -> Option<&str> {
        self.dummy_hash
            .get_or_init(|| {
                let len = rand::thread_rng().gen_range(16..32);
                let dummy_password: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(len)
                    .map(char::from)
                    .collect();

                self.hash_password(&dummy_password).ok()
            })
            .as_deref()
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                Error::unexpected("password_hasher", "Password processing failed").with_source(e)
            })?;

        Ok(password_hash.to_string())
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "invalid password hash format provided"
            );

            Error::unexpected("password_hasher", "Stored password hash is unusable").with_source(e)
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "password verification failed: incorrect password provided"
                );

                Ok(false)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );

                Err(Error::unexpected("password_hasher", "Verification error").with_source(e))
            }
        }
    }

    fn verify_dummy_password(&self, password: &str) -> bool {
        if let Some(dummy_hash) = self.dummy_hash() {
            let _ = self.verify_password(password, dummy_hash);
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_params(1024, 1, 1).expect("valid params")
    }

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = hasher();
        let password = "secure_password_123";
        let hash = hasher.hash_password(password)?;

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, password);
        assert!(hasher.verify_password(password, &hash)?);
        assert!(!hasher.verify_password("wrong_password", &hash)?);

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = hasher();
        let password = "test_password";

        let hash1 = hasher.hash_password(password)?;
        let hash2 = hasher.hash_password(password)?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify_password(password, &hash1)?);
        assert!(hasher.verify_password(password, &hash2)?);

        Ok(())
    }

    #[test]
    fn verify_password_returns_error_for_invalid_hash() {
        let hasher = hasher();
        let result = hasher.verify_password("test_password", "invalid_hash_format");

        let error = result.expect_err("invalid hash must be rejected");
        assert_eq!(error.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn dummy_verification_always_fails() {
        let hasher = hasher();
        assert!(!hasher.verify_dummy_password("anything"));
        assert!(!hasher.verify_dummy_password("anything"));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let result = Argon2PasswordHasher::with_params(1, 0, 0);
        assert!(result.is_err());
    }
}
