//! Argon2id password verifier.
//!
//! Uses OWASP-recommended Argon2id parameters:
//! m=19456 (19 MiB), t=2, p=1.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use panelist_application::PasswordVerifier as PasswordVerifierPort;
use panelist_core::{AppError, AppResult};

/// Argon2id verifier with OWASP-recommended parameters.
#[derive(Clone)]
pub struct Argon2PasswordVerifier {
    argon2: Argon2<'static>,
}

impl Argon2PasswordVerifier {
    /// Creates a verifier with the recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19_456, 2, 1, None).unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordVerifierPort for Argon2PasswordVerifier {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("failed to parse password hash: {error}"))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use panelist_application::PasswordVerifier as _;
    use panelist_core::AppResult;

    use super::Argon2PasswordVerifier;

    #[test]
    fn verifies_matching_password_only() -> AppResult<()> {
        let verifier = Argon2PasswordVerifier::new();
        let hash = verifier.hash_password("interview-ready")?;

        assert!(verifier.verify_password("interview-ready", &hash)?);
        assert!(!verifier.verify_password("interview-unready", &hash)?);
        Ok(())
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        let verifier = Argon2PasswordVerifier::new();
        assert!(verifier.verify_password("anything", "not-a-phc-string").is_err());
    }
}
