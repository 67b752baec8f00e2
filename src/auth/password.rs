//! Password hashing and verification using Argon2id

use crate::error::AppError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// One-way credential hasher with fixed work-factor parameters
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Create hasher with OWASP-recommended parameters:
    /// m=64MiB, t=3 iterations, p=4 lanes
    pub fn new() -> Self {
        let params = Params::new(65536, 3, 4, None).expect("Invalid Argon2 params");

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Hash a secret. Each call draws a fresh random salt, so hashing the
    /// same secret twice yields different digests.
    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let digest = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash credential: {:?}", e);
                AppError::internal("Failed to hash credential")
            })?
            .to_string();

        Ok(digest)
    }

    /// Verify a secret against a stored digest. Comparison happens in
    /// constant time inside the argon2 crate; a digest that does not parse
    /// is a verification failure, not an error.
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Stored digest did not parse: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}
