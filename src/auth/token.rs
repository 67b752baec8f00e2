//! Token issuance and verification
//! Signed, self-contained HS256 tokens carrying the subject's identity and
//! role with an absolute expiry

use crate::{config::AppConfig, error::AppError, models::user::Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every issued token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Subject's role at issue time
    pub role: Role,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Why a token failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token could not be parsed into claims + signature
    #[error("token is malformed")]
    Malformed,

    /// Signature recomputed over the claims does not match
    #[error("token signature mismatch")]
    SignatureMismatch,

    /// Current time is at or past the embedded expiry
    #[error("token is expired")]
    Expired,
}

/// Token codec bound to the process secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl TokenCodec {
    /// Create codec from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: config.security.token_ttl_secs,
        })
    }

    /// Configured token lifetime (seconds)
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for the subject with the configured TTL
    pub fn issue(&self, subject: Uuid, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.ttl_secs as i64);

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::internal("Failed to encode token")
        })
    }

    /// Verify a token and recover its claims.
    ///
    /// The signature is checked first, then expiry. Expiry is strict with
    /// zero leeway: `now >= exp` is expired, so the library's skew-tolerant
    /// check is disabled in favor of an explicit comparison.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
                _ => TokenError::Malformed,
            })?
            .claims;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
