//! Per-request authorization gate
//!
//! Each request starts unauthenticated and ends in exactly one of two
//! terminal states: authorized, with the caller's identity attached to the
//! request extensions, or rejected with a reason. The decision is a pure
//! function of the authorization header, the route's allowed-role set and
//! the clock; nothing else is consulted.

use crate::{error::AppError, models::user::Role};

use super::token::TokenCodec;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// Roles admitted to routes that only require a valid credential
pub const ANY_ROLE: &[Role] = &[Role::Student, Role::Faculty, Role::Admin, Role::Superadmin];

/// Roles admitted to administrative routes
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::Superadmin];

/// Authenticated identity attached to the request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No bearer credential in the authorization header
    MissingCredential,
    /// Credential present but malformed, forged or expired
    InvalidCredential,
    /// Valid credential, role not in the route's allowed set
    InsufficientPrivilege,
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            // A missing and an unusable credential are both a 401; only a
            // valid credential with the wrong role is a 403.
            DenyReason::MissingCredential | DenyReason::InvalidCredential => AppError::Unauthorized,
            DenyReason::InsufficientPrivilege => AppError::Forbidden,
        }
    }
}

/// Pull the bearer token out of the authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Evaluate the gate for one request
pub fn authorize(
    codec: &TokenCodec,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<AuthContext, DenyReason> {
    let token = extract_bearer(headers).ok_or(DenyReason::MissingCredential)?;

    let claims = codec.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, "Credential rejected");
        DenyReason::InvalidCredential
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DenyReason::InvalidCredential)?;

    if !allowed.contains(&claims.role) {
        tracing::warn!(
            user_id = %user_id,
            role = %claims.role,
            "Role not in route's allowed set"
        );
        return Err(DenyReason::InsufficientPrivilege);
    }

    Ok(AuthContext {
        user_id,
        role: claims.role,
    })
}

/// Middleware: any authenticated caller
pub async fn require_authenticated(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = authorize(&codec, req.headers(), ANY_ROLE)?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Middleware: administrative callers only
pub async fn require_admin(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = authorize(&codec, req.headers(), ADMIN_ROLES)?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

// Allows handlers to take AuthContext as an argument directly
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AppConfig, DatabaseConfig, LoggingConfig, PaginationConfig, SecurityConfig, ServerConfig,
    };
    use secrecy::Secret;

    fn codec(ttl_secs: u64) -> TokenCodec {
        let config = AppConfig {
            server: ServerConfig {
                addr: "127.0.0.1:3000".to_string(),
                graceful_shutdown_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: Secret::new("postgresql://localhost/test".to_string()),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
                token_ttl_secs: ttl_secs,
            },
            pagination: PaginationConfig { max_page_size: 100 },
        };
        TokenCodec::from_config(&config).unwrap()
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {}", token).parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = bearer_headers("token123");
        assert_eq!(extract_bearer(&headers), Some("token123"));

        assert_eq!(extract_bearer(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_missing_credential() {
        let codec = codec(3600);
        let result = authorize(&codec, &HeaderMap::new(), ANY_ROLE);
        assert_eq!(result.unwrap_err(), DenyReason::MissingCredential);
    }

    #[test]
    fn test_invalid_credential() {
        let codec = codec(3600);
        let headers = bearer_headers("definitely-not-a-token");
        let result = authorize(&codec, &headers, ANY_ROLE);
        assert_eq!(result.unwrap_err(), DenyReason::InvalidCredential);
    }

    #[test]
    fn test_expired_credential_is_invalid() {
        let expired = codec(0);
        let token = expired.issue(Uuid::new_v4(), Role::Admin).unwrap();

        let result = authorize(&codec(3600), &bearer_headers(&token), ANY_ROLE);
        assert_eq!(result.unwrap_err(), DenyReason::InvalidCredential);
    }

    #[test]
    fn test_role_outside_allowed_set_is_forbidden() {
        let codec = codec(3600);
        let token = codec.issue(Uuid::new_v4(), Role::Student).unwrap();

        let result = authorize(&codec, &bearer_headers(&token), &[Role::Admin]);
        assert_eq!(result.unwrap_err(), DenyReason::InsufficientPrivilege);
    }

    #[test]
    fn test_role_inside_allowed_set_is_authorized() {
        let codec = codec(3600);
        let subject = Uuid::new_v4();
        let token = codec.issue(subject, Role::Student).unwrap();

        let ctx = authorize(
            &codec,
            &bearer_headers(&token),
            &[Role::Student, Role::Admin],
        )
        .unwrap();
        assert_eq!(ctx.user_id, subject);
        assert_eq!(ctx.role, Role::Student);
    }

    #[test]
    fn test_superadmin_passes_admin_gate() {
        let codec = codec(3600);
        let token = codec.issue(Uuid::new_v4(), Role::Superadmin).unwrap();

        assert!(authorize(&codec, &bearer_headers(&token), ADMIN_ROLES).is_ok());
    }

    #[test]
    fn test_deny_reason_error_mapping() {
        assert_eq!(AppError::from(DenyReason::MissingCredential).code(), 401);
        assert_eq!(AppError::from(DenyReason::InvalidCredential).code(), 401);
        assert_eq!(AppError::from(DenyReason::InsufficientPrivilege).code(), 403);
    }
}
