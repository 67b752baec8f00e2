//! Authentication service: registration, login, subject listing

use crate::{
    auth::{password::CredentialHasher, token::TokenCodec},
    error::AppError,
    models::{
        auth::{LoginRequest, LoginResponse},
        query::{total_pages, ListUsersParams, UserListQuery},
        user::{RegisterRequest, Role, UserListResponse, UserResponse},
    },
    repository::UserStore,
};
use std::sync::Arc;
use validator::Validate;

pub struct AuthService {
    store: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
    hasher: CredentialHasher,
    max_page_size: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, codec: Arc<TokenCodec>, max_page_size: u32) -> Self {
        Self {
            store,
            codec,
            hasher: CredentialHasher::new(),
            max_page_size,
        }
    }

    /// Register a new subject. Input is validated before any hashing or
    /// store access; a taken handle surfaces as `Conflict`.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let role = Role::parse(&req.role).ok_or_else(|| {
            AppError::validation("role must be one of: student, faculty, admin, superadmin")
        })?;

        let digest = self.hasher.hash(&req.password)?;

        let user = self.store.insert(&req.username, &digest, role).await?;

        tracing::info!(user_id = %user.id, role = %role, "User registered");

        Ok(user.into())
    }

    /// Authenticate a subject and issue a token.
    ///
    /// An unknown handle and a wrong password funnel through the same
    /// rejection branch so the two cases are indistinguishable to the
    /// caller.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.store.find_by_username(&req.username).await?;

        let verified = match &user {
            Some(user) => self.hasher.verify(&req.password, &user.password_hash),
            None => false,
        };

        let user = match (user, verified) {
            (Some(user), true) => user,
            _ => return Err(AppError::Unauthorized),
        };

        let token = self.codec.issue(user.id, user.role())?;

        tracing::info!(user_id = %user.id, "Login succeeded");

        Ok(LoginResponse {
            token,
            expires_in: self.codec.ttl_secs(),
        })
    }

    /// Fetch a single subject by its store-assigned key
    pub async fn get_user(&self, id: uuid::Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;

        Ok(user.into())
    }

    /// Paged, filtered, sorted, searchable subject listing
    pub async fn list_users(&self, params: ListUsersParams) -> Result<UserListResponse, AppError> {
        let query = UserListQuery::from_params(params, self.max_page_size);

        let (users, total_items) = self.store.list(&query).await?;

        Ok(UserListResponse {
            users: users.into_iter().map(Into::into).collect(),
            current_page: query.page,
            total_pages: total_pages(total_items, query.page_size),
            total_items,
        })
    }
}
