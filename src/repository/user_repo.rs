//! Identity store access
//!
//! `UserStore` is the narrow contract the rest of the crate depends on;
//! `PgUserStore` is its PostgreSQL implementation. The store performs no
//! authorization of its own.

use crate::{
    error::AppError,
    models::{
        query::UserListQuery,
        user::{Role, User},
    },
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Narrow identity-store contract: lookup, insert, paged listing
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Look up a subject by its unique handle
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Look up a subject by its store-assigned key
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Persist a new subject. Fails with `Conflict` when the handle is
    /// already taken; this is the only uniqueness enforcement point.
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError>;

    /// Execute a validated listing query, returning one page plus the
    /// total matching count before pagination
    async fn list(&self, query: &UserListQuery) -> Result<(Vec<User>, i64), AppError>;
}

/// PostgreSQL-backed store
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Username already exists")
            }
            _ => AppError::from(e),
        })?;

        Ok(user)
    }

    async fn list(&self, query: &UserListQuery) -> Result<(Vec<User>, i64), AppError> {
        let (select_sql, count_sql) = list_sql(query);
        let pattern = query.search_pattern();

        let mut select = sqlx::query_as::<_, User>(&select_sql);
        let mut count = sqlx::query(&count_sql);

        if let Some(role) = query.role {
            select = select.bind(role.as_str());
            count = count.bind(role.as_str());
        }
        if let Some(username) = &query.username {
            select = select.bind(username);
            count = count.bind(username);
        }
        if let Some(pattern) = &pattern {
            select = select.bind(pattern);
            count = count.bind(pattern);
        }

        let users = select
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.db)
            .await?;

        let total: i64 = count.fetch_one(&self.db).await?.get(0);

        Ok((users, total))
    }
}

/// Build the page and count statements for a listing query. All dynamic
/// fragments come from allow-listed enums; request values only ever appear
/// as bind parameters.
fn list_sql(query: &UserListQuery) -> (String, String) {
    let mut conditions: Vec<String> = Vec::new();
    let mut idx = 0usize;

    if query.role.is_some() {
        idx += 1;
        conditions.push(format!("role = ${}", idx));
    }
    if query.username.is_some() {
        idx += 1;
        conditions.push(format!("username = ${}", idx));
    }
    if query.search.is_some() {
        idx += 1;
        conditions.push(format!("username ILIKE ${} ESCAPE '\\'", idx));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let select = format!(
        "SELECT * FROM users{} ORDER BY {} {} LIMIT ${} OFFSET ${}",
        where_clause,
        query.sort_field.column(),
        query.sort_direction.keyword(),
        idx + 1,
        idx + 2,
    );
    let count = format!("SELECT COUNT(*) FROM users{}", where_clause);

    (select, count)
}
