//! PostgreSQL-backed principal repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use panelist_application::{UserCredentials, UserRepository};
use panelist_core::{AppError, AppResult};
use panelist_domain::{EmailAddress, Principal, Role, UserId};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: uuid::Uuid,
    email: String,
    password_hash: Option<String>,
    is_superuser: bool,
    role: Option<String>,
}

impl PrincipalRow {
    fn into_credentials(self) -> AppResult<UserCredentials> {
        let role = self.role.as_deref().map(Role::from_str).transpose()?;

        Ok(UserCredentials {
            principal: Principal::new(
                UserId::from_uuid(self.id),
                self.email,
                role,
                self.is_superuser,
            ),
            password_hash: self.password_hash,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT users.id, users.email, users.password_hash, users.is_superuser,
                   user_profiles.role
            FROM users
            LEFT JOIN user_profiles ON user_profiles.user_id = users.id
            WHERE users.id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(|row| row.into_credentials().map(|credentials| credentials.principal))
            .transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT users.id, users.email, users.password_hash, users.is_superuser,
                   user_profiles.role
            FROM users
            LEFT JOIN user_profiles ON user_profiles.user_id = users.id
            WHERE lower(users.email) = lower($1)
            LIMIT 1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?;

        row.map(PrincipalRow::into_credentials).transpose()
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET role = EXCLUDED.role,
                updated_at = now()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| missing_user_or_internal(error, user_id))?;

        Ok(())
    }
}

fn missing_user_or_internal(error: sqlx::Error, user_id: UserId) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("user '{user_id}' does not exist"));
    }

    AppError::Internal(format!("failed to update role for user '{user_id}': {error}"))
}
