//! PostgreSQL-backed practice session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use panelist_application::PracticeSessionRepository;
use panelist_core::{AppError, AppResult, NonEmptyString};
use panelist_domain::{PracticeSession, PracticeSessionId, UserId};

/// PostgreSQL implementation of the practice session repository port.
#[derive(Clone)]
pub struct PostgresPracticeSessionRepository {
    pool: PgPool,
}

impl PostgresPracticeSessionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PracticeSessionRow {
    id: i64,
    owner_id: uuid::Uuid,
    title: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PracticeSessionRow> for PracticeSession {
    type Error = AppError;

    fn try_from(row: PracticeSessionRow) -> Result<Self, Self::Error> {
        Ok(PracticeSession::new(
            PracticeSessionId::new(row.id),
            UserId::from_uuid(row.owner_id),
            NonEmptyString::new(row.title)?,
            row.created_at,
        ))
    }
}

#[async_trait]
impl PracticeSessionRepository for PostgresPracticeSessionRepository {
    async fn create_session(
        &self,
        owner_id: UserId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession> {
        let row = sqlx::query_as::<_, PracticeSessionRow>(
            r#"
            INSERT INTO practice_sessions (owner_id, title)
            VALUES ($1, $2)
            RETURNING id, owner_id, title, created_at
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(title.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| missing_owner_or_internal(error, owner_id))?;

        PracticeSession::try_from(row)
    }

    async fn find_session(&self, id: PracticeSessionId) -> AppResult<Option<PracticeSession>> {
        let row = sqlx::query_as::<_, PracticeSessionRow>(
            r#"
            SELECT id, owner_id, title, created_at
            FROM practice_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find practice session '{id}': {error}"))
        })?;

        row.map(PracticeSession::try_from).transpose()
    }

    async fn list_sessions(&self, owner_id: Option<UserId>) -> AppResult<Vec<PracticeSession>> {
        let rows = sqlx::query_as::<_, PracticeSessionRow>(
            r#"
            SELECT id, owner_id, title, created_at
            FROM practice_sessions
            WHERE ($1::UUID IS NULL OR owner_id = $1)
            ORDER BY id
            "#,
        )
        .bind(owner_id.map(|owner_id| owner_id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list practice sessions: {error}"))
        })?;

        rows.into_iter().map(PracticeSession::try_from).collect()
    }

    async fn rename_session(
        &self,
        id: PracticeSessionId,
        title: NonEmptyString,
    ) -> AppResult<PracticeSession> {
        let row = sqlx::query_as::<_, PracticeSessionRow>(
            r#"
            UPDATE practice_sessions
            SET title = $2
            WHERE id = $1
            RETURNING id, owner_id, title, created_at
            "#,
        )
        .bind(id.as_i64())
        .bind(title.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to rename practice session '{id}': {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("practice session '{id}' does not exist")))?;

        PracticeSession::try_from(row)
    }

    async fn delete_session(&self, id: PracticeSessionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM practice_sessions WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete practice session '{id}': {error}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

fn missing_owner_or_internal(error: sqlx::Error, owner_id: UserId) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("user '{owner_id}' does not exist"));
    }

    AppError::Internal(format!("failed to create practice session: {error}"))
}
