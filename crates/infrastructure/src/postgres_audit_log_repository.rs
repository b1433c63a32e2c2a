//! PostgreSQL-backed append-only audit ledger.
//!
//! Immutability is enforced by the `audit_log_entries` triggers, which raise
//! SQLSTATE `AUD01` on any update, delete or truncate.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use panelist_application::{AuditLogQuery, AuditLogRepository};
use panelist_core::{AppError, AppResult};
use panelist_domain::{AuditAction, AuditLogEntry, AuditRecord, ExtraData, UserId};

/// SQLSTATE raised by the audit immutability triggers.
const IMMUTABILITY_SQLSTATE: &str = "AUD01";

/// PostgreSQL-backed repository for audit log entries.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditLogRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    actor_id: Option<Uuid>,
    action_type: String,
    resource_type: String,
    resource_id: String,
    ip_address: Option<String>,
    client_id: Option<String>,
    extra_data: serde_json::Value,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = AppError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry::from_storage(
            row.id,
            row.created_at,
            AuditRecord {
                actor_id: row.actor_id.map(UserId::from_uuid),
                action: AuditAction::from_str(row.action_type.as_str())?,
                resource_type: row.resource_type,
                resource_id: row.resource_id,
                ip_address: row.ip_address,
                client_id: row.client_id,
                extra_data: ExtraData::from_json_value(row.extra_data)?,
            },
        ))
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append_entry(&self, record: AuditRecord) -> AppResult<AuditLogEntry> {
        let row = sqlx::query_as::<_, AuditLogRow>(
            r#"
            INSERT INTO audit_log_entries (
                actor_id,
                action_type,
                resource_type,
                resource_id,
                ip_address,
                client_id,
                extra_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, created_at, actor_id, action_type, resource_type, resource_id,
                      ip_address, client_id, extra_data
            "#,
        )
        .bind(record.actor_id.map(|actor_id| actor_id.as_uuid()))
        .bind(record.action.as_str())
        .bind(record.resource_type.as_str())
        .bind(record.resource_id.as_str())
        .bind(record.ip_address.as_deref())
        .bind(record.client_id.as_deref())
        .bind(record.extra_data.to_json_value())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        AuditLogEntry::try_from(row)
    }

    async fn list_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let query = query.normalized();
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, created_at, actor_id, action_type, resource_type, resource_id,
                   ip_address, client_id, extra_data
            FROM audit_log_entries
            WHERE ($1::TEXT IS NULL OR action_type = $1)
                AND ($2::UUID IS NULL OR actor_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(query.action.map(|action| action.as_str()))
        .bind(query.actor_id.map(|actor_id| actor_id.as_uuid()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list audit log entries: {error}"))
        })?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn update_entry(&self, entry: &AuditLogEntry) -> AppResult<()> {
        let record = entry.record();
        let result = sqlx::query(
            r#"
            UPDATE audit_log_entries
            SET resource_type = $2,
                resource_id = $3,
                extra_data = $4
            WHERE id = $1
            "#,
        )
        .bind(entry.id())
        .bind(record.resource_type.as_str())
        .bind(record.resource_id.as_str())
        .bind(record.extra_data.to_json_value())
        .execute(&self.pool)
        .await
        .map_err(|error| immutability_or_internal(error, "update audit entry"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "audit entry '{}' does not exist",
                entry.id()
            )));
        }

        Ok(())
    }

    async fn delete_entry(&self, entry_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM audit_log_entries WHERE id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(|error| immutability_or_internal(error, "delete audit entry"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "audit entry '{entry_id}' does not exist"
            )));
        }

        Ok(())
    }
}

fn immutability_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some(IMMUTABILITY_SQLSTATE)
    {
        return AppError::ImmutabilityViolation(format!(
            "refused to {operation}: audit log entries are immutable"
        ));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[cfg(test)]
mod tests;
