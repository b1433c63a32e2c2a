use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use panelist_application::{AuditLogQuery, AuditLogRepository};
use panelist_core::{AppError, AppResult};
use panelist_domain::{AuditLogEntry, AuditRecord};

/// In-memory append-only audit ledger.
///
/// Refuses updates and deletes of stored entries the same way the
/// PostgreSQL triggers do.
#[derive(Debug, Default)]
pub struct InMemoryAuditLogRepository {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditLogRepository {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored entry in insertion order.
    pub async fn snapshot(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }

    async fn ensure_exists(&self, entry_id: Uuid) -> AppResult<()> {
        if self
            .entries
            .read()
            .await
            .iter()
            .any(|entry| entry.id() == entry_id)
        {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "audit entry '{entry_id}' does not exist"
        )))
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn append_entry(&self, record: AuditRecord) -> AppResult<AuditLogEntry> {
        let entry = AuditLogEntry::from_storage(Uuid::new_v4(), Utc::now(), record);
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let query = query.normalized();
        let entries = self.entries.read().await;

        Ok(entries
            .iter()
            .rev()
            .filter(|entry| query.action.is_none_or(|action| entry.action() == action))
            .filter(|entry| {
                query
                    .actor_id
                    .is_none_or(|actor_id| entry.actor_id() == Some(actor_id))
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn update_entry(&self, entry: &AuditLogEntry) -> AppResult<()> {
        self.ensure_exists(entry.id()).await?;
        Err(AppError::ImmutabilityViolation(format!(
            "audit entry '{}' cannot be modified",
            entry.id()
        )))
    }

    async fn delete_entry(&self, entry_id: Uuid) -> AppResult<()> {
        self.ensure_exists(entry_id).await?;
        Err(AppError::ImmutabilityViolation(format!(
            "audit entry '{entry_id}' cannot be deleted"
        )))
    }
}
