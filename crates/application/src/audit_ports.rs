//! Ports for the append-only audit ledger.

use async_trait::async_trait;
use uuid::Uuid;

use panelist_core::AppResult;
use panelist_domain::{AuditAction, AuditLogEntry, AuditRecord, UserId};

/// Largest page size returned by audit queries.
pub const AUDIT_LOG_MAX_LIMIT: usize = 200;

/// Deepest offset accepted by audit queries.
pub const AUDIT_LOG_MAX_OFFSET: usize = 5_000;

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional action filter.
    pub action: Option<AuditAction>,
    /// Optional actor filter.
    pub actor_id: Option<UserId>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            action: None,
            actor_id: None,
        }
    }
}

impl AuditLogQuery {
    /// Clamps paging values into the supported range.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            limit: self.limit.clamp(1, AUDIT_LOG_MAX_LIMIT),
            offset: self.offset.min(AUDIT_LOG_MAX_OFFSET),
            ..self
        }
    }
}

/// Storage port for the audit ledger.
///
/// Implementations must reject any mutation of a persisted entry with
/// `AppError::ImmutabilityViolation`.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Appends one entry and returns it with its server-assigned fields.
    async fn append_entry(&self, record: AuditRecord) -> AppResult<AuditLogEntry>;

    /// Lists entries newest-first.
    async fn list_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;

    /// Attempts to overwrite a persisted entry.
    async fn update_entry(&self, entry: &AuditLogEntry) -> AppResult<()>;

    /// Attempts to delete a persisted entry.
    async fn delete_entry(&self, entry_id: Uuid) -> AppResult<()>;
}
