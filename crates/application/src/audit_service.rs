//! Audit log writer and read side.
//!
//! Writes are fire-and-forget from the caller's point of view: a failed
//! insert is logged and swallowed so the observed operation completes as if
//! auditing had succeeded.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use panelist_core::{AppError, AppResult};
use panelist_domain::{
    ADMIN_ROLES, AuditAction, AuditLogEntry, AuditRecord, AuditResource, Auditable, ExtraData,
    Principal, UserId,
};

use crate::{AuditLogQuery, AuditLogRepository, RequestContext, check_role};

/// Input for one audit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEventInput {
    /// Action being recorded.
    pub action: AuditAction,
    /// Acting principal, `None` for anonymous actors.
    pub actor: Option<UserId>,
    /// Affected resource, if any.
    pub resource: Option<AuditResource>,
    /// Structured details.
    pub extra_data: ExtraData,
}

impl AuditEventInput {
    /// Creates an input for `action` without actor, resource or details.
    #[must_use]
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            actor: None,
            resource: None,
            extra_data: ExtraData::new(),
        }
    }

    /// Sets the acting principal.
    #[must_use]
    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Sets the affected resource.
    #[must_use]
    pub fn with_resource(mut self, resource: &impl Auditable) -> Self {
        self.resource = Some(resource.audit_resource());
        self
    }

    /// Sets the structured details.
    #[must_use]
    pub fn with_extra_data(mut self, extra_data: ExtraData) -> Self {
        self.extra_data = extra_data;
        self
    }
}

/// Audit insert that could not be completed.
#[derive(Debug, Error)]
#[error("failed to record {action} audit event: {source}")]
pub struct AuditWriteFailure {
    /// Action that was being recorded.
    pub action: &'static str,
    /// Underlying storage error.
    #[source]
    pub source: AppError,
}

/// Application service for the audit ledger.
#[derive(Clone)]
pub struct AuditService {
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self { repository }
    }

    /// Records one audit event, enriched with the current request context.
    ///
    /// Never fails: storage errors are logged and dropped.
    pub async fn record_event(&self, input: AuditEventInput) {
        if let Err(failure) = self.try_record_event(input).await {
            error!(
                action = failure.action,
                error = %failure,
                "audit write failed, continuing without an entry"
            );
        }
    }

    async fn try_record_event(
        &self,
        input: AuditEventInput,
    ) -> Result<AuditLogEntry, AuditWriteFailure> {
        let action = input.action.as_str();
        let record = build_record(input, RequestContext::current());

        self.repository
            .append_entry(record)
            .await
            .map_err(|source| AuditWriteFailure { action, source })
    }

    /// Returns audit entries newest-first. Admin only.
    pub async fn list_entries(
        &self,
        actor: &Principal,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        check_role(actor, ADMIN_ROLES)?;
        self.repository.list_entries(query.normalized()).await
    }
}

fn build_record(input: AuditEventInput, context: Option<RequestContext>) -> AuditRecord {
    let AuditEventInput {
        action,
        actor,
        resource,
        mut extra_data,
    } = input;

    let dropped_keys = extra_data.remove_sensitive_keys();
    if !dropped_keys.is_empty() {
        warn!(
            action = action.as_str(),
            keys = ?dropped_keys,
            "dropped secret-like keys from audit extra data"
        );
    }

    let (resource_type, resource_id) = resource.map_or_else(
        || (String::new(), String::new()),
        |resource| {
            (
                resource.resource_type().to_owned(),
                resource.resource_id().to_owned(),
            )
        },
    );
    let context = context.unwrap_or_default();

    AuditRecord {
        actor_id: actor,
        action,
        resource_type,
        resource_id,
        ip_address: context.ip_address().map(ToOwned::to_owned),
        client_id: context.client_id().map(ToOwned::to_owned),
        extra_data,
    }
}

#[cfg(test)]
mod tests;
