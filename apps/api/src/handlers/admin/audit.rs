use std::str::FromStr;

use panelist_application::AuditLogQuery;
use panelist_domain::{AuditAction, UserId};

use super::*;

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    Query(query): Query<AuditLogQueryParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let defaults = AuditLogQuery::default();
    let query = AuditLogQuery {
        limit: query.limit.unwrap_or(defaults.limit),
        offset: query.offset.unwrap_or(defaults.offset),
        action: query
            .action
            .as_deref()
            .map(AuditAction::from_str)
            .transpose()?,
        actor_id: query
            .actor_id
            .as_deref()
            .map(UserId::from_str)
            .transpose()?,
    };

    let entries = state
        .audit_service
        .list_entries(&actor, query)
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
