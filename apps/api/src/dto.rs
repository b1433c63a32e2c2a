use panelist_domain::{AuditLogEntry, PracticeSession, Principal};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user with the resolved role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub email: String,
    pub role: Option<String>,
    pub is_superuser: bool,
}

impl From<&Principal> for UserIdentityResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.user_id().to_string(),
            email: principal.email().to_owned(),
            role: principal.role().map(|role| role.as_str().to_owned()),
            is_superuser: principal.is_superuser(),
        }
    }
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-user-role-request.ts"
)]
pub struct ChangeUserRoleRequest {
    pub role: String,
}

/// Incoming payload for practice session creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-practice-session-request.ts"
)]
pub struct CreatePracticeSessionRequest {
    pub owner_id: String,
    pub title: String,
}

/// Incoming payload for practice session rename.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rename-practice-session-request.ts"
)]
pub struct RenamePracticeSessionRequest {
    pub title: String,
}

/// API representation of a practice session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/practice-session-response.ts"
)]
pub struct PracticeSessionResponse {
    #[ts(type = "number")]
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
}

impl From<PracticeSession> for PracticeSessionResponse {
    fn from(session: PracticeSession) -> Self {
        Self {
            id: session.id().as_i64(),
            owner_id: session.owner().to_string(),
            title: session.title().as_str().to_owned(),
            created_at: session.created_at().to_rfc3339(),
        }
    }
}

/// Query parameters for audit log reads.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQueryParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub actor_id: Option<String>,
}

/// API representation of an audit ledger entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub id: String,
    pub created_at: String,
    pub actor_id: Option<String>,
    pub action_type: String,
    pub resource_type: String,
    pub resource_id: String,
    pub ip_address: Option<String>,
    pub client_id: Option<String>,
    #[ts(type = "Record<string, string | number | boolean | null>")]
    pub extra_data: serde_json::Value,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(entry: AuditLogEntry) -> Self {
        let record = entry.record();
        Self {
            id: entry.id().to_string(),
            created_at: entry.created_at().to_rfc3339(),
            actor_id: record.actor_id.map(|actor_id| actor_id.to_string()),
            action_type: record.action.as_str().to_owned(),
            resource_type: record.resource_type.clone(),
            resource_id: record.resource_id.clone(),
            ip_address: record.ip_address.clone(),
            client_id: record.client_id.clone(),
            extra_data: record.extra_data.to_json_value(),
        }
    }
}
