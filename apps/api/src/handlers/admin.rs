use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use panelist_domain::Principal;

use crate::dto::{
    AuditLogEntryResponse, AuditLogQueryParams, ChangeUserRoleRequest,
    CreatePracticeSessionRequest, PracticeSessionResponse, RenamePracticeSessionRequest,
    UserIdentityResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod audit;
mod practice_sessions;
mod users;

pub use audit::list_audit_log_handler;
pub use practice_sessions::{
    create_practice_session_handler, delete_practice_session_handler,
    rename_practice_session_handler,
};
pub use users::change_user_role_handler;
