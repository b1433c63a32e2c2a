use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use panelist_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::debug;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// POST /auth/logout - End the session. Anonymous calls succeed silently.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(identity) = identity {
        match state
            .access_service
            .resolve_principal(Some(&identity))
            .await
        {
            Ok(principal) => state.auth_service.logout(principal).await,
            Err(error) => debug!(%error, "logout for unresolvable session identity"),
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Return the session user with its resolved role.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let principal = state
        .access_service
        .resolve_principal(Some(&identity))
        .await?;

    Ok(Json(UserIdentityResponse::from(&principal)))
}
