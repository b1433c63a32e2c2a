use axum::Json;
use axum::extract::State;
use panelist_application::LoginOutcome;
use panelist_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{AuthLoginRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

const LOGIN_FAILED_MESSAGE: &str = "invalid email or password";

/// POST /auth/login - Authenticate with email and password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let principal = match state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?
    {
        LoginOutcome::Authenticated(principal) => principal,
        LoginOutcome::Failed => {
            return Err(AppError::Unauthorized(LOGIN_FAILED_MESSAGE.to_owned()).into());
        }
    };

    let identity = UserIdentity::new(principal.user_id().as_uuid(), principal.email());

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    Ok(Json(UserIdentityResponse::from(&principal)))
}
