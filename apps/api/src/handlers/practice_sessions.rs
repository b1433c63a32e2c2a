use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use panelist_core::UserIdentity;
use panelist_domain::PracticeSessionId;

use crate::dto::PracticeSessionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_practice_sessions_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PracticeSessionResponse>>> {
    let principal = state
        .access_service
        .resolve_principal(Some(&identity))
        .await?;

    let sessions = state
        .practice_session_service
        .list_visible_sessions(&principal)
        .await?
        .into_iter()
        .map(PracticeSessionResponse::from)
        .collect();

    Ok(Json(sessions))
}

pub async fn get_practice_session_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PracticeSessionResponse>> {
    let session_id = PracticeSessionId::from_str(&session_id)?;

    let session = state
        .practice_session_service
        .get_session(Some(&identity), session_id)
        .await?;

    Ok(Json(PracticeSessionResponse::from(session)))
}
