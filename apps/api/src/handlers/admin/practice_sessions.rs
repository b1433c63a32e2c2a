use std::str::FromStr;

use panelist_domain::{PracticeSessionId, UserId};

use super::*;

pub async fn create_practice_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(payload): Json<CreatePracticeSessionRequest>,
) -> ApiResult<(StatusCode, Json<PracticeSessionResponse>)> {
    let owner_id = UserId::from_str(&payload.owner_id)?;

    let session = state
        .practice_session_service
        .create_session(&actor, owner_id, &payload.title)
        .await?;

    Ok((StatusCode::CREATED, Json(PracticeSessionResponse::from(session))))
}

pub async fn rename_practice_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(session_id): Path<String>,
    Json(payload): Json<RenamePracticeSessionRequest>,
) -> ApiResult<Json<PracticeSessionResponse>> {
    let session_id = PracticeSessionId::from_str(&session_id)?;

    let session = state
        .practice_session_service
        .rename_session(&actor, session_id, &payload.title)
        .await?;

    Ok(Json(PracticeSessionResponse::from(session)))
}

pub async fn delete_practice_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    let session_id = PracticeSessionId::from_str(&session_id)?;

    state
        .practice_session_service
        .delete_session(&actor, session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
