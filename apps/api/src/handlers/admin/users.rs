use std::str::FromStr;

use panelist_domain::{Role, UserId};

use super::*;

pub async fn change_user_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(payload): Json<ChangeUserRoleRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let target = UserId::from_str(&user_id)?;
    let role = Role::from_str(&payload.role)?;

    let updated = state
        .user_admin_service
        .change_role(&actor, target, role)
        .await?;

    Ok(Json(UserIdentityResponse::from(&updated)))
}
