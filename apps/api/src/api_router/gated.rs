use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};

use crate::middleware::RoleRequirement;
use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub(super) fn build_authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/practice-sessions",
            get(handlers::practice_sessions::list_practice_sessions_handler),
        )
        .route(
            "/api/practice-sessions/{session_id}",
            get(handlers::practice_sessions::get_practice_session_handler),
        )
        .route_layer(from_fn(middleware::require_auth))
}

pub(super) fn build_admin_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/users/{user_id}/role",
            put(handlers::admin::change_user_role_handler),
        )
        .route(
            "/api/admin/audit-log",
            get(handlers::admin::list_audit_log_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::require_roles))
        .layer(axum::Extension(RoleRequirement::admin_only()))
}

pub(super) fn build_privileged_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/practice-sessions",
            post(handlers::admin::create_practice_session_handler),
        )
        .route(
            "/api/admin/practice-sessions/{session_id}",
            put(handlers::admin::rename_practice_session_handler)
                .delete(handlers::admin::delete_practice_session_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::require_roles))
        .layer(axum::Extension(RoleRequirement::admin_or_privileged()))
}
