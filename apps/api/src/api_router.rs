use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use panelist_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;
mod gated;

use cors::build_cors_layer;
use gated::{build_admin_routes, build_authenticated_routes, build_privileged_routes};

pub fn build_router<Store>(
    app_state: AppState,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(build_authenticated_routes())
        .merge(build_admin_routes(app_state.clone()))
        .merge(build_privileged_routes(app_state.clone()))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(session_layer)
        .layer(build_cors_layer(&app_state.frontend_url)?)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::capture_request_context,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
