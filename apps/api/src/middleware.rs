use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Extension, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use ipnet::IpNet;
use panelist_application::RequestContext;
use panelist_core::{AppError, UserIdentity};
use panelist_domain::{ADMIN_ROLES, PRIVILEGED_ROLES, Role};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const FETCH_SITE_HEADER: &str = "sec-fetch-site";

/// Role set admitted by a route group. Superusers always pass.
#[derive(Debug, Clone, Copy)]
pub struct RoleRequirement {
    allowed_roles: &'static [Role],
}

impl RoleRequirement {
    pub const fn admin_only() -> Self {
        Self {
            allowed_roles: ADMIN_ROLES,
        }
    }

    pub const fn admin_or_privileged() -> Self {
        Self {
            allowed_roles: PRIVILEGED_ROLES,
        }
    }
}

/// Installs the request context for everything downstream of this layer.
pub async fn capture_request_context(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let ip_address = resolve_client_ip(request.headers(), peer, &state.trusted_proxies);
    let client_id = client_identifier(request.headers());

    RequestContext::new(ip_address.map(|ip| ip.to_string()), client_id)
        .scope(next.run(request))
        .await
}

/// User agent of the caller. Non-UTF-8 bytes are replaced, not dropped.
pub fn client_identifier(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Picks the origin address of a request.
///
/// Only the first entry of a forwarded-for chain is considered, and only
/// when the transport peer is a trusted proxy. An unparseable first entry
/// falls back to the peer.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted_proxies.iter().any(|network| network.contains(&peer)) {
        return Some(peer);
    }

    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|entry| entry.trim().parse::<IpAddr>().ok())
        .or(Some(peer))
}

/// Rejects state-changing requests that do not come from the frontend origin.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if headers.get(FETCH_SITE_HEADER) == Some(&HeaderValue::from_static("cross-site")) {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url.as_str();
        if origin != allowed_origin && !referer.starts_with(allowed_origin) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session_identity(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_roles(
    State(state): State<AppState>,
    Extension(requirement): Extension<RoleRequirement>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session_identity(&session).await?;
    let forwarded_identity = identity.clone();

    let response = state
        .access_service
        .role_required(
            identity.as_ref(),
            requirement.allowed_roles,
            move |principal| async move {
                request.extensions_mut().insert(principal);
                if let Some(identity) = forwarded_identity {
                    request.extensions_mut().insert(identity);
                }
                Ok(next.run(request).await)
            },
        )
        .await?;

    Ok(response)
}

async fn session_identity(session: &Session) -> Result<Option<UserIdentity>, AppError> {
    session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))
}
