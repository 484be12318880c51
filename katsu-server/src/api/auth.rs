//! Bearer token authentication and allowed-host checking
//!
//! Tokens are resolved against the grants in the server configuration. A
//! grant lists the programs a token may read; `is_admin` additionally allows
//! writes. The resolved [`AuthContext`] travels to handlers via request
//! extensions.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::AppState;

/// Methods any valid token may use; everything else needs an admin grant
const SAFE_METHODS: &[Method] = &[Method::GET, Method::HEAD, Method::OPTIONS];

/// Authorization resolved for one request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Programs the presented token may read
    pub authorized_programs: Vec<String>,
    pub is_admin: bool,
}

/// Authentication middleware for /v2/authorized and /v2/ingest routes.
///
/// Returns 401 for a missing or unknown token and 403 when a read-only token
/// attempts an unsafe method.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&request).ok_or(AuthError::MissingAuthorization)?;

    let grant = state
        .config
        .grant_for_token(token)
        .ok_or(AuthError::UnknownToken)?;

    if !SAFE_METHODS.contains(request.method()) && !grant.is_admin {
        return Err(AuthError::NotAdmin);
    }

    debug!(
        "Authenticated request {} {}: programs={:?} admin={}",
        request.method(),
        request.uri().path(),
        grant.datasets,
        grant.is_admin
    );

    request.extensions_mut().insert(AuthContext {
        authorized_programs: grant.datasets.clone(),
        is_admin: grant.is_admin,
    });

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Allowed-hosts middleware, applied to every route.
///
/// Compares the request's `Host` header (port stripped) against the
/// configured allow-list. Requests without a `Host` header pass through.
pub async fn host_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    if let Some(value) = request.headers().get(axum::http::header::HOST) {
        let host = value
            .to_str()
            .map_err(|_| AuthError::DisallowedHost("invalid host header".to_string()))?;
        let hostname = host.rsplit_once(':').map_or(host, |(name, _port)| name);

        if !state.allowed_host(hostname) {
            return Err(AuthError::DisallowedHost(hostname.to_string()));
        }
    }

    Ok(next.run(request).await)
}

impl AppState {
    fn allowed_host(&self, hostname: &str) -> bool {
        self.config.allowed_hosts.is_empty()
            || self.config.allowed_hosts.iter().any(|h| h == hostname)
    }
}

/// Authentication / host-check error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    UnknownToken,
    NotAdmin,
    DisallowedHost(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuthorization => {
                (StatusCode::UNAUTHORIZED, "Authorization required".to_string())
            }
            AuthError::UnknownToken => (
                StatusCode::UNAUTHORIZED,
                "User is not authorized to access any datasets".to_string(),
            ),
            AuthError::NotAdmin => (
                StatusCode::FORBIDDEN,
                "Write access requires an admin token".to_string(),
            ),
            AuthError::DisallowedHost(host) => {
                (StatusCode::BAD_REQUEST, format!("Host not allowed: {}", host))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
