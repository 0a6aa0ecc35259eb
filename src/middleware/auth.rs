use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{login_location, CredentialSource};
use crate::error::ApiError;
use crate::state::AppState;

/// Marker inserted into request extensions once the admin gate has passed.
#[derive(Clone, Copy, Debug)]
pub struct AdminSession {
    pub source: CredentialSource,
}

/// Admin gate middleware for mutating API routes and the admin page.
///
/// API callers (`/api/...`) that fail get a 401 JSON body; page callers are
/// redirected to the login form with `next` pointing back at the request.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let query = request.uri().query().map(str::to_string);

    let Some(source) = state.gate.authorize(&jar, request.headers(), query.as_deref()) else {
        return deny(&request);
    };

    request.extensions_mut().insert(AdminSession { source });
    let response = next.run(request).await;

    if source.issues_session() {
        (jar.add(state.gate.session_cookie()), response).into_response()
    } else {
        response
    }
}

fn deny(request: &Request) -> Response {
    let path = request.uri().path();

    if is_api_path(path) {
        tracing::warn!("Rejected unauthenticated {} {}", request.method(), path);
        return ApiError::unauthorized("Authentication required").into_response();
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path);
    tracing::debug!("Redirecting {} to admin login", path);
    Redirect::to(&login_location(target)).into_response()
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
