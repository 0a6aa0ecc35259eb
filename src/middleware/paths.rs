use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Refuse the old public admin locations so a stale `admin.html` under the
/// public directory is never served. The admin page lives on the portal path.
pub async fn block_legacy_admin_paths(request: Request, next: Next) -> Response {
    if is_legacy_admin_path(request.uri().path()) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    next.run(request).await
}

fn is_legacy_admin_path(path: &str) -> bool {
    matches!(path.to_ascii_lowercase().as_str(), "/admin" | "/admin/" | "/admin.html")
}
