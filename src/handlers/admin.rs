use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::auth::safe_next;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub code: String,
    pub next: Option<String>,
}

/// GET /admin-login - Render the login form
pub async fn login_form(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Html<String> {
    let portal = state.config.admin_portal_path();
    let next = safe_next(query.next.as_deref(), &portal);
    Html(render_login(next, None))
}

/// POST /admin-login - Check the code, set the session cookie, redirect to `next`
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let portal = state.config.admin_portal_path();
    let next = safe_next(form.next.as_deref(), &portal);

    if !state.gate.verify(&form.code) {
        tracing::warn!("Rejected admin login attempt");
        return (StatusCode::UNAUTHORIZED, Html(render_login(next, Some("Invalid code")))).into_response();
    }

    tracing::info!("Admin login succeeded");
    (jar.add(state.gate.session_cookie()), Redirect::to(next)).into_response()
}

/// GET /admin-logout - Clear the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (jar.remove(state.gate.removal_cookie()), Redirect::to("/admin-login"))
}

/// GET /access-portal-<slug> - Admin page, behind the admin gate
pub async fn portal(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let page = state.config.admin_page();
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::not_found("Admin page not installed")),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", page.display(), e);
            Err(ApiError::internal_server_error("Failed to load admin page"))
        }
    }
}

fn render_login(next: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Admin login</title>
</head>
<body>
  <main>
    <h1>Admin login</h1>
    {error}
    <form method="post" action="/admin-login">
      <input type="hidden" name="next" value="{next}">
      <label>Access code <input type="password" name="code" autocomplete="current-password" autofocus required></label>
      <button type="submit">Sign in</button>
    </form>
  </main>
</body>
</html>
"#,
        error = error,
        next = escape_html(next),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
