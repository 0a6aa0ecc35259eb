#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use storefront::config::AppConfig;
use storefront::{app, AppState};

pub const ADMIN_CODE: &str = "test-admin-code";
pub const BOUNDARY: &str = "storefront-test-boundary";

/// An isolated application rooted in a temporary directory.
pub struct TestApp {
    pub router: Router,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Like [`TestApp::spawn`], with a chance to adjust the config first.
    pub async fn spawn_with(adjust: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;

        let mut config = AppConfig::development();
        config.server.data_dir = dir.path().join("data");
        config.server.public_dir = dir.path().join("public");
        config.server.views_dir = dir.path().join("views");
        config.security.admin_code = ADMIN_CODE.to_string();
        adjust(&mut config);

        let state = AppState::init(config.clone()).await?;

        tokio::fs::write(config.server.public_dir.join("index.html"), "<h1>storefront</h1>").await?;
        tokio::fs::write(config.server.public_dir.join("product.html"), "<h1>product</h1>").await?;
        tokio::fs::write(config.server.public_dir.join("admin.html"), "<h1>stale admin</h1>").await?;
        tokio::fs::write(config.admin_page(), "<h1>admin panel</h1>").await?;

        Ok(Self {
            router: app(state),
            config,
            _dir: dir,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub fn products_file(&self) -> PathBuf {
        self.config.products_file()
    }

    pub fn public_path(&self, url_path: &str) -> PathBuf {
        self.config.server.public_dir.join(url_path.trim_start_matches('/'))
    }

    pub async fn list(&self) -> Result<Vec<Value>> {
        let res = self.send(get("/api/products")).await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await?;
        Ok(body.as_array().cloned().unwrap_or_default())
    }

    /// Create a product as admin and return the JSON record.
    pub async fn create(&self, form: &MultipartForm) -> Result<Value> {
        let res = self.send(form.request("/api/products", Some(&admin_cookie()))).await?;
        assert_eq!(res.status(), StatusCode::CREATED, "create failed");
        json_body(res).await
    }
}

pub fn admin_cookie() -> String {
    format!("admin_code={}", ADMIN_CODE)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn patch_json(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn login_form(code: &str, next: &str) -> Request<Body> {
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("code", code)
        .append_pair("next", next)
        .finish();
    Request::builder()
        .method("POST")
        .uri("/admin-login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(res: Response<Body>) -> Result<Vec<u8>> {
    Ok(to_bytes(res.into_body(), usize::MAX).await?.to_vec())
}

pub async fn json_body(res: Response<Body>) -> Result<Value> {
    let bytes = body_bytes(res).await?;
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

pub fn set_cookie_headers(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct MultipartForm {
    parts: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.parts.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.parts.extend_from_slice(data);
        self.parts.extend_from_slice(b"\r\n");
        self
    }

    pub fn body(&self) -> Vec<u8> {
        let mut body = self.parts.clone();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub fn request(&self, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(self.body())).unwrap()
    }
}
