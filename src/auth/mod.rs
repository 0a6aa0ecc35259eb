//! Shared-secret admin gate.
//!
//! A caller is an admin when it presents the configured admin code. The session
//! cookie holds the code itself; there are no accounts, tokens or rotation.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::config::AppConfig;

/// Where a valid admin code was found on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    Header,
    BasicAuth,
    Query,
}

impl CredentialSource {
    /// Sources that should be upgraded to a session cookie on success.
    pub fn issues_session(self) -> bool {
        matches!(self, CredentialSource::BasicAuth | CredentialSource::Query)
    }
}

#[derive(Clone)]
pub struct AdminGate {
    code: String,
    digest: [u8; 32],
    cookie_name: String,
    max_age_days: i64,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("cookie_name", &self.cookie_name)
            .field("max_age_days", &self.max_age_days)
            .finish_non_exhaustive()
    }
}

impl AdminGate {
    pub fn new(code: impl Into<String>, cookie_name: impl Into<String>, max_age_days: i64) -> Self {
        let code = code.into();
        let digest = Sha256::digest(code.as_bytes()).into();
        Self {
            code,
            digest,
            cookie_name: cookie_name.into(),
            max_age_days,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.security.admin_code.clone(),
            config.security.session_cookie.clone(),
            config.security.session_max_age_days,
        )
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Compare `candidate` against the admin code in constant time.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Look for the admin code on a request, in the order cookie, header,
    /// Basic auth password, query parameter.
    pub fn authorize(&self, jar: &CookieJar, headers: &HeaderMap, query: Option<&str>) -> Option<CredentialSource> {
        if jar.get(&self.cookie_name).is_some_and(|c| self.verify(c.value())) {
            return Some(CredentialSource::Cookie);
        }

        if headers
            .get("x-admin-code")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| self.verify(v))
        {
            return Some(CredentialSource::Header);
        }

        if basic_auth_password(headers).is_some_and(|p| self.verify(&p)) {
            return Some(CredentialSource::BasicAuth);
        }

        if query_code(query).is_some_and(|c| self.verify(&c)) {
            return Some(CredentialSource::Query);
        }

        None
    }

    /// Session cookie carrying the admin code: http-only, same-site lax.
    pub fn session_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), self.code.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(self.max_age_days))
            .build()
    }

    /// Cookie that clears the session when passed to [`CookieJar::remove`].
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }
}

fn basic_auth_password(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let raw = String::from_utf8(decoded).ok()?;
    // "user:password", or a bare password
    Some(match raw.split_once(':') {
        Some((_, password)) => password.to_string(),
        None => raw,
    })
}

fn query_code(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| matches!(key.as_ref(), "code" | "auth" | "token"))
        .map(|(_, value)| value.into_owned())
}

/// Login form URL that returns the caller to `next` after a successful login.
pub fn login_location(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/admin-login?next={encoded}")
}

/// Accept `next` only when it is a same-origin absolute path that can be sent
/// back as a `Location` header.
pub fn safe_next<'a>(next: Option<&'a str>, fallback: &'a str) -> &'a str {
    match next {
        Some(n)
            if n.starts_with('/')
                && !n.starts_with("//")
                && !n.contains('\\')
                && !n.bytes().any(|b| b.is_ascii_control()) =>
        {
            n
        }
        _ => fallback,
    }
}
