use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Admin code used when `ADMIN_CODE` is not set. Local development only.
pub const DEFAULT_ADMIN_CODE: &str = "@dX1-9aD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub public_dir: PathBuf,
    pub views_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub admin_code: String,
    pub admin_portal_slug: String,
    pub session_cookie: String,
    pub session_max_age_days: i64,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
    pub max_field_size_bytes: usize,
    pub max_images: usize,
    pub max_videos: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("DATA_DIR") {
            self.server.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PUBLIC_DIR") {
            self.server.public_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("VIEWS_DIR") {
            self.server.views_dir = PathBuf::from(v);
        }

        // Security overrides
        if let Ok(v) = env::var("ADMIN_CODE") {
            if !v.is_empty() {
                self.security.admin_code = v;
            }
        }
        if let Ok(v) = env::var("ADMIN_PORTAL_SLUG") {
            if is_url_safe_slug(&v) {
                self.security.admin_portal_slug = v;
            }
        }
        if let Ok(v) = env::var("SESSION_MAX_AGE_DAYS") {
            self.security.session_max_age_days = v.parse().unwrap_or(self.security.session_max_age_days);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_SIZE_BYTES") {
            self.uploads.max_file_size_bytes = v.parse().unwrap_or(self.uploads.max_file_size_bytes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            security: SecurityConfig {
                admin_code: DEFAULT_ADMIN_CODE.to_string(),
                admin_portal_slug: "a94h2f1d".to_string(),
                session_cookie: "admin_code".to_string(),
                session_max_age_days: 7,
                enable_cors: true,
            },
            uploads: UploadConfig::default(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.security.enable_cors = false;
        config
    }

    fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.security.session_max_age_days = 3;
        config
    }

    /// Path the admin page is mounted on, e.g. `/access-portal-a94h2f1d`.
    pub fn admin_portal_path(&self) -> String {
        format!("/access-portal-{}", self.security.admin_portal_slug)
    }

    pub fn products_file(&self) -> PathBuf {
        self.server.data_dir.join("products.json")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.server.public_dir.join("uploads")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.uploads_dir().join("images")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.uploads_dir().join("videos")
    }

    pub fn admin_page(&self) -> PathBuf {
        self.server.views_dir.join("admin.html")
    }

    /// Largest request body the create route accepts: every image and video
    /// at its maximum size plus one text-field allowance for the text fields
    /// and multipart framing.
    pub fn max_upload_request_bytes(&self) -> usize {
        let file_slots = (self.uploads.max_images + self.uploads.max_videos) as u64;
        let files = self.uploads.max_file_size_bytes.saturating_mul(file_slots);
        usize::try_from(files)
            .unwrap_or(usize::MAX)
            .saturating_add(self.uploads.max_field_size_bytes)
    }

    pub fn uses_default_admin_code(&self) -> bool {
        self.security.admin_code == DEFAULT_ADMIN_CODE
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            public_dir: PathBuf::from("public"),
            views_dir: PathBuf::from("views"),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * 1024 * 1024, // 50MB
            max_field_size_bytes: 1024 * 1024, // 1MB
            max_images: 8,
            max_videos: 1,
        }
    }
}

fn is_url_safe_slug(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
