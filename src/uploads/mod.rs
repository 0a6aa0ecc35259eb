//! Multipart intake for the create form.
//!
//! File parts are streamed straight to their final location under the public
//! uploads directory. The catalog only ever sees the storage-relative paths.

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::{AppConfig, UploadConfig};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Too many files for field '{field}' (max {max})")]
    TooManyFiles { field: String, max: usize },

    #[error("File too large (max {max} bytes)")]
    FileTooLarge { max: u64 },

    #[error("Field '{field}' too large (max {max} bytes)")]
    FieldTooLarge { field: String, max: usize },

    #[error("Request body too large: {0}")]
    RequestTooLarge(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        // The route body limit surfaces mid-stream as a multipart read failure.
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::RequestTooLarge(err.body_text())
        } else {
            UploadError::Multipart(err.body_text())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "images" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    fn url_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "/uploads/images",
            MediaKind::Video => "/uploads/videos",
        }
    }
}

/// Text fields and stored media paths from a create request.
#[derive(Debug, Default)]
pub struct CreateForm {
    pub fields: HashMap<String, String>,
    pub images: Vec<String>,
    pub video: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadIntake {
    images_dir: PathBuf,
    videos_dir: PathBuf,
    limits: UploadConfig,
}

impl UploadIntake {
    pub fn new(images_dir: impl Into<PathBuf>, videos_dir: impl Into<PathBuf>, limits: UploadConfig) -> Self {
        Self {
            images_dir: images_dir.into(),
            videos_dir: videos_dir.into(),
            limits,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.images_dir(), config.videos_dir(), config.uploads.clone())
    }

    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.images_dir).await?;
        tokio::fs::create_dir_all(&self.videos_dir).await
    }

    /// Drain a multipart body: text parts become form fields, `images` and
    /// `video` file parts are written to disk.
    ///
    /// Files already written stay on disk if a later part is rejected.
    pub async fn read_create_form(&self, multipart: &mut Multipart) -> Result<CreateForm, UploadError> {
        let mut form = CreateForm::default();

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            let file_name = match field.file_name() {
                Some(file_name) => file_name.to_string(),
                None => {
                    let value = self.read_text(&name, field).await?;
                    form.fields.insert(name, value);
                    continue;
                }
            };

            // Browsers send an empty, unnamed part for a file input left blank.
            if file_name.is_empty() {
                while field.chunk().await?.is_some() {}
                continue;
            }

            let kind = MediaKind::from_field(&name).ok_or_else(|| UploadError::UnexpectedField(name.clone()))?;

            match kind {
                MediaKind::Image if form.images.len() >= self.limits.max_images => {
                    return Err(UploadError::TooManyFiles { field: name, max: self.limits.max_images });
                }
                MediaKind::Video if form.video.is_some() => {
                    return Err(UploadError::TooManyFiles { field: name, max: self.limits.max_videos });
                }
                _ => {}
            }

            let path = self.store_file(kind, &file_name, field).await?;
            match kind {
                MediaKind::Image => form.images.push(path),
                MediaKind::Video => form.video = Some(path),
            }
        }

        Ok(form)
    }

    async fn read_text(&self, name: &str, mut field: Field<'_>) -> Result<String, UploadError> {
        let max = self.limits.max_field_size_bytes;
        let mut raw = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if raw.len() + chunk.len() > max {
                return Err(UploadError::FieldTooLarge { field: name.to_string(), max });
            }
            raw.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Write one file part and return its storage-relative path.
    pub async fn store_file(&self, kind: MediaKind, original_name: &str, mut field: Field<'_>) -> Result<String, UploadError> {
        let dir = match kind {
            MediaKind::Image => &self.images_dir,
            MediaKind::Video => &self.videos_dir,
        };

        let (disk_path, mut file) = create_unique(dir, original_name).await?;

        let mut written = 0u64;
        let result: Result<(), UploadError> = async {
            while let Some(chunk) = field.chunk().await? {
                written += chunk.len() as u64;
                if written > self.limits.max_file_size_bytes {
                    return Err(UploadError::FileTooLarge { max: self.limits.max_file_size_bytes });
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(&disk_path).await {
                warn!("failed to remove partial upload {}: {}", disk_path.display(), remove_err);
            }
            return Err(e);
        }

        let stored_name = disk_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        debug!("stored upload {} ({} bytes)", disk_path.display(), written);
        Ok(format!("{}/{}", kind.url_prefix(), stored_name))
    }
}

/// Create a new file in `dir` for `original_name`, bumping the timestamp on a clash.
async fn create_unique(dir: &Path, original_name: &str) -> Result<(PathBuf, File), UploadError> {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    loop {
        let path = dir.join(stored_file_name(original_name, stamp));
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => stamp += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Disk name for an uploaded file: lower-cased slug of the client's base name,
/// a `-<stamp>` suffix, then the extension stripped to ASCII alphanumerics.
///
/// `"../My Photo (1).JPG"` at stamp 42 becomes `"my-photo-1--42.JPG"`.
pub fn stored_file_name(original_name: &str, stamp: i64) -> String {
    let base_name = original_name.rsplit(['/', '\\']).next().unwrap_or_default();

    let (stem, ext) = match base_name.rfind('.') {
        Some(i) if i > 0 => (&base_name[..i], &base_name[i + 1..]),
        _ => (base_name, ""),
    };

    let mut slug = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            slug.push(c);
            in_run = false;
        } else if !in_run {
            slug.push('-');
            in_run = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("file");
    }

    let ext: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    if ext.is_empty() {
        format!("{slug}-{stamp}")
    } else {
        format!("{slug}-{stamp}.{ext}")
    }
}
