use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ProductStore, StoreError};
use crate::catalog::Product;

/// Product list kept as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Unique per save so concurrent writers never share a temp file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    /// Create the parent directory and an empty `[]` file if they do not exist yet.
    pub async fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !tokio::fs::try_exists(&self.path).await? {
            self.save(&[]).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn load(&self) -> Vec<Product> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("products file {} is missing, treating as empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("failed to read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        // Malformed content is discarded rather than surfaced; the next save overwrites it.
        match serde_json::from_slice(&raw) {
            Ok(products) => products,
            Err(e) => {
                warn!("products file {} is malformed, treating as empty: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Writes to a sibling temp file and renames it over the products file, so
    /// readers see either the old list or the new one.
    async fn save(&self, products: &[Product]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(products)?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(remove_err) = tokio::fs::remove_file(&tmp).await {
                warn!("failed to remove {}: {}", tmp.display(), remove_err);
            }
            return Err(e.into());
        }
        Ok(())
    }
}
