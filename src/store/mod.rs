//! Whole-collection persistence for the product catalog.
//!
//! A store only knows how to load the full list and overwrite it with a new
//! one. Every mutation is load, modify in memory, save. There is no locking:
//! two writers that load the same state will race and the last `save` wins.

pub mod json_file;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::Product;

pub use json_file::JsonFileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Read the full collection. Missing or unreadable storage yields an empty list.
    async fn load(&self) -> Vec<Product>;

    /// Replace the stored collection with `products`.
    async fn save(&self, products: &[Product]) -> Result<(), StoreError>;
}

/// Fresh URL-safe identifier not already used in `existing`.
pub fn new_id(existing: &[Product]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !existing.iter().any(|p| p.id == id) {
            return id;
        }
    }
}
