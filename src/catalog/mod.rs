pub mod coerce;
pub mod product;

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::store::{new_id, ProductStore, StoreError};

pub use product::{NewProduct, Product, ProductPatch};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("product {0} not found")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// List/get/create/update/delete over a [`ProductStore`].
///
/// Authorization is enforced by the HTTP layer before mutating calls reach here.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn ProductStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Full collection in persisted order, newest first.
    pub async fn list(&self) -> Vec<Product> {
        self.store.load().await
    }

    pub async fn get(&self, id: &str) -> Result<Product, CatalogError> {
        self.store
            .load()
            .await
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, CatalogError> {
        let mut products = self.store.load().await;

        let product = Product {
            id: new_id(&products),
            name: input.name,
            price: input.price,
            description: input.description,
            in_stock: input.in_stock,
            images: input.images,
            video: input.video,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        products.insert(0, product.clone());
        self.persist(&products).await?;

        info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub async fn update(&self, id: &str, patch: &ProductPatch) -> Result<Product, CatalogError> {
        let mut products = self.store.load().await;

        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        patch.apply_to(product);
        let updated = product.clone();

        self.persist(&products).await?;

        info!("Updated product {} inStock={}", updated.id, updated.in_stock);
        Ok(updated)
    }

    /// Remove a product. Its media files stay on disk.
    pub async fn delete(&self, id: &str) -> Result<Product, CatalogError> {
        let mut products = self.store.load().await;

        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let removed = products.remove(index);

        self.persist(&products).await?;

        info!("Deleted product {}", removed.id);
        Ok(removed)
    }

    async fn persist(&self, products: &[Product]) -> Result<(), CatalogError> {
        self.store.save(products).await.map_err(|e| {
            error!("Failed to write products: {}", e);
            CatalogError::Storage(e)
        })
    }
}
