use std::sync::Arc;

use crate::auth::AdminGate;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::store::{JsonFileStore, StoreError};
use crate::uploads::UploadIntake;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Catalog,
    pub gate: AdminGate,
    pub uploads: UploadIntake,
}

impl AppState {
    /// Build the state and create the directories and products file it needs.
    pub async fn init(config: AppConfig) -> Result<Self, StoreError> {
        let store = JsonFileStore::new(config.products_file());
        store.init().await?;

        let uploads = UploadIntake::from_config(&config);
        uploads.ensure_dirs().await?;
        tokio::fs::create_dir_all(&config.server.views_dir).await?;

        Ok(Self {
            catalog: Catalog::new(Arc::new(store)),
            gate: AdminGate::from_config(&config),
            uploads,
            config: Arc::new(config),
        })
    }
}
