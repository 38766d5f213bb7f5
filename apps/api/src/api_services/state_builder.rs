use std::sync::Arc;

use agora_core::AppError;

use crate::api_config::{ApiConfig, StorageBackend};
use crate::dev_seed::SeedDirectory;
use crate::state::AppState;

use super::database::connect_and_migrate;

mod memory;
mod postgres;

#[cfg(test)]
pub(crate) use memory::{MemoryStores, build_memory_state};

/// Application state plus the identity writer used by the dev seed.
pub struct BuiltState {
    pub app_state: AppState,
    pub seed_directory: Arc<dyn SeedDirectory>,
}

pub async fn build_app_state(config: &ApiConfig) -> Result<BuiltState, AppError> {
    let trusted_proxies = Arc::new(config.trusted_proxies.clone());

    match &config.storage_backend {
        StorageBackend::Memory => {
            let (app_state, stores) = memory::build_memory_state(trusted_proxies);
            Ok(BuiltState {
                app_state,
                seed_directory: stores.identity_directory,
            })
        }
        StorageBackend::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            Ok(postgres::build_postgres_state(pool, trusted_proxies))
        }
    }
}
