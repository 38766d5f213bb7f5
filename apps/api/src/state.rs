use std::sync::Arc;

use agora_application::CategoryService;
use ipnet::IpNet;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub category_service: CategoryService,
    pub trusted_proxies: Arc<Vec<IpNet>>,
    pub storage_backend: &'static str,
    pub postgres_pool: Option<PgPool>,
}
