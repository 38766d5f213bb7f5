use std::sync::Arc;

use agora_application::CategoryService;
use agora_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditRepository, PostgresCategoryRepository,
    PostgresIdentityDirectory, PostgresPrivilegeRegistry,
};
use ipnet::IpNet;
use sqlx::PgPool;

use crate::state::AppState;

use super::BuiltState;

pub(super) fn build_postgres_state(pool: PgPool, trusted_proxies: Arc<Vec<IpNet>>) -> BuiltState {
    let identity_directory = Arc::new(PostgresIdentityDirectory::new(pool.clone()));

    let category_service = CategoryService::new(
        identity_directory.clone(),
        Arc::new(PostgresPrivilegeRegistry::new(pool.clone())),
        Arc::new(PostgresCategoryRepository::new(pool.clone())),
        Arc::new(PostgresAuditRepository::new(pool.clone())),
        Arc::new(PostgresAuditLogRepository::new(pool.clone())),
    );

    BuiltState {
        app_state: AppState {
            category_service,
            trusted_proxies,
            storage_backend: "postgres",
            postgres_pool: Some(pool),
        },
        seed_directory: identity_directory,
    }
}
