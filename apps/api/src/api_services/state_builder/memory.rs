use std::sync::Arc;

use agora_application::CategoryService;
use agora_infrastructure::{
    InMemoryAuditRepository, InMemoryCategoryRepository, InMemoryIdentityDirectory,
    InMemoryPrivilegeRegistry,
};
use ipnet::IpNet;

use crate::state::AppState;

pub(crate) struct MemoryStores {
    pub(crate) identity_directory: Arc<InMemoryIdentityDirectory>,
}

pub(crate) fn build_memory_state(trusted_proxies: Arc<Vec<IpNet>>) -> (AppState, MemoryStores) {
    let identity_directory = Arc::new(InMemoryIdentityDirectory::new());
    let privilege_registry = Arc::new(InMemoryPrivilegeRegistry::new(identity_directory.clone()));
    let category_repository = Arc::new(InMemoryCategoryRepository::new(
        privilege_registry.clone(),
    ));
    let audit_repository = Arc::new(InMemoryAuditRepository::new());

    let category_service = CategoryService::new(
        identity_directory.clone(),
        privilege_registry,
        category_repository,
        audit_repository.clone(),
        audit_repository,
    );

    (
        AppState {
            category_service,
            trusted_proxies,
            storage_backend: "memory",
            postgres_pool: None,
        },
        MemoryStores { identity_directory },
    )
}
