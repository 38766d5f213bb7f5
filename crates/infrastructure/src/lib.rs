//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_category_repository;
mod in_memory_identity_directory;
mod in_memory_privilege_registry;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_category_repository;
mod postgres_identity_directory;
mod postgres_ids;
mod postgres_privilege_registry;
mod privilege_catalogue;
mod privilege_table;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_category_repository::InMemoryCategoryRepository;
pub use in_memory_identity_directory::InMemoryIdentityDirectory;
pub use in_memory_privilege_registry::InMemoryPrivilegeRegistry;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_category_repository::PostgresCategoryRepository;
pub use postgres_identity_directory::PostgresIdentityDirectory;
pub use postgres_privilege_registry::PostgresPrivilegeRegistry;
pub use privilege_catalogue::{
    ADMINISTRATORS_GROUP, DEFAULT_CATEGORY_GRANTS, GROUP_PRIVILEGE_PREFIX, GUESTS_GROUP,
    PrivilegeCatalogue, REGISTERED_USERS_GROUP, SYSTEM_GROUPS, implicit_group,
};
