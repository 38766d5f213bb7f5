//! Application services and ports.

#![forbid(unsafe_code)]

mod category_ports;
mod category_service;

pub use category_ports::{
    AuditDetail, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    CategoryRepository, CategoryUpdate, CreateCategoryInput, IdentityDirectory,
    PrivilegeChangeInput, PrivilegeRegistry,
};
pub use category_service::CategoryService;
