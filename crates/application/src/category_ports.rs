mod audit;
mod inputs;
mod repositories;

pub use audit::{AuditDetail, AuditEvent, AuditLogEntry, AuditLogQuery};
pub use inputs::{CategoryUpdate, CreateCategoryInput, PrivilegeChangeInput};
pub use repositories::{
    AuditLogRepository, AuditRepository, CategoryRepository, IdentityDirectory,
    PrivilegeRegistry,
};
