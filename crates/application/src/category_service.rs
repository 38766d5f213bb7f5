use std::sync::Arc;

use agora_core::{AppError, AppResult, CallerContext};

use crate::category_ports::{
    AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository, CategoryRepository,
    IdentityDirectory, PrivilegeRegistry,
};

mod crud;
mod privileges;

#[cfg(test)]
mod tests;

/// Application service for category administration and category privileges.
#[derive(Clone)]
pub struct CategoryService {
    identity_directory: Arc<dyn IdentityDirectory>,
    privilege_registry: Arc<dyn PrivilegeRegistry>,
    category_repository: Arc<dyn CategoryRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl CategoryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        identity_directory: Arc<dyn IdentityDirectory>,
        privilege_registry: Arc<dyn PrivilegeRegistry>,
        category_repository: Arc<dyn CategoryRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            identity_directory,
            privilege_registry,
            category_repository,
            audit_repository,
            audit_log_repository,
        }
    }

    /// Returns recent audit entries.
    pub async fn list_audit_log(
        &self,
        _caller: &CallerContext,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        if query.limit == 0 {
            return Err(AppError::Validation(
                "audit log limit must be greater than zero".to_owned(),
            ));
        }

        self.audit_log_repository.list_recent_entries(query).await
    }
}
