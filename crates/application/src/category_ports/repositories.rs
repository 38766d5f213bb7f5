use async_trait::async_trait;

use agora_core::AppResult;
use agora_domain::{
    Category, CategoryAccess, CategoryId, PrivilegeListing, PrivilegeScope, PrivilegeSet,
};

use super::audit::{AuditEvent, AuditLogEntry, AuditLogQuery};
use super::inputs::{CategoryUpdate, CreateCategoryInput};

/// Port answering whether a member identifier names a user or a group.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Returns whether a user with this id exists.
    async fn user_exists(&self, member: &str) -> AppResult<bool>;

    /// Returns whether a group with this name exists.
    async fn group_exists(&self, member: &str) -> AppResult<bool>;
}

/// Port for per-scope privilege lists and grants.
#[async_trait]
pub trait PrivilegeRegistry: Send + Sync {
    /// Returns the privilege names recognized by a scope.
    async fn privilege_list(&self, scope: PrivilegeScope) -> AppResult<PrivilegeSet>;

    /// Grants privileges to a member in a scope.
    async fn give(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()>;

    /// Revokes privileges from a member in a scope.
    async fn rescind(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()>;

    /// Lists the privilege table of a scope.
    async fn list(&self, scope: PrivilegeScope, caller_uid: u64) -> AppResult<PrivilegeListing>;

    /// Resolves a user's effective access to a category.
    async fn category_access(&self, cid: CategoryId, uid: u64) -> AppResult<CategoryAccess>;
}

/// Repository port for category records.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Finds one category.
    async fn find_category(&self, cid: CategoryId) -> AppResult<Option<Category>>;

    /// Creates a category and returns its id.
    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<CategoryId>;

    /// Applies a batch of modifications and returns the modified ids.
    async fn update_categories(&self, updates: &[CategoryUpdate]) -> AppResult<Vec<CategoryId>>;

    /// Returns the category name, when the category exists.
    async fn category_name(&self, cid: CategoryId) -> AppResult<Option<String>>;

    /// Removes a category and everything attached to it.
    async fn purge_category(&self, cid: CategoryId, uid: u64) -> AppResult<()>;

    /// Returns the categories as presented to a caller, in request order.
    async fn categories_for_caller(
        &self,
        cids: &[CategoryId],
        uid: u64,
    ) -> AppResult<Vec<Category>>;
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Repository port for reading audit logs.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists most recent audit entries.
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}
