use agora_domain::{CategoryChanges, CategoryId, PrivilegeNames};

/// Input payload for category creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategoryInput {
    /// Display name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Parent category for nested categories.
    pub parent_cid: Option<CategoryId>,
    /// Sort order; the store appends the category when absent.
    pub order: Option<i64>,
}

/// One category modification inside an update batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUpdate {
    /// Category to modify.
    pub cid: CategoryId,
    /// Field changes.
    pub changes: CategoryChanges,
}

/// Input payload for privilege changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeChangeInput {
    /// Raw scope identifier: `0` for site-wide, otherwise a category id.
    pub scope: String,
    /// Requested privilege names.
    pub privilege: PrivilegeNames,
    /// User id or group name receiving the change.
    pub member: String,
    /// `true` grants, `false` rescinds.
    pub set: bool,
}
