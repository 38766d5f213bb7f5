mod audit;
mod categories;
mod common;
mod privileges;

pub use audit::{AuditDetailResponse, AuditLogEntryResponse, AuditLogQueryParams};
pub use categories::{
    CategoryResponse, CategoryUpdateRequest, CreateCategoryRequest, UpdateCategoriesRequest,
    UpdateCategoriesResponse,
};
pub use common::HealthResponse;
pub use privileges::{
    MemberPrivilegeRequest, MemberPrivilegesResponse, PrivilegeChangeRequest,
    PrivilegeListingResponse, PrivilegeNamesRequest,
};
