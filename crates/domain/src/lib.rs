//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod category;
mod privilege;
mod security;

pub use category::{Category, CategoryChanges, CategoryId};
pub use privilege::{
    ADMIN_SCOPE_SENTINEL, CategoryAccess, ChangeScope, MemberKind, MemberPrivileges,
    PrivilegeAction, PrivilegeListing, PrivilegeNames, PrivilegeScope, PrivilegeSet,
    parse_integer_prefix,
};
pub use security::AuditAction;
