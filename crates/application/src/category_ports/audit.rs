use std::net::IpAddr;

use agora_core::CallerContext;
use agora_domain::{AuditAction, CategoryId, PrivilegeAction, PrivilegeNames};
use serde::{Deserialize, Serialize};

/// Action-specific audit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuditDetail {
    /// Privileges were granted or rescinded.
    PrivilegeChange {
        /// Requested privilege names joined with commas, unfiltered.
        privilege: String,
        /// Scope identifier exactly as supplied.
        cid: String,
        /// `grant` or `rescind`.
        action: String,
        /// User id or group name receiving the change.
        target: String,
    },
    /// A category was purged.
    CategoryPurge {
        /// Purged category.
        cid: CategoryId,
        /// Category name captured before the purge.
        name: String,
    },
}

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Acting user id.
    pub uid: u64,
    /// Acting source address.
    pub ip: Option<IpAddr>,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Action-specific payload.
    pub detail: AuditDetail,
}

impl AuditEvent {
    /// Builds the event recorded once per privilege change request.
    #[must_use]
    pub fn privilege_change(
        caller: &CallerContext,
        privileges: &PrivilegeNames,
        raw_scope: &str,
        action: PrivilegeAction,
        target: &str,
    ) -> Self {
        Self {
            uid: caller.uid(),
            ip: caller.ip(),
            action: AuditAction::PrivilegeChange,
            detail: AuditDetail::PrivilegeChange {
                privilege: privileges.joined(),
                cid: raw_scope.to_owned(),
                action: action.audit_label().to_owned(),
                target: target.to_owned(),
            },
        }
    }

    /// Builds the event recorded after a category purge.
    #[must_use]
    pub fn category_purge(caller: &CallerContext, cid: CategoryId, name: String) -> Self {
        Self {
            uid: caller.uid(),
            ip: caller.ip(),
            action: AuditAction::CategoryPurge,
            detail: AuditDetail::CategoryPurge { cid, name },
        }
    }
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable event identifier.
    pub event_id: String,
    /// Acting user id.
    pub uid: u64,
    /// Acting source address.
    pub ip: Option<String>,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Action-specific payload.
    pub detail: AuditDetail,
    /// Event timestamp in RFC3339.
    pub created_at: String,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional action filter.
    pub action: Option<AuditAction>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            action: None,
        }
    }
}
