use agora_application::{AuditDetail, AuditLogEntry, AuditLogQuery};
use agora_core::AppError;
use agora_domain::AuditAction;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string of the audit log listing.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQueryParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
}

/// Action-specific audit payload.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "kebab-case", tag = "type")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/audit-detail-response.ts"
)]
pub enum AuditDetailResponse {
    PrivilegeChange {
        privilege: String,
        cid: String,
        action: String,
        target: String,
    },
    CategoryPurge {
        cid: u64,
        name: String,
    },
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub uid: u64,
    pub ip: Option<String>,
    pub action: String,
    pub detail: AuditDetailResponse,
    pub created_at: String,
}

impl TryFrom<AuditLogQueryParams> for AuditLogQuery {
    type Error = AppError;

    fn try_from(value: AuditLogQueryParams) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        Ok(Self {
            limit: value.limit.unwrap_or(defaults.limit),
            offset: value.offset.unwrap_or(defaults.offset),
            action: value
                .action
                .filter(|action| !action.trim().is_empty())
                .map(|action| action.parse::<AuditAction>())
                .transpose()?,
        })
    }
}

impl From<AuditDetail> for AuditDetailResponse {
    fn from(value: AuditDetail) -> Self {
        match value {
            AuditDetail::PrivilegeChange {
                privilege,
                cid,
                action,
                target,
            } => Self::PrivilegeChange {
                privilege,
                cid,
                action,
                target,
            },
            AuditDetail::CategoryPurge { cid, name } => Self::CategoryPurge {
                cid: cid.as_u64(),
                name,
            },
        }
    }
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            uid: value.uid,
            ip: value.ip,
            action: value.action.as_str().to_owned(),
            detail: value.detail.into(),
            created_at: value.created_at,
        }
    }
}
