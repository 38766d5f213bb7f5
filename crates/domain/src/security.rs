use std::str::FromStr;

use agora_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditAction {
    /// Emitted when privileges are granted or rescinded.
    PrivilegeChange,
    /// Emitted when a category is purged.
    CategoryPurge,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrivilegeChange => "privilege-change",
            Self::CategoryPurge => "category-purge",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "privilege-change" => Ok(Self::PrivilegeChange),
            "category-purge" => Ok(Self::CategoryPurge),
            _ => Err(AppError::Validation(format!(
                "unknown audit action '{value}'"
            ))),
        }
    }
}
