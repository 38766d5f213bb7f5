use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use agora_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::CategoryId;

/// Raw scope sentinel selecting the administrative privilege listing.
pub const ADMIN_SCOPE_SENTINEL: &str = "admin";

/// Two-variant selector choosing between granting and revoking privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeAction {
    /// Adds the privileges to the member.
    Give,
    /// Removes the privileges from the member.
    Rescind,
}

impl PrivilegeAction {
    /// Maps the transport `set` flag onto an action.
    #[must_use]
    pub fn from_set_flag(set: bool) -> Self {
        if set { Self::Give } else { Self::Rescind }
    }

    /// Returns the label written to audit events.
    #[must_use]
    pub fn audit_label(&self) -> &'static str {
        match self {
            Self::Give => "grant",
            Self::Rescind => "rescind",
        }
    }
}

/// Scope owning a valid-privilege list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "cid", rename_all = "snake_case")]
pub enum PrivilegeScope {
    /// Administrative (ACP) privileges.
    Admin,
    /// Site-wide privileges.
    Global,
    /// Privileges attached to one category.
    Category(CategoryId),
}

impl PrivilegeScope {
    /// Resolves a raw scope identifier for privilege listings.
    ///
    /// `admin` selects the admin scope, zero or non-numeric input selects the
    /// global scope, and a positive integer selects that category.
    pub fn for_listing(raw: &str) -> AppResult<Self> {
        if raw == ADMIN_SCOPE_SENTINEL {
            return Ok(Self::Admin);
        }

        Ok(match ChangeScope::resolve(raw)? {
            ChangeScope::SiteWide => Self::Global,
            ChangeScope::Category(cid) => Self::Category(cid),
        })
    }

    /// Returns the stable scope kind label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Global => "global",
            Self::Category(_) => "category",
        }
    }

    /// Returns whether an empty filtered batch is skipped instead of applied.
    ///
    /// Admin and global batches are only applied when non-empty; category
    /// batches are always applied.
    #[must_use]
    pub fn skips_empty_batches(&self) -> bool {
        !matches!(self, Self::Category(_))
    }

    /// Returns the category id for category scopes.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        match self {
            Self::Category(cid) => Some(*cid),
            Self::Admin | Self::Global => None,
        }
    }
}

impl Display for PrivilegeScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category(cid) => write!(formatter, "category:{cid}"),
            Self::Admin | Self::Global => formatter.write_str(self.kind()),
        }
    }
}

/// Destination of a privilege change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Scope `0`: admin and global privilege lists are both consulted.
    SiteWide,
    /// A single category.
    Category(CategoryId),
}

impl ChangeScope {
    /// Resolves a raw scope identifier for privilege changes.
    ///
    /// Zero and non-numeric input (including `admin`) resolve to the
    /// site-wide scope. Negative values are rejected.
    pub fn resolve(raw: &str) -> AppResult<Self> {
        match parse_integer_prefix(raw)? {
            None | Some(0) => Ok(Self::SiteWide),
            Some(value) if value > 0 => Ok(Self::Category(CategoryId::new(value.unsigned_abs())?)),
            Some(value) => Err(AppError::Validation(format!(
                "scope '{value}' is not a valid category id"
            ))),
        }
    }

    /// Returns the scopes touched by this destination, in apply order.
    #[must_use]
    pub fn scopes(&self) -> Vec<PrivilegeScope> {
        match self {
            Self::SiteWide => vec![PrivilegeScope::Admin, PrivilegeScope::Global],
            Self::Category(cid) => vec![PrivilegeScope::Category(*cid)],
        }
    }
}

/// Parses a leading base-10 integer the way forum clients send scope ids.
///
/// Leading whitespace and a sign are accepted, trailing garbage is ignored,
/// and input without leading digits yields `None`.
pub fn parse_integer_prefix(raw: &str) -> AppResult<Option<i64>> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Ok(None);
    }

    let magnitude = unsigned[..digits_len].parse::<i64>().map_err(|_| {
        AppError::Validation(format!("scope '{raw}' is out of range"))
    })?;

    Ok(Some(if negative { -magnitude } else { magnitude }))
}

/// Privilege names supplied by a caller: one name or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrivilegeNames {
    /// A single privilege name.
    One(String),
    /// An ordered list of privilege names.
    Many(Vec<String>),
}

impl PrivilegeNames {
    /// Normalizes into an ordered, non-empty list of non-blank names.
    pub fn normalize(&self) -> AppResult<Vec<String>> {
        let names = match self {
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        };

        if names.is_empty() {
            return Err(AppError::Validation(
                "at least one privilege is required".to_owned(),
            ));
        }

        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(AppError::Validation(
                "privilege names must not be blank".to_owned(),
            ));
        }

        Ok(names)
    }

    /// Returns the names joined with commas, exactly as supplied.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::One(name) => name.clone(),
            Self::Many(names) => names.join(","),
        }
    }
}

impl From<&str> for PrivilegeNames {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<Vec<String>> for PrivilegeNames {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

/// Immutable set of privilege names recognized by one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeSet(BTreeSet<String>);

impl PrivilegeSet {
    /// Builds a set from privilege names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Returns whether the name is recognized.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns the requested names recognized by this set, in request order.
    #[must_use]
    pub fn select(&self, requested: &[String]) -> Vec<String> {
        requested
            .iter()
            .filter(|name| self.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

/// Kind of privilege holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// A forum user, identified by uid.
    User,
    /// A user group, identified by name.
    Group,
}

/// Privilege state of one member within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPrivileges {
    /// User id or group name.
    pub member: String,
    /// Every privilege of the scope, mapped to whether the member holds it.
    pub privileges: BTreeMap<String, bool>,
}

/// Privilege table for a scope, as returned by privilege listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeListing {
    /// Listed scope.
    pub scope: PrivilegeScope,
    /// Privilege names valid for user members.
    pub user_privileges: Vec<String>,
    /// Privilege names valid for group members.
    pub group_privileges: Vec<String>,
    /// Users holding at least one privilege.
    pub users: Vec<MemberPrivileges>,
    /// Groups, including those holding no privilege.
    pub groups: Vec<MemberPrivileges>,
}

/// Effective access of a user to one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAccess {
    /// Whether the category may be read.
    pub read: bool,
    /// Effective category privileges of the user.
    pub privileges: BTreeMap<String, bool>,
}
