use std::collections::BTreeMap;

use agora_domain::{MemberPrivileges, PrivilegeListing, PrivilegeNames};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single privilege name or a list of names.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(untagged)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/privilege-names-request.ts"
)]
pub enum PrivilegeNamesRequest {
    One(String),
    Many(Vec<String>),
}

/// Incoming payload for privilege changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/privilege-change-request.ts"
)]
pub struct PrivilegeChangeRequest {
    pub privilege: PrivilegeNamesRequest,
    /// User id or group name.
    pub member: String,
    /// `true` grants, `false` rescinds.
    pub set: bool,
}

/// Incoming payload for single-privilege give or rescind routes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-privilege-request.ts"
)]
pub struct MemberPrivilegeRequest {
    pub member: String,
}

/// Privilege state of one member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-privileges-response.ts"
)]
pub struct MemberPrivilegesResponse {
    pub member: String,
    pub privileges: BTreeMap<String, bool>,
}

/// API representation of a privilege table.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/privilege-listing-response.ts"
)]
pub struct PrivilegeListingResponse {
    /// `admin`, `global` or `category:{cid}`.
    pub scope: String,
    pub user_privileges: Vec<String>,
    pub group_privileges: Vec<String>,
    pub users: Vec<MemberPrivilegesResponse>,
    pub groups: Vec<MemberPrivilegesResponse>,
}

impl From<PrivilegeNamesRequest> for PrivilegeNames {
    fn from(value: PrivilegeNamesRequest) -> Self {
        match value {
            PrivilegeNamesRequest::One(name) => Self::One(name),
            PrivilegeNamesRequest::Many(names) => Self::Many(names),
        }
    }
}

impl From<MemberPrivileges> for MemberPrivilegesResponse {
    fn from(value: MemberPrivileges) -> Self {
        Self {
            member: value.member,
            privileges: value.privileges,
        }
    }
}

impl From<PrivilegeListing> for PrivilegeListingResponse {
    fn from(value: PrivilegeListing) -> Self {
        Self {
            scope: value.scope.to_string(),
            user_privileges: value.user_privileges,
            group_privileges: value.group_privileges,
            users: value.users.into_iter().map(Into::into).collect(),
            groups: value.groups.into_iter().map(Into::into).collect(),
        }
    }
}
