use std::collections::{BTreeMap, BTreeSet};

use agora_domain::{CategoryAccess, MemberKind, MemberPrivileges, PrivilegeListing, PrivilegeScope};

use crate::privilege_catalogue::{ADMINISTRATORS_GROUP, GROUP_PRIVILEGE_PREFIX, PrivilegeCatalogue};

/// Holders of each granted privilege within one scope.
pub(crate) type ScopeGrants = BTreeMap<String, BTreeSet<String>>;

/// Builds the privilege table of a scope from its stored grants.
///
/// Users appear when they hold at least one user privilege; every known group
/// appears. Administrator-only admin privileges are hidden unless the caller
/// is an administrator.
pub(crate) fn build_listing(
    catalogue: PrivilegeCatalogue,
    scope: PrivilegeScope,
    grants: &ScopeGrants,
    known_groups: &[String],
    caller_is_administrator: bool,
) -> PrivilegeListing {
    let visible = |name: &String| caller_is_administrator || !catalogue.is_administrator_only(name);

    let user_privileges: Vec<String> = catalogue
        .user_privileges(scope)
        .iter()
        .map(|name| (*name).to_owned())
        .filter(visible)
        .collect();
    let group_privileges: Vec<String> = catalogue
        .group_privileges(scope)
        .into_iter()
        .filter(visible)
        .collect();

    let user_members: BTreeSet<u64> = grants
        .iter()
        .filter(|(privilege, _)| member_kind_of(privilege) == MemberKind::User)
        .flat_map(|(_, members)| members.iter())
        .filter_map(|member| canonical_uid(member.as_str()))
        .collect();

    let users = user_members
        .into_iter()
        .map(|uid| member_row(uid.to_string(), &user_privileges, grants))
        .collect();
    let groups = known_groups
        .iter()
        .map(|group| member_row(group.clone(), &group_privileges, grants))
        .collect();

    PrivilegeListing {
        scope,
        user_privileges,
        group_privileges,
        users,
        groups,
    }
}

/// Resolves the effective category privileges of a user.
///
/// A privilege is held when granted to the uid directly, when its group form is
/// granted to one of the user's groups, or when the user is an administrator.
pub(crate) fn resolve_access(
    catalogue: PrivilegeCatalogue,
    scope: PrivilegeScope,
    grants: &ScopeGrants,
    uid: u64,
    user_groups: &[String],
) -> CategoryAccess {
    let member = uid.to_string();
    let is_administrator = user_groups.iter().any(|group| group == ADMINISTRATORS_GROUP);

    let privileges: BTreeMap<String, bool> = catalogue
        .user_privileges(scope)
        .iter()
        .map(|name| {
            let direct = holds(grants, name, member.as_str());
            let through_group = user_groups.iter().any(|group| {
                holds(grants, format!("{GROUP_PRIVILEGE_PREFIX}{name}").as_str(), group)
            });
            ((*name).to_owned(), is_administrator || direct || through_group)
        })
        .collect();

    CategoryAccess {
        read: privileges.get("read").copied().unwrap_or(false),
        privileges,
    }
}

/// Parses a member as a uid only when written in canonical decimal form.
///
/// Grants are stored under the literal member string, so `"012"` or `" 12"`
/// must not resolve to user 12.
pub(crate) fn canonical_uid(member: &str) -> Option<u64> {
    member
        .parse::<u64>()
        .ok()
        .filter(|uid| uid.to_string() == member)
}

/// Returns whether a listing shows the member holding the privilege.
#[cfg(test)]
pub(crate) fn is_granted(listing: &PrivilegeListing, member: &str, privilege: &str) -> bool {
    listing
        .users
        .iter()
        .chain(listing.groups.iter())
        .filter(|entry| entry.member == member)
        .any(|entry| entry.privileges.get(privilege).copied().unwrap_or(false))
}

/// Returns which member kind a privilege name addresses.
pub(crate) fn member_kind_of(privilege: &str) -> MemberKind {
    if privilege.starts_with(GROUP_PRIVILEGE_PREFIX) {
        MemberKind::Group
    } else {
        MemberKind::User
    }
}

fn member_row(member: String, privileges: &[String], grants: &ScopeGrants) -> MemberPrivileges {
    let privileges = privileges
        .iter()
        .map(|privilege| (privilege.clone(), holds(grants, privilege, member.as_str())))
        .collect();

    MemberPrivileges { member, privileges }
}

fn holds(grants: &ScopeGrants, privilege: &str, member: &str) -> bool {
    grants
        .get(privilege)
        .is_some_and(|members| members.contains(member))
}
