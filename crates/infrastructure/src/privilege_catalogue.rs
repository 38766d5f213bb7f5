use agora_domain::{PrivilegeScope, PrivilegeSet};

/// Prefix distinguishing group privileges from user privileges.
pub const GROUP_PRIVILEGE_PREFIX: &str = "groups:";

/// Group whose members hold every privilege.
pub const ADMINISTRATORS_GROUP: &str = "administrators";

/// Implicit group of every signed-in user.
pub const REGISTERED_USERS_GROUP: &str = "registered-users";

/// Implicit group of anonymous visitors (uid `0`).
pub const GUESTS_GROUP: &str = "guests";

/// Group grants every new category starts with.
pub const DEFAULT_CATEGORY_GRANTS: &[(&str, &[&str])] = &[
    (
        REGISTERED_USERS_GROUP,
        &[
            "groups:find",
            "groups:read",
            "groups:topics:read",
            "groups:topics:create",
            "groups:topics:reply",
            "groups:topics:tag",
            "groups:posts:edit",
            "groups:posts:history",
            "groups:posts:delete",
            "groups:posts:upvote",
            "groups:posts:downvote",
            "groups:topics:delete",
        ],
    ),
    (
        GUESTS_GROUP,
        &["groups:find", "groups:read", "groups:topics:read"],
    ),
];

/// Groups that always exist.
pub const SYSTEM_GROUPS: &[&str] = &[ADMINISTRATORS_GROUP, REGISTERED_USERS_GROUP, GUESTS_GROUP];

/// Returns the group a uid belongs to without explicit membership.
#[must_use]
pub fn implicit_group(uid: u64) -> &'static str {
    if uid == 0 {
        GUESTS_GROUP
    } else {
        REGISTERED_USERS_GROUP
    }
}

/// Admin privileges only visible to administrators in listings.
const ADMINISTRATOR_ONLY_PRIVILEGES: &[&str] = &["admin:admins-mods", "admin:privileges"];

const ADMIN_PRIVILEGES: &[&str] = &[
    "admin:dashboard",
    "admin:categories",
    "admin:privileges",
    "admin:admins-mods",
    "admin:users",
    "admin:groups",
    "admin:tags",
    "admin:settings",
];

const GLOBAL_PRIVILEGES: &[&str] = &[
    "chat",
    "upload:post:image",
    "upload:post:file",
    "signature",
    "invite",
    "search:content",
    "search:users",
    "search:tags",
    "view:users",
    "view:tags",
    "view:groups",
    "local:login",
    "ban",
    "mute",
    "view:users:info",
];

const CATEGORY_PRIVILEGES: &[&str] = &[
    "find",
    "read",
    "topics:read",
    "topics:create",
    "topics:reply",
    "topics:tag",
    "posts:edit",
    "posts:history",
    "posts:delete",
    "posts:upvote",
    "posts:downvote",
    "topics:delete",
    "posts:view_deleted",
    "purge",
    "moderate",
];

/// Fixed catalogue of privilege names recognized per scope.
///
/// Every user privilege `name` has a group counterpart `groups:name`; the valid
/// list of a scope contains both forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivilegeCatalogue;

impl PrivilegeCatalogue {
    /// Returns user privilege names of a scope, in display order.
    #[must_use]
    pub fn user_privileges(&self, scope: PrivilegeScope) -> &'static [&'static str] {
        match scope {
            PrivilegeScope::Admin => ADMIN_PRIVILEGES,
            PrivilegeScope::Global => GLOBAL_PRIVILEGES,
            PrivilegeScope::Category(_) => CATEGORY_PRIVILEGES,
        }
    }

    /// Returns group privilege names of a scope, in display order.
    #[must_use]
    pub fn group_privileges(&self, scope: PrivilegeScope) -> Vec<String> {
        self.user_privileges(scope)
            .iter()
            .map(|name| format!("{GROUP_PRIVILEGE_PREFIX}{name}"))
            .collect()
    }

    /// Returns the full valid-privilege set of a scope.
    #[must_use]
    pub fn privilege_set(&self, scope: PrivilegeScope) -> PrivilegeSet {
        PrivilegeSet::from_names(
            self.user_privileges(scope)
                .iter()
                .map(|name| (*name).to_owned())
                .chain(self.group_privileges(scope)),
        )
    }

    /// Returns whether a privilege is hidden from non-administrator listings.
    #[must_use]
    pub fn is_administrator_only(&self, privilege: &str) -> bool {
        let name = privilege
            .strip_prefix(GROUP_PRIVILEGE_PREFIX)
            .unwrap_or(privilege);
        ADMINISTRATOR_ONLY_PRIVILEGES.contains(&name)
    }
}
