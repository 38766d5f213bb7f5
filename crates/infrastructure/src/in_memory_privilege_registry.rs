use std::collections::HashMap;
use std::sync::Arc;

use agora_application::PrivilegeRegistry;
use agora_core::AppResult;
use agora_domain::{CategoryAccess, CategoryId, PrivilegeListing, PrivilegeScope, PrivilegeSet};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::in_memory_identity_directory::InMemoryIdentityDirectory;
use crate::privilege_catalogue::{ADMINISTRATORS_GROUP, DEFAULT_CATEGORY_GRANTS, PrivilegeCatalogue};
use crate::privilege_table::{ScopeGrants, build_listing, resolve_access};

/// In-memory privilege registry keyed by scope.
#[derive(Debug)]
pub struct InMemoryPrivilegeRegistry {
    catalogue: PrivilegeCatalogue,
    identity_directory: Arc<InMemoryIdentityDirectory>,
    grants: RwLock<HashMap<PrivilegeScope, ScopeGrants>>,
}

impl InMemoryPrivilegeRegistry {
    /// Creates an empty registry resolving groups through the directory.
    #[must_use]
    pub fn new(identity_directory: Arc<InMemoryIdentityDirectory>) -> Self {
        Self {
            catalogue: PrivilegeCatalogue,
            identity_directory,
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Seeds the default group grants of a new category.
    pub async fn grant_category_defaults(&self, cid: CategoryId) {
        let mut grants = self.grants.write().await;
        let scope_grants = grants.entry(PrivilegeScope::Category(cid)).or_default();

        for (group, privileges) in DEFAULT_CATEGORY_GRANTS {
            for privilege in *privileges {
                scope_grants
                    .entry((*privilege).to_owned())
                    .or_default()
                    .insert((*group).to_owned());
            }
        }
    }

    /// Drops every grant attached to a category.
    pub async fn purge_category(&self, cid: CategoryId) {
        self.grants
            .write()
            .await
            .remove(&PrivilegeScope::Category(cid));
    }

    async fn scope_grants(&self, scope: PrivilegeScope) -> ScopeGrants {
        self.grants
            .read()
            .await
            .get(&scope)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PrivilegeRegistry for InMemoryPrivilegeRegistry {
    async fn privilege_list(&self, scope: PrivilegeScope) -> AppResult<PrivilegeSet> {
        Ok(self.catalogue.privilege_set(scope))
    }

    async fn give(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()> {
        let mut grants = self.grants.write().await;
        let scope_grants = grants.entry(scope).or_default();

        for privilege in privileges {
            scope_grants
                .entry(privilege.clone())
                .or_default()
                .insert(member.to_owned());
        }

        Ok(())
    }

    async fn rescind(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()> {
        let mut grants = self.grants.write().await;
        let Some(scope_grants) = grants.get_mut(&scope) else {
            return Ok(());
        };

        for privilege in privileges {
            if let Some(members) = scope_grants.get_mut(privilege) {
                members.remove(member);
            }
        }
        scope_grants.retain(|_, members| !members.is_empty());

        Ok(())
    }

    async fn list(&self, scope: PrivilegeScope, caller_uid: u64) -> AppResult<PrivilegeListing> {
        let grants = self.scope_grants(scope).await;
        let known_groups = self.identity_directory.group_names().await;
        let caller_is_administrator = self
            .identity_directory
            .groups_of(caller_uid)
            .await
            .iter()
            .any(|group| group == ADMINISTRATORS_GROUP);

        Ok(build_listing(
            self.catalogue,
            scope,
            &grants,
            &known_groups,
            caller_is_administrator,
        ))
    }

    async fn category_access(&self, cid: CategoryId, uid: u64) -> AppResult<CategoryAccess> {
        let scope = PrivilegeScope::Category(cid);
        let grants = self.scope_grants(scope).await;
        let user_groups = self.identity_directory.groups_of(uid).await;

        Ok(resolve_access(
            self.catalogue,
            scope,
            &grants,
            uid,
            &user_groups,
        ))
    }
}
