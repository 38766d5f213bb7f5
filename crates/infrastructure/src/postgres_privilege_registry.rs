use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use agora_application::PrivilegeRegistry;
use agora_core::{AppError, AppResult};
use agora_domain::{CategoryAccess, CategoryId, PrivilegeListing, PrivilegeScope, PrivilegeSet};

use crate::postgres_identity_directory::PostgresIdentityDirectory;
use crate::postgres_ids::scope_key;
use crate::privilege_catalogue::{ADMINISTRATORS_GROUP, PrivilegeCatalogue};
use crate::privilege_table::{ScopeGrants, build_listing, resolve_access};

/// PostgreSQL-backed privilege registry.
#[derive(Clone)]
pub struct PostgresPrivilegeRegistry {
    pool: PgPool,
    catalogue: PrivilegeCatalogue,
    identity_directory: PostgresIdentityDirectory,
}

impl PostgresPrivilegeRegistry {
    /// Creates a registry with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            identity_directory: PostgresIdentityDirectory::new(pool.clone()),
            pool,
            catalogue: PrivilegeCatalogue,
        }
    }

    async fn scope_grants(&self, scope: PrivilegeScope) -> AppResult<ScopeGrants> {
        let (scope_kind, cid) = scope_key(scope)?;
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT privilege, member
            FROM privilege_grants
            WHERE scope_kind = $1 AND cid = $2
            "#,
        )
        .bind(scope_kind)
        .bind(cid)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load grants for scope '{scope}': {error}"))
        })?;

        let mut grants = ScopeGrants::new();
        for row in rows {
            grants.entry(row.privilege).or_default().insert(row.member);
        }

        Ok(grants)
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    privilege: String,
    member: String,
}

#[async_trait]
impl PrivilegeRegistry for PostgresPrivilegeRegistry {
    async fn privilege_list(&self, scope: PrivilegeScope) -> AppResult<PrivilegeSet> {
        Ok(self.catalogue.privilege_set(scope))
    }

    async fn give(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()> {
        if privileges.is_empty() {
            return Ok(());
        }

        let (scope_kind, cid) = scope_key(scope)?;
        sqlx::query(
            r#"
            INSERT INTO privilege_grants (scope_kind, cid, privilege, member)
            SELECT $1, $2, privilege, $3
            FROM UNNEST($4::TEXT[]) AS privilege
            ON CONFLICT (scope_kind, cid, privilege, member) DO NOTHING
            "#,
        )
        .bind(scope_kind)
        .bind(cid)
        .bind(member)
        .bind(privileges.to_vec())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to give privileges in scope '{scope}' to '{member}': {error}"
            ))
        })?;

        Ok(())
    }

    async fn rescind(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()> {
        if privileges.is_empty() {
            return Ok(());
        }

        let (scope_kind, cid) = scope_key(scope)?;
        sqlx::query(
            r#"
            DELETE FROM privilege_grants
            WHERE scope_kind = $1
                AND cid = $2
                AND member = $3
                AND privilege = ANY($4::TEXT[])
            "#,
        )
        .bind(scope_kind)
        .bind(cid)
        .bind(member)
        .bind(privileges.to_vec())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to rescind privileges in scope '{scope}' from '{member}': {error}"
            ))
        })?;

        Ok(())
    }

    async fn list(&self, scope: PrivilegeScope, caller_uid: u64) -> AppResult<PrivilegeListing> {
        let (grants, known_groups, caller_groups) = tokio::try_join!(
            self.scope_grants(scope),
            self.identity_directory.group_names(),
            self.identity_directory.groups_of(caller_uid),
        )?;
        let caller_is_administrator = caller_groups
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
        let (grants, user_groups) = tokio::try_join!(
            self.scope_grants(scope),
            self.identity_directory.groups_of(uid),
        )?;

        Ok(resolve_access(
            self.catalogue,
            scope,
            &grants,
            uid,
            &user_groups,
        ))
    }
}
