use tracing::{debug, info};

use agora_domain::{ChangeScope, PrivilegeAction, PrivilegeListing, PrivilegeScope};

use super::*;

use crate::category_ports::{AuditEvent, PrivilegeChangeInput};

impl CategoryService {
    /// Returns the privilege table for a raw scope identifier.
    ///
    /// `admin` lists admin privileges for the caller, zero or non-numeric input
    /// lists global privileges, and a positive id lists that category.
    pub async fn get_privileges(
        &self,
        caller: &CallerContext,
        raw_scope: &str,
    ) -> AppResult<PrivilegeListing> {
        let scope = PrivilegeScope::for_listing(raw_scope)?;
        self.privilege_registry.list(scope, caller.uid()).await
    }

    /// Grants or rescinds privileges for a user or group.
    ///
    /// Requested names are partitioned against each touched scope's privilege
    /// list; names a scope does not recognize are dropped from its batch. A
    /// site-wide request applies admin then global batches, skipping empty ones.
    /// A category batch is always applied, even when empty. Scopes applied
    /// before a failure stay applied.
    pub async fn set_privilege(
        &self,
        caller: &CallerContext,
        input: PrivilegeChangeInput,
    ) -> AppResult<()> {
        self.require_user_or_group(input.member.as_str()).await?;

        let requested = input.privilege.normalize()?;
        let action = PrivilegeAction::from_set_flag(input.set);
        let destination = ChangeScope::resolve(input.scope.as_str())?;

        for scope in destination.scopes() {
            let valid = self.privilege_registry.privilege_list(scope).await?;
            let batch = valid.select(&requested);

            if batch.is_empty() && scope.skips_empty_batches() {
                debug!(%scope, member = %input.member, "no requested privilege applies to scope");
                continue;
            }

            self.apply_batch(scope, action, &batch, input.member.as_str())
                .await?;
        }

        self.audit_repository
            .append_event(AuditEvent::privilege_change(
                caller,
                &input.privilege,
                input.scope.as_str(),
                action,
                input.member.as_str(),
            ))
            .await?;

        info!(
            %caller,
            scope = %input.scope,
            member = %input.member,
            action = action.audit_label(),
            "privileges changed"
        );
        Ok(())
    }

    async fn require_user_or_group(&self, member: &str) -> AppResult<()> {
        let (is_user, is_group) = tokio::try_join!(
            self.identity_directory.user_exists(member),
            self.identity_directory.group_exists(member),
        )?;

        if !is_user && !is_group {
            return Err(AppError::NoUserOrGroup(format!(
                "'{member}' is neither a user nor a group"
            )));
        }

        Ok(())
    }

    async fn apply_batch(
        &self,
        scope: PrivilegeScope,
        action: PrivilegeAction,
        batch: &[String],
        member: &str,
    ) -> AppResult<()> {
        match action {
            PrivilegeAction::Give => self.privilege_registry.give(scope, batch, member).await,
            PrivilegeAction::Rescind => self.privilege_registry.rescind(scope, batch, member).await,
        }
    }
}
