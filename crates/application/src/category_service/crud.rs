use tracing::{debug, info};

use agora_domain::{Category, CategoryId};

use super::*;

use crate::category_ports::{AuditEvent, CategoryUpdate, CreateCategoryInput};

impl CategoryService {
    /// Returns a category when it exists and the caller may read it.
    pub async fn get(
        &self,
        caller: &CallerContext,
        cid: CategoryId,
    ) -> AppResult<Option<Category>> {
        let (access, category) = tokio::try_join!(
            self.privilege_registry.category_access(cid, caller.uid()),
            self.category_repository.find_category(cid),
        )?;

        if !access.read {
            debug!(%cid, uid = caller.uid(), "category hidden from caller");
            return Ok(None);
        }

        Ok(category)
    }

    /// Creates a category and returns it as presented to the caller.
    pub async fn create(
        &self,
        caller: &CallerContext,
        input: CreateCategoryInput,
    ) -> AppResult<Category> {
        let cid = self.category_repository.create_category(input).await?;

        self.category_repository
            .categories_for_caller(&[cid], caller.uid())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal(format!("created category '{cid}' is missing")))
    }

    /// Applies a batch of category modifications.
    pub async fn update(
        &self,
        caller: &CallerContext,
        updates: Option<Vec<CategoryUpdate>>,
    ) -> AppResult<Vec<CategoryId>> {
        let updates = updates
            .filter(|updates| !updates.is_empty())
            .ok_or_else(|| AppError::Validation("category update payload is required".to_owned()))?;

        let updated = self.category_repository.update_categories(&updates).await?;
        debug!(uid = caller.uid(), count = updated.len(), "categories updated");

        Ok(updated)
    }

    /// Purges a category and records a `category-purge` audit event.
    pub async fn delete(&self, caller: &CallerContext, cid: CategoryId) -> AppResult<()> {
        let name = self
            .category_repository
            .category_name(cid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category '{cid}' does not exist")))?;

        self.category_repository
            .purge_category(cid, caller.uid())
            .await?;

        self.audit_repository
            .append_event(AuditEvent::category_purge(caller, cid, name))
            .await?;

        info!(%cid, %caller, "category purged");
        Ok(())
    }
}
