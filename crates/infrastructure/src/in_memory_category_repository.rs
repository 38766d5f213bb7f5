use std::collections::BTreeMap;
use std::sync::Arc;

use agora_application::{CategoryRepository, CategoryUpdate, CreateCategoryInput};
use agora_core::{AppError, AppResult};
use agora_domain::{Category, CategoryChanges, CategoryId};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::in_memory_privilege_registry::InMemoryPrivilegeRegistry;

#[derive(Debug, Default)]
struct CategoryStore {
    last_cid: u64,
    categories: BTreeMap<CategoryId, Category>,
}

/// In-memory category repository.
///
/// New categories receive the default group grants; purged categories lose
/// their grants and their children move to the root.
#[derive(Debug)]
pub struct InMemoryCategoryRepository {
    privilege_registry: Arc<InMemoryPrivilegeRegistry>,
    store: RwLock<CategoryStore>,
}

impl InMemoryCategoryRepository {
    /// Creates an empty repository sharing grants with the registry.
    #[must_use]
    pub fn new(privilege_registry: Arc<InMemoryPrivilegeRegistry>) -> Self {
        Self {
            privilege_registry,
            store: RwLock::new(CategoryStore::default()),
        }
    }
}

fn require_parent(
    categories: &BTreeMap<CategoryId, Category>,
    parent_cid: Option<CategoryId>,
) -> AppResult<()> {
    match parent_cid {
        Some(parent) if !categories.contains_key(&parent) => Err(AppError::Validation(format!(
            "parent category '{parent}' does not exist"
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_category(&self, cid: CategoryId) -> AppResult<Option<Category>> {
        Ok(self.store.read().await.categories.get(&cid).cloned())
    }

    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<CategoryId> {
        let cid = {
            let mut store = self.store.write().await;
            require_parent(&store.categories, input.parent_cid)?;

            let cid = CategoryId::new(store.last_cid + 1)?;
            let order = input
                .order
                .unwrap_or_else(|| i64::try_from(cid.as_u64()).unwrap_or(i64::MAX));
            let category = Category::new(
                cid,
                input.name,
                input.description,
                input.parent_cid,
                order,
                false,
            )?;

            store.last_cid = cid.as_u64();
            store.categories.insert(cid, category);
            cid
        };

        self.privilege_registry.grant_category_defaults(cid).await;
        Ok(cid)
    }

    async fn update_categories(&self, updates: &[CategoryUpdate]) -> AppResult<Vec<CategoryId>> {
        let mut store = self.store.write().await;
        let mut staged = store.categories.clone();

        for update in updates {
            let current = staged.get(&update.cid).ok_or_else(|| {
                AppError::NotFound(format!("category '{}' does not exist", update.cid))
            })?;
            let changed = current.apply_changes(&update.changes)?;
            staged.insert(update.cid, changed);
        }

        for update in updates {
            if let Some(category) = staged.get(&update.cid) {
                require_parent(&staged, category.parent_cid())?;
            }
        }

        store.categories = staged;
        Ok(updates.iter().map(|update| update.cid).collect())
    }

    async fn category_name(&self, cid: CategoryId) -> AppResult<Option<String>> {
        Ok(self
            .store
            .read()
            .await
            .categories
            .get(&cid)
            .map(|category| category.name().as_str().to_owned()))
    }

    async fn purge_category(&self, cid: CategoryId, uid: u64) -> AppResult<()> {
        {
            let mut store = self.store.write().await;
            if store.categories.remove(&cid).is_none() {
                return Err(AppError::NotFound(format!("category '{cid}' does not exist")));
            }

            let children: Vec<CategoryId> = store
                .categories
                .values()
                .filter(|category| category.parent_cid() == Some(cid))
                .map(Category::cid)
                .collect();
            for child in children {
                if let Some(category) = store.categories.get_mut(&child) {
                    *category = category.apply_changes(&CategoryChanges {
                        parent_cid: Some(0),
                        ..CategoryChanges::default()
                    })?;
                }
            }
        }

        self.privilege_registry.purge_category(cid).await;
        debug!(%cid, uid, "category purged from memory");
        Ok(())
    }

    async fn categories_for_caller(
        &self,
        cids: &[CategoryId],
        _uid: u64,
    ) -> AppResult<Vec<Category>> {
        let store = self.store.read().await;

        Ok(cids
            .iter()
            .filter_map(|cid| store.categories.get(cid).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests;
