use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;

use agora_application::{CategoryRepository, CategoryUpdate, CreateCategoryInput};
use agora_core::{AppError, AppResult, NonEmptyString};
use agora_domain::{Category, CategoryId};

use crate::postgres_ids::{category_id_from_db, to_db_id};
use crate::privilege_catalogue::DEFAULT_CATEGORY_GRANTS;

/// PostgreSQL-backed category repository.
#[derive(Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    cid: i64,
    name: String,
    description: String,
    parent_cid: Option<i64>,
    sort_order: i64,
    disabled: bool,
}

impl CategoryRow {
    fn into_category(self) -> AppResult<Category> {
        Category::new(
            category_id_from_db(self.cid)?,
            self.name,
            self.description,
            self.parent_cid.map(category_id_from_db).transpose()?,
            self.sort_order,
            self.disabled,
        )
    }
}

async fn parent_exists(
    transaction: &mut Transaction<'static, Postgres>,
    parent_cid: CategoryId,
) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM categories WHERE cid = $1)
        "#,
    )
    .bind(to_db_id(parent_cid.as_u64())?)
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to look up parent category '{parent_cid}': {error}"
        ))
    })
}

async fn require_parent(
    transaction: &mut Transaction<'static, Postgres>,
    parent_cid: Option<CategoryId>,
) -> AppResult<()> {
    let Some(parent) = parent_cid else {
        return Ok(());
    };

    if !parent_exists(transaction, parent).await? {
        return Err(AppError::Validation(format!(
            "parent category '{parent}' does not exist"
        )));
    }

    Ok(())
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_category(&self, cid: CategoryId) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT cid, name, description, parent_cid, sort_order, disabled
            FROM categories
            WHERE cid = $1
            "#,
        )
        .bind(to_db_id(cid.as_u64())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find category '{cid}': {error}")))?;

        row.map(CategoryRow::into_category).transpose()
    }

    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<CategoryId> {
        let name = NonEmptyString::new(input.name)?;
        let mut transaction = self.begin().await?;
        require_parent(&mut transaction, input.parent_cid).await?;

        let parent_cid = input
            .parent_cid
            .map(|parent| to_db_id(parent.as_u64()))
            .transpose()?;
        let cid = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO categories (name, description, parent_cid, sort_order)
            VALUES ($1, $2, $3, COALESCE($4::BIGINT, 0))
            RETURNING cid
            "#,
        )
        .bind(name.as_str())
        .bind(input.description.as_str())
        .bind(parent_cid)
        .bind(input.order)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create category: {error}")))?;

        if input.order.is_none() {
            sqlx::query(
                r#"
                UPDATE categories
                SET sort_order = cid
                WHERE cid = $1
                "#,
            )
            .bind(cid)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to order category '{cid}': {error}"))
            })?;
        }

        for (group, privileges) in DEFAULT_CATEGORY_GRANTS {
            let privileges: Vec<String> =
                privileges.iter().map(|name| (*name).to_owned()).collect();
            sqlx::query(
                r#"
                INSERT INTO privilege_grants (scope_kind, cid, privilege, member)
                SELECT 'category', $1, privilege, $2
                FROM UNNEST($3::TEXT[]) AS privilege
                ON CONFLICT (scope_kind, cid, privilege, member) DO NOTHING
                "#,
            )
            .bind(cid)
            .bind(*group)
            .bind(privileges)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to seed default grants for category '{cid}': {error}"
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit category creation: {error}"))
        })?;

        category_id_from_db(cid)
    }

    async fn update_categories(&self, updates: &[CategoryUpdate]) -> AppResult<Vec<CategoryId>> {
        let mut transaction = self.begin().await?;
        let mut updated = Vec::with_capacity(updates.len());

        for update in updates {
            let cid = to_db_id(update.cid.as_u64())?;
            let current = sqlx::query_as::<_, CategoryRow>(
                r#"
                SELECT cid, name, description, parent_cid, sort_order, disabled
                FROM categories
                WHERE cid = $1
                FOR UPDATE
                "#,
            )
            .bind(cid)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load category '{}': {error}", update.cid))
            })?
            .ok_or_else(|| AppError::NotFound(format!("category '{}' does not exist", update.cid)))?
            .into_category()?;

            let changed = current.apply_changes(&update.changes)?;
            require_parent(&mut transaction, changed.parent_cid()).await?;

            let parent_cid = changed
                .parent_cid()
                .map(|parent| to_db_id(parent.as_u64()))
                .transpose()?;
            sqlx::query(
                r#"
                UPDATE categories
                SET name = $2,
                    description = $3,
                    parent_cid = $4,
                    sort_order = $5,
                    disabled = $6,
                    updated_at = now()
                WHERE cid = $1
                "#,
            )
            .bind(cid)
            .bind(changed.name().as_str())
            .bind(changed.description())
            .bind(parent_cid)
            .bind(changed.order())
            .bind(changed.disabled())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to update category '{}': {error}", update.cid))
            })?;

            updated.push(update.cid);
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit category updates: {error}"))
        })?;

        Ok(updated)
    }

    async fn category_name(&self, cid: CategoryId) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM categories
            WHERE cid = $1
            "#,
        )
        .bind(to_db_id(cid.as_u64())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read name of category '{cid}': {error}"))
        })
    }

    async fn purge_category(&self, cid: CategoryId, uid: u64) -> AppResult<()> {
        let db_cid = to_db_id(cid.as_u64())?;
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM privilege_grants
            WHERE scope_kind = 'category' AND cid = $1
            "#,
        )
        .bind(db_cid)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to drop grants of category '{cid}': {error}"))
        })?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE cid = $1
            "#,
        )
        .bind(db_cid)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to purge category '{cid}': {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("category '{cid}' does not exist")));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit category purge: {error}"))
        })?;

        debug!(%cid, uid, "category purged from database");
        Ok(())
    }

    async fn categories_for_caller(
        &self,
        cids: &[CategoryId],
        _uid: u64,
    ) -> AppResult<Vec<Category>> {
        let db_cids = cids
            .iter()
            .map(|cid| to_db_id(cid.as_u64()))
            .collect::<AppResult<Vec<_>>>()?;
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT cid, name, description, parent_cid, sort_order, disabled
            FROM categories
            WHERE cid = ANY($1::BIGINT[])
            "#,
        )
        .bind(db_cids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load categories: {error}")))?;

        let mut categories = rows
            .into_iter()
            .map(CategoryRow::into_category)
            .collect::<AppResult<Vec<_>>>()?;
        categories.sort_by_key(|category| {
            cids.iter()
                .position(|cid| *cid == category.cid())
                .unwrap_or(usize::MAX)
        });

        Ok(categories)
    }
}
