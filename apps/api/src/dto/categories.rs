use agora_application::{CategoryUpdate, CreateCategoryInput};
use agora_core::AppError;
use agora_domain::{Category, CategoryChanges, CategoryId};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for category creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-category-request.ts"
)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_cid: Option<u64>,
    #[serde(default)]
    pub order: Option<i64>,
}

/// One entry of a category update batch.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/category-update-request.ts"
)]
pub struct CategoryUpdateRequest {
    pub cid: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `0` moves the category to the root.
    #[serde(default)]
    pub parent_cid: Option<u64>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// Incoming payload for batch category updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-categories-request.ts"
)]
pub struct UpdateCategoriesRequest {
    #[serde(default)]
    pub categories: Option<Vec<CategoryUpdateRequest>>,
}

/// Ids modified by a batch update.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-categories-response.ts"
)]
pub struct UpdateCategoriesResponse {
    pub updated: Vec<u64>,
}

/// API representation of a category.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/category-response.ts"
)]
pub struct CategoryResponse {
    pub cid: u64,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub parent_cid: Option<u64>,
    pub order: i64,
    pub disabled: bool,
}

impl TryFrom<CreateCategoryRequest> for CreateCategoryInput {
    type Error = AppError;

    fn try_from(value: CreateCategoryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            description: value.description.unwrap_or_default(),
            parent_cid: value
                .parent_cid
                .filter(|parent| *parent != 0)
                .map(CategoryId::new)
                .transpose()?,
            order: value.order,
        })
    }
}

impl TryFrom<CategoryUpdateRequest> for CategoryUpdate {
    type Error = AppError;

    fn try_from(value: CategoryUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            cid: CategoryId::new(value.cid)?,
            changes: CategoryChanges {
                name: value.name,
                description: value.description,
                parent_cid: value.parent_cid,
                order: value.order,
                disabled: value.disabled,
            },
        })
    }
}

impl From<Category> for CategoryResponse {
    fn from(value: Category) -> Self {
        Self {
            cid: value.cid().as_u64(),
            name: value.name().as_str().to_owned(),
            description: value.description().to_owned(),
            slug: value.slug().to_owned(),
            parent_cid: value.parent_cid().map(|parent| parent.as_u64()),
            order: value.order(),
            disabled: value.disabled(),
        }
    }
}
