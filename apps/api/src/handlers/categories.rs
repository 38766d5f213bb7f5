use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use agora_application::{CategoryUpdate, CreateCategoryInput};
use agora_core::{AppError, CallerContext};
use agora_domain::CategoryId;

use crate::dto::{
    CategoryResponse, CreateCategoryRequest, UpdateCategoriesRequest, UpdateCategoriesResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn get_category_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(cid): Path<String>,
) -> ApiResult<Json<CategoryResponse>> {
    let cid = cid.parse::<CategoryId>()?;

    state
        .category_service
        .get(&caller, cid)
        .await?
        .map(|category| Json(CategoryResponse::from(category)))
        .ok_or_else(|| AppError::NotFound(format!("category '{cid}' does not exist")).into())
}

pub async fn create_category_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let category = state
        .category_service
        .create(&caller, CreateCategoryInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

pub async fn update_categories_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(payload): Json<UpdateCategoriesRequest>,
) -> ApiResult<Json<UpdateCategoriesResponse>> {
    let updates = payload
        .categories
        .map(|entries| {
            entries
                .into_iter()
                .map(CategoryUpdate::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let updated = state
        .category_service
        .update(&caller, updates)
        .await?
        .into_iter()
        .map(|cid| cid.as_u64())
        .collect();

    Ok(Json(UpdateCategoriesResponse { updated }))
}

pub async fn delete_category_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(cid): Path<String>,
) -> ApiResult<StatusCode> {
    let cid = cid.parse::<CategoryId>()?;
    state.category_service.delete(&caller, cid).await?;

    Ok(StatusCode::NO_CONTENT)
}
