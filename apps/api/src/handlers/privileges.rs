use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use agora_application::PrivilegeChangeInput;
use agora_core::CallerContext;
use agora_domain::PrivilegeNames;

use crate::dto::{MemberPrivilegeRequest, PrivilegeChangeRequest, PrivilegeListingResponse};
use crate::error::ApiResult;
use crate::state::AppState;


/// Lists privileges for `admin`, `0` (global) or a category id.
pub async fn get_privileges_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(scope): Path<String>,
) -> ApiResult<Json<PrivilegeListingResponse>> {
    let listing = state
        .category_service
        .get_privileges(&caller, scope.as_str())
        .await?;

    Ok(Json(PrivilegeListingResponse::from(listing)))
}

/// Grants (`set: true`) or rescinds one or more privileges for a user or group.
pub async fn set_privilege_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(scope): Path<String>,
    Json(payload): Json<PrivilegeChangeRequest>,
) -> ApiResult<StatusCode> {
    state
        .category_service
        .set_privilege(
            &caller,
            PrivilegeChangeInput {
                scope,
                privilege: payload.privilege.into(),
                member: payload.member,
                set: payload.set,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Grants the privilege named in the path to the body `member`.
pub async fn give_privilege_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((scope, privilege)): Path<(String, String)>,
    Json(payload): Json<MemberPrivilegeRequest>,
) -> ApiResult<StatusCode> {
    change_single_privilege(&state, &caller, scope, privilege, payload.member, true).await
}

/// Rescinds the privilege named in the path from the body `member`.
pub async fn rescind_privilege_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((scope, privilege)): Path<(String, String)>,
    Json(payload): Json<MemberPrivilegeRequest>,
) -> ApiResult<StatusCode> {
    change_single_privilege(&state, &caller, scope, privilege, payload.member, false).await
}

async fn change_single_privilege(
    state: &AppState,
    caller: &CallerContext,
    scope: String,
    privilege: String,
    member: String,
    set: bool,
) -> ApiResult<StatusCode> {
    state
        .category_service
        .set_privilege(
            caller,
            PrivilegeChangeInput {
                scope,
                privilege: PrivilegeNames::One(privilege),
                member,
                set,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
