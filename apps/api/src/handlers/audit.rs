use axum::Json;
use axum::extract::{Extension, Query, State};

use agora_application::AuditLogQuery;
use agora_core::CallerContext;

use crate::dto::{AuditLogEntryResponse, AuditLogQueryParams};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<AuditLogQueryParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .category_service
        .list_audit_log(&caller, AuditLogQuery::try_from(query)?)
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
