use agora_core::{AppError, AppResult};
use agora_domain::{CategoryId, PrivilegeScope};

/// Converts an unsigned identifier into a `BIGINT` bind value.
pub(crate) fn to_db_id(value: u64) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("identifier '{value}' is out of range")))
}

/// Converts a stored `BIGINT` into a category identifier.
pub(crate) fn category_id_from_db(value: i64) -> AppResult<CategoryId> {
    let value = u64::try_from(value)
        .map_err(|_| AppError::Internal(format!("stored category id '{value}' is negative")))?;
    CategoryId::new(value)
}

/// Returns the `(scope_kind, cid)` key of a scope's grant rows.
pub(crate) fn scope_key(scope: PrivilegeScope) -> AppResult<(&'static str, i64)> {
    let cid = match scope.category_id() {
        Some(cid) => to_db_id(cid.as_u64())?,
        None => 0,
    };

    Ok((scope.kind(), cid))
}
