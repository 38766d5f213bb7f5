use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use agora_application::{AuditDetail, AuditLogEntry, AuditLogQuery, AuditLogRepository};
use agora_core::{AppError, AppResult};
use agora_domain::AuditAction;

/// PostgreSQL-backed repository for audit log read models.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditLogRow {
    event_id: uuid::Uuid,
    uid: i64,
    ip: Option<String>,
    action: String,
    detail: String,
    created_at: String,
}

impl AuditLogRow {
    fn into_entry(self) -> AppResult<AuditLogEntry> {
        let action = self.action.parse::<AuditAction>()?;
        let detail = serde_json::from_str::<AuditDetail>(self.detail.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "stored audit detail for event '{}' is invalid: {error}",
                self.event_id
            ))
        })?;
        let uid = u64::try_from(self.uid).map_err(|_| {
            AppError::Internal(format!("stored audit uid '{}' is negative", self.uid))
        })?;

        Ok(AuditLogEntry {
            event_id: self.event_id.to_string(),
            uid,
            ip: self.ip,
            action,
            detail,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let capped_limit = query.limit.clamp(1, 200) as i64;
        let capped_offset = query.offset.min(5_000) as i64;
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                id AS event_id,
                uid,
                ip,
                action,
                detail::TEXT AS detail,
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
            FROM audit_log_entries
            WHERE ($1::TEXT IS NULL OR action = $1)
            ORDER BY audit_log_entries.created_at DESC, id
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(query.action.map(|action| action.as_str()))
        .bind(capped_limit)
        .bind(capped_offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list audit log entries: {error}"))
        })?;

        rows.into_iter().map(AuditLogRow::into_entry).collect()
    }
}
