use async_trait::async_trait;
use sqlx::PgPool;

use agora_application::{AuditEvent, AuditRepository};
use agora_core::{AppError, AppResult};

use crate::postgres_ids::to_db_id;

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let detail = serde_json::to_string(&event.detail).map_err(|error| {
            AppError::Internal(format!("failed to serialize audit detail: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                uid,
                ip,
                action,
                detail
            )
            VALUES ($1, $2, $3, $4::JSONB)
            "#,
        )
        .bind(to_db_id(event.uid)?)
        .bind(event.ip.map(|ip| ip.to_string()))
        .bind(event.action.as_str())
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}
