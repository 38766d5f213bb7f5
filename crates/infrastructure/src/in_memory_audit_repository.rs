use agora_application::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
};
use agora_core::AppResult;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory append-only audit log.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let entry = AuditLogEntry {
            event_id: Uuid::new_v4().to_string(),
            uid: event.uid,
            ip: event.ip.map(|ip| ip.to_string()),
            action: event.action,
            detail: event.detail,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        self.entries.write().await.push(entry);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let capped_limit = query.limit.clamp(1, 200);
        let capped_offset = query.offset.min(5_000);

        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|entry| query.action.is_none_or(|action| entry.action == action))
            .skip(capped_offset)
            .take(capped_limit)
            .cloned()
            .collect())
    }
}
