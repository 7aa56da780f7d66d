// service/audit_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    service::{error::ServiceError, transition::AuditEntry},
};

#[derive(Debug, Clone)]
pub struct AuditService {
    db_client: Arc<DBClient>,
}

impl AuditService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    // One row per update call; every non-empty delta contributed an
    // {old, new} pair keyed by field.
    pub async fn log_booking_update(
        &self,
        acting_user_id: Uuid,
        acting_user_name: &str,
        job_id: Uuid,
        entries: &[AuditEntry],
    ) -> Result<(), ServiceError> {
        if entries.is_empty() {
            return Ok(());
        }

        tracing::info!(
            "USER {} ({}) updated booking {} with {} changes",
            acting_user_id,
            acting_user_name,
            job_id,
            entries.len()
        );

        let changes = serde_json::to_value(entries)
            .map_err(|e| ServiceError::Notification(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, user_name, job_id, changes, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(acting_user_id)
        .bind(acting_user_name)
        .bind(job_id)
        .bind(changes)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }

    pub async fn get_audit_logs_for_job(
        &self,
        job_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, ServiceError> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, user_id, user_name, job_id, changes, created_at
            FROM audit_logs
            WHERE job_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(job_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_client.pool)
        .await?;

        Ok(logs)
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub job_id: Uuid,
    pub changes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
