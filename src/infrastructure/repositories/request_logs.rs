use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::RequestLogRepository;
use crate::domain::request_logs::{NewRequestLog, RequestLog};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlRequestLogRepository {
    pool: DatabasePool,
}

impl SqlRequestLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RequestLogRecord {
    id: i64,
    user_id: i64,
    provider: String,
    endpoint: String,
    status: String,
    duration_ms: i64,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl RequestLogRepository for SqlRequestLogRepository {
    async fn insert(&self, new_log: NewRequestLog) -> Result<(), RepositoryError> {
        query(
            r"INSERT INTO request_logs (user_id, provider, endpoint, status, duration_ms, created_at)
              VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(i64::from(new_log.user_id))
        .bind(&new_log.provider)
        .bind(&new_log.endpoint)
        .bind(&new_log.status)
        .bind(new_log.duration_ms)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(())
    }

    async fn list_recent(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<RequestLog>, RepositoryError> {
        let records = query_as::<_, RequestLogRecord>(
            r"SELECT id, user_id, provider, endpoint, status, duration_ms, created_at
              FROM request_logs WHERE user_id = ?
              ORDER BY created_at DESC LIMIT ?",
        )
        .bind(i64::from(user_id))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| RequestLog {
                id: r.id,
                user_id: UserId::from(r.user_id),
                provider: r.provider,
                endpoint: r.endpoint,
                status: r.status,
                duration_ms: r.duration_ms,
                created_at: r.created_at,
            })
            .collect())
    }
}
