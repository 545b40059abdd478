use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::{JobId, UserId};
use crate::domain::jobs::{JobOutcome, JobSortKey, JobStatus, NewThumbnailJob, ThumbnailJob};
use crate::domain::listing::{ListRequest, Page};
use crate::domain::repositories::JobRepository;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::pagination::paginate;

#[derive(Clone)]
pub struct SqlJobRepository {
    pool: DatabasePool,
}

impl SqlJobRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: JobRecord) -> ThumbnailJob {
        ThumbnailJob {
            id: JobId::from(record.id),
            user_id: UserId::from(record.user_id),
            prompt: record.prompt,
            source_image_url: record.source_image_url,
            status: JobStatus::from_str(&record.status).unwrap_or(JobStatus::Failed),
            result_image_url: record.result_image_url,
            error: record.error,
            provider_task_id: record.provider_task_id,
            created_at: record.created_at,
            completed_at: record.completed_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct JobRecord {
    id: i64,
    user_id: i64,
    prompt: String,
    source_image_url: Option<String>,
    status: String,
    result_image_url: Option<String>,
    error: Option<String>,
    provider_task_id: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

const JOB_COLUMNS: &str = "id, user_id, prompt, source_image_url, status, result_image_url, \
                           error, provider_task_id, created_at, completed_at";

#[async_trait]
impl JobRepository for SqlJobRepository {
    async fn insert(&self, new_job: NewThumbnailJob) -> Result<ThumbnailJob, RepositoryError> {
        let record = query_as::<_, JobRecord>(&format!(
            r"INSERT INTO thumbnail_jobs (user_id, prompt, source_image_url, status, created_at)
              VALUES (?, ?, ?, ?, ?)
              RETURNING {JOB_COLUMNS}"
        ))
        .bind(i64::from(new_job.user_id))
        .bind(&new_job.prompt)
        .bind(new_job.source_image_url.as_deref())
        .bind(JobStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(Self::into_domain(record))
    }

    async fn get(&self, user_id: UserId, id: JobId) -> Result<ThumbnailJob, RepositoryError> {
        let record = query_as::<_, JobRecord>(&format!(
            r"SELECT {JOB_COLUMNS} FROM thumbnail_jobs WHERE id = ? AND user_id = ?"
        ))
        .bind(i64::from(id))
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn complete(
        &self,
        id: JobId,
        outcome: JobOutcome,
    ) -> Result<ThumbnailJob, RepositoryError> {
        let record = match outcome {
            JobOutcome::Succeeded {
                result_image_url,
                provider_task_id,
            } => {
                query_as::<_, JobRecord>(&format!(
                    r"UPDATE thumbnail_jobs
                      SET status = ?, result_image_url = ?, provider_task_id = ?, completed_at = ?
                      WHERE id = ? AND status = 'pending'
                      RETURNING {JOB_COLUMNS}"
                ))
                .bind(JobStatus::Succeeded.as_str())
                .bind(&result_image_url)
                .bind(provider_task_id.as_deref())
                .bind(Utc::now())
                .bind(i64::from(id))
                .fetch_optional(&self.pool)
                .await
            }
            JobOutcome::Failed { error } => {
                query_as::<_, JobRecord>(&format!(
                    r"UPDATE thumbnail_jobs
                      SET status = ?, error = ?, completed_at = ?
                      WHERE id = ? AND status = 'pending'
                      RETURNING {JOB_COLUMNS}"
                ))
                .bind(JobStatus::Failed.as_str())
                .bind(&error)
                .bind(Utc::now())
                .bind(i64::from(id))
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn list(
        &self,
        user_id: UserId,
        request: &ListRequest<JobSortKey>,
    ) -> Result<Page<ThumbnailJob>, RepositoryError> {
        let order_clause = format!("j.created_at {}", request.sort_direction().as_sql());

        let base_query = "SELECT j.id, j.user_id, j.prompt, j.source_image_url, j.status, \
             j.result_image_url, j.error, j.provider_task_id, j.created_at, j.completed_at \
             FROM thumbnail_jobs j";
        let count_query = "SELECT COUNT(*) FROM thumbnail_jobs j";

        paginate(
            &self.pool,
            request,
            base_query,
            count_query,
            &order_clause,
            Some(("j.user_id", i64::from(user_id))),
            None,
            Self::into_domain,
        )
        .await
    }

    async fn fail_stale(&self, max_age: std::time::Duration) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age)
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let result = query(
            r"UPDATE thumbnail_jobs
              SET status = 'failed', error = 'timed out waiting for workflow provider',
                  completed_at = ?
              WHERE status = 'pending' AND created_at < ?",
        )
        .bind(Utc::now())
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(result.rows_affected())
    }
}
