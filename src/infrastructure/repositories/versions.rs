use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::ids::{ProjectId, VersionId};
use crate::domain::projects::{CoverVersion, MAX_VERSIONS_PER_PROJECT, NewCoverVersion};
use crate::domain::repositories::VersionRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlVersionRepository {
    pool: DatabasePool,
}

impl SqlVersionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: VersionRecord) -> CoverVersion {
        CoverVersion {
            id: VersionId::from(record.id),
            project_id: ProjectId::from(record.project_id),
            version_number: record.version_number.max(0) as u32,
            image_url: record.image_url,
            thumbnail_url: record.thumbnail_url,
            source_image_url: record.source_image_url,
            prompt: record.prompt,
            provider_task_id: record.provider_task_id,
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VersionRecord {
    id: i64,
    project_id: i64,
    version_number: i64,
    image_url: String,
    thumbnail_url: Option<String>,
    source_image_url: Option<String>,
    prompt: Option<String>,
    provider_task_id: Option<String>,
    created_at: DateTime<Utc>,
}

const VERSION_COLUMNS: &str = "id, project_id, version_number, image_url, thumbnail_url, \
                               source_image_url, prompt, provider_task_id, created_at";

#[async_trait]
impl VersionRepository for SqlVersionRepository {
    async fn insert(&self, new_version: NewCoverVersion) -> Result<CoverVersion, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        // Number assignment and the cap check happen inside the transaction
        // so concurrent saves cannot produce duplicate version numbers.
        let max_number: i64 = query_scalar(
            r"SELECT COALESCE(MAX(version_number), 0) FROM cover_versions WHERE project_id = ?",
        )
        .bind(i64::from(new_version.project_id))
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let count: i64 =
            query_scalar(r"SELECT COUNT(*) FROM cover_versions WHERE project_id = ?")
                .bind(i64::from(new_version.project_id))
                .fetch_one(&mut *tx)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if count >= i64::from(MAX_VERSIONS_PER_PROJECT) {
            return Err(RepositoryError::validation(format!(
                "project already holds the maximum of {MAX_VERSIONS_PER_PROJECT} versions"
            )));
        }

        let record = query_as::<_, VersionRecord>(&format!(
            r"INSERT INTO cover_versions
                  (project_id, version_number, image_url, thumbnail_url, source_image_url,
                   prompt, provider_task_id, created_at)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?)
              RETURNING {VERSION_COLUMNS}"
        ))
        .bind(i64::from(new_version.project_id))
        .bind(max_number + 1)
        .bind(&new_version.image_url)
        .bind(new_version.thumbnail_url.as_deref())
        .bind(new_version.source_image_url.as_deref())
        .bind(new_version.prompt.as_deref())
        .bind(new_version.provider_task_id.as_deref())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if err.to_string().contains("FOREIGN KEY constraint failed") {
                return RepositoryError::NotFound;
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(Self::into_domain(record))
    }

    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<CoverVersion>, RepositoryError> {
        let records = query_as::<_, VersionRecord>(&format!(
            r"SELECT {VERSION_COLUMNS} FROM cover_versions
              WHERE project_id = ? ORDER BY version_number DESC"
        ))
        .bind(i64::from(project_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Self::into_domain).collect())
    }

    async fn count_for_project(&self, project_id: ProjectId) -> Result<u32, RepositoryError> {
        let count: i64 = query_scalar(r"SELECT COUNT(*) FROM cover_versions WHERE project_id = ?")
            .bind(i64::from(project_id))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(count.max(0) as u32)
    }

    async fn delete(&self, project_id: ProjectId, id: VersionId) -> Result<(), RepositoryError> {
        let result = query(r"DELETE FROM cover_versions WHERE id = ? AND project_id = ?")
            .bind(i64::from(id))
            .bind(i64::from(project_id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
