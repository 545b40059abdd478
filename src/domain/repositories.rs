use async_trait::async_trait;

use crate::domain::RepositoryError;
use crate::domain::gallery::{GalleryImage, GallerySortKey, NewGalleryImage};
use crate::domain::ids::{GalleryImageId, JobId, ProjectId, TokenId, UserId, VersionId};
use crate::domain::jobs::{JobOutcome, JobSortKey, NewThumbnailJob, ThumbnailJob};
use crate::domain::listing::{ListRequest, Page};
use crate::domain::projects::{
    CoverProject, CoverVersion, NewCoverProject, NewCoverVersion, ProjectSortKey,
    ProjectWithVersionCount, UpdateCoverProject,
};
use crate::domain::request_logs::{NewRequestLog, RequestLog};
use crate::domain::tokens::{NewToken, Token};
use crate::domain::users::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, new_user: NewUser) -> Result<User, RepositoryError>;
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;
    async fn exists(&self) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn insert(&self, new_token: NewToken) -> Result<Token, RepositoryError>;
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Token, RepositoryError>;
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Token>, RepositoryError>;
    async fn revoke(&self, user_id: UserId, id: TokenId) -> Result<(), RepositoryError>;
    async fn update_last_used(&self, id: TokenId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, new_project: NewCoverProject) -> Result<CoverProject, RepositoryError>;
    async fn get(&self, user_id: UserId, id: ProjectId) -> Result<CoverProject, RepositoryError>;
    async fn get_by_slug(&self, user_id: UserId, slug: &str)
    -> Result<CoverProject, RepositoryError>;
    async fn list(
        &self,
        user_id: UserId,
        request: &ListRequest<ProjectSortKey>,
        search: Option<&str>,
    ) -> Result<Page<ProjectWithVersionCount>, RepositoryError>;
    async fn update(
        &self,
        user_id: UserId,
        id: ProjectId,
        changes: UpdateCoverProject,
    ) -> Result<CoverProject, RepositoryError>;
    /// Bump `updated_at` after a version is added.
    async fn touch(&self, id: ProjectId) -> Result<(), RepositoryError>;
    async fn delete(&self, user_id: UserId, id: ProjectId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Insert a version, assigning the next sequential `version_number`
    /// inside the transaction. Fails with a validation error once the
    /// project holds `MAX_VERSIONS_PER_PROJECT` versions.
    async fn insert(&self, new_version: NewCoverVersion) -> Result<CoverVersion, RepositoryError>;
    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<CoverVersion>, RepositoryError>;
    async fn count_for_project(&self, project_id: ProjectId) -> Result<u32, RepositoryError>;
    async fn delete(&self, project_id: ProjectId, id: VersionId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, new_job: NewThumbnailJob) -> Result<ThumbnailJob, RepositoryError>;
    async fn get(&self, user_id: UserId, id: JobId) -> Result<ThumbnailJob, RepositoryError>;
    async fn complete(&self, id: JobId, outcome: JobOutcome)
    -> Result<ThumbnailJob, RepositoryError>;
    async fn list(
        &self,
        user_id: UserId,
        request: &ListRequest<JobSortKey>,
    ) -> Result<Page<ThumbnailJob>, RepositoryError>;
    /// Mark pending jobs older than `max_age` as failed. Returns the number
    /// of rows swept.
    async fn fail_stale(&self, max_age: std::time::Duration) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn insert(&self, new_image: NewGalleryImage) -> Result<GalleryImage, RepositoryError>;
    async fn get(&self, user_id: UserId, id: GalleryImageId)
    -> Result<GalleryImage, RepositoryError>;
    async fn get_by_checksum(
        &self,
        user_id: UserId,
        checksum: &str,
    ) -> Result<GalleryImage, RepositoryError>;
    async fn list(
        &self,
        user_id: UserId,
        request: &ListRequest<GallerySortKey>,
        search: Option<&str>,
    ) -> Result<Page<GalleryImage>, RepositoryError>;
    async fn delete(&self, user_id: UserId, id: GalleryImageId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    async fn insert(&self, new_log: NewRequestLog) -> Result<(), RepositoryError>;
    async fn list_recent(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<RequestLog>, RepositoryError>;
}
