use std::sync::Arc;

use crate::domain::repositories::{
    GalleryRepository, JobRepository, ProjectRepository, RequestLogRepository, TokenRepository,
    UserRepository, VersionRepository,
};
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::{
    SqlGalleryRepository, SqlJobRepository, SqlProjectRepository, SqlRequestLogRepository,
    SqlTokenRepository, SqlUserRepository, SqlVersionRepository,
};

/// Configuration for external services — everything that varies between
/// production and test environments. Repos are created automatically from
/// the database pool.
pub struct AppStateConfig {
    pub workflow_url: String,
    pub workflow_api_key: String,
    pub workflow_id: String,
    pub media_host_url: String,
    pub media_host_api_key: String,
}

#[derive(Clone)]
pub struct AppState {
    pub user_repo: Arc<dyn UserRepository>,
    pub token_repo: Arc<dyn TokenRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub version_repo: Arc<dyn VersionRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub gallery_repo: Arc<dyn GalleryRepository>,
    pub request_log_repo: Arc<dyn RequestLogRepository>,
    pub http_client: reqwest::Client,
    pub workflow_url: String,
    pub workflow_api_key: String,
    pub workflow_id: String,
    pub media_host_url: String,
    pub media_host_api_key: String,
    /// Bounds concurrent thumbnail encoding during batch imports.
    pub image_semaphore: Arc<tokio::sync::Semaphore>,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    /// Creates all repositories internally.
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(pool.clone()));
        let token_repo: Arc<dyn TokenRepository> = Arc::new(SqlTokenRepository::new(pool.clone()));
        let project_repo: Arc<dyn ProjectRepository> =
            Arc::new(SqlProjectRepository::new(pool.clone()));
        let version_repo: Arc<dyn VersionRepository> =
            Arc::new(SqlVersionRepository::new(pool.clone()));
        let job_repo: Arc<dyn JobRepository> = Arc::new(SqlJobRepository::new(pool.clone()));
        let gallery_repo: Arc<dyn GalleryRepository> =
            Arc::new(SqlGalleryRepository::new(pool.clone()));
        let request_log_repo: Arc<dyn RequestLogRepository> =
            Arc::new(SqlRequestLogRepository::new(pool));

        #[allow(clippy::expect_used)] // Startup: a broken TLS backend is unrecoverable
        let http_client = reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            user_repo,
            token_repo,
            project_repo,
            version_repo,
            job_repo,
            gallery_repo,
            request_log_repo,
            http_client,
            workflow_url: config.workflow_url,
            workflow_api_key: config.workflow_api_key,
            workflow_id: config.workflow_id,
            media_host_url: config.media_host_url,
            media_host_api_key: config.media_host_api_key,
            image_semaphore: Arc::new(tokio::sync::Semaphore::new(4)),
        }
    }
}
