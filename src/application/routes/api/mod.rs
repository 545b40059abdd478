pub(crate) mod gallery;
pub(crate) mod imports;
pub(crate) mod jobs;
pub(crate) mod projects;
pub(crate) mod tokens;
pub(crate) mod usage;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::application::state::AppState;

/// 10 MB ceiling for single gallery uploads.
const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// 50 MiB ceiling for batch import archives.
const IMPORT_LIMIT_BYTES: usize = 50 * 1024 * 1024;

pub(super) fn router() -> axum::Router<AppState> {
    project_routes()
        .merge(job_routes())
        .merge(gallery_routes())
        .merge(import_routes())
        .merge(token_routes())
}

fn project_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/slug/{slug}", get(projects::get_project_by_slug))
        .route(
            "/projects/{id}/versions",
            get(projects::list_versions).post(projects::create_version),
        )
        .route(
            "/projects/{id}/versions/{version_id}",
            axum::routing::delete(projects::delete_version),
        )
}

fn job_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/jobs/{id}", get(jobs::get_job))
}

fn gallery_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/gallery",
            get(gallery::list_images)
                .post(gallery::upload_image)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/gallery/{id}",
            get(gallery::get_image).delete(gallery::delete_image),
        )
}

fn import_routes() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/import",
        post(imports::import_archive).layer(DefaultBodyLimit::max(IMPORT_LIMIT_BYTES)),
    )
}

fn token_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/tokens",
            post(tokens::create_token).get(tokens::list_tokens),
        )
        .route("/tokens/{id}/revoke", post(tokens::revoke_token))
        .route("/usage/requests", get(usage::list_request_logs))
}
