use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::ListQuery;
use crate::application::state::AppState;
use crate::domain::ids::{JobId, ProjectId, VersionId};
use crate::domain::jobs::JobStatus;
use crate::domain::listing::Page;
use crate::domain::projects::{
    CoverProject, CoverVersion, NewCoverProject, NewCoverVersion, ProjectSortKey,
    ProjectWithVersionCount, UpdateCoverProject,
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewProjectSubmission {
    name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectDetail {
    #[serde(flatten)]
    project: CoverProject,
    versions: Vec<CoverVersion>,
}

#[tracing::instrument(skip(state, auth_user, query))]
pub(crate) async fn list_projects(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<ProjectWithVersionCount>>, ApiError> {
    let (request, search) = query.into_request_and_search::<ProjectSortKey>();
    let page = state
        .project_repo
        .list(auth_user.user.id, &request, search.as_deref())
        .await
        .map_err(AppError::from)?;
    Ok(Json(page))
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_project(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<NewProjectSubmission>,
) -> Result<Response, ApiError> {
    let new_project = NewCoverProject {
        user_id: auth_user.user.id,
        name: payload.name,
    }
    .normalize();

    let project = state
        .project_repo
        .insert(new_project)
        .await
        .map_err(AppError::from)?;

    info!(project_id = %project.id, slug = %project.slug, "project created");
    Ok((StatusCode::CREATED, Json(project)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_project(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let project = state
        .project_repo
        .get(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;
    let versions = state
        .version_repo
        .list_for_project(project.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ProjectDetail { project, versions }))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_project_by_slug(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let project = state
        .project_repo
        .get_by_slug(auth_user.user.id, &slug)
        .await
        .map_err(AppError::from)?;
    let versions = state
        .version_repo
        .list_for_project(project.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ProjectDetail { project, versions }))
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn update_project(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<ProjectId>,
    Json(payload): Json<UpdateCoverProject>,
) -> Result<Json<CoverProject>, ApiError> {
    let changes = payload.normalize();
    let project = state
        .project_repo
        .update(auth_user.user.id, id, changes)
        .await
        .map_err(AppError::from)?;

    info!(project_id = %project.id, slug = %project.slug, "project renamed");
    Ok(Json(project))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_project(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    state
        .project_repo
        .delete(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;

    info!(project_id = %id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_versions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<ProjectId>,
) -> Result<Json<Vec<CoverVersion>>, ApiError> {
    // Scope check before listing.
    let project = state
        .project_repo
        .get(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;
    let versions = state
        .version_repo
        .list_for_project(project.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(versions))
}

/// Save a version either from a finished job or from an explicit image URL.
#[derive(Debug, Deserialize)]
pub(crate) struct NewVersionSubmission {
    #[serde(default)]
    job_id: Option<JobId>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    source_image_url: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_version(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<ProjectId>,
    Json(payload): Json<NewVersionSubmission>,
) -> Result<Response, ApiError> {
    let user_id = auth_user.user.id;
    let project = state
        .project_repo
        .get(user_id, id)
        .await
        .map_err(AppError::from)?;

    let new_version = match payload.job_id {
        Some(job_id) => {
            let job = state.job_repo.get(user_id, job_id).await.map_err(AppError::from)?;
            if job.status != JobStatus::Succeeded {
                return Err(AppError::validation("job has no result to save").into());
            }
            let Some(image_url) = job.result_image_url else {
                return Err(AppError::validation("job has no result to save").into());
            };
            NewCoverVersion {
                project_id: project.id,
                image_url,
                thumbnail_url: payload.thumbnail_url,
                source_image_url: job.source_image_url,
                prompt: Some(job.prompt),
                provider_task_id: job.provider_task_id,
            }
        }
        None => {
            let Some(image_url) = payload.image_url.filter(|u| !u.trim().is_empty()) else {
                return Err(
                    AppError::validation("either job_id or image_url is required").into(),
                );
            };
            NewCoverVersion {
                project_id: project.id,
                image_url,
                thumbnail_url: payload.thumbnail_url,
                source_image_url: payload.source_image_url,
                prompt: payload.prompt,
                provider_task_id: None,
            }
        }
    };

    let version = state
        .version_repo
        .insert(new_version.normalize())
        .await
        .map_err(AppError::from)?;

    if let Err(err) = state.project_repo.touch(project.id).await {
        tracing::warn!(project_id = %project.id, error = %err, "failed to touch project");
    }

    info!(
        project_id = %project.id,
        version_id = %version.id,
        version_number = version.version_number,
        "version saved"
    );

    Ok((StatusCode::CREATED, Json(version)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_version(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((id, version_id)): Path<(ProjectId, VersionId)>,
) -> Result<StatusCode, ApiError> {
    let project = state
        .project_repo
        .get(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;

    state
        .version_repo
        .delete(project.id, version_id)
        .await
        .map_err(AppError::from)?;

    info!(project_id = %project.id, version_id = %version_id, "version deleted");
    Ok(StatusCode::NO_CONTENT)
}
