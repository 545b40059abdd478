use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::{ListQuery, record_request_log};
use crate::application::state::AppState;
use crate::domain::ids::JobId;
use crate::domain::jobs::{JobOutcome, JobSortKey, NewThumbnailJob, ThumbnailJob};
use crate::domain::listing::Page;
use crate::infrastructure::generation;

#[derive(Debug, Deserialize)]
pub(crate) struct NewJobSubmission {
    prompt: String,
    #[serde(default)]
    source_image_url: Option<String>,
}

/// Insert a pending job, call the workflow provider synchronously, then
/// record the outcome on the row. No retry; a provider failure is
/// surfaced as a 502 after the row is marked failed.
#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_job(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<NewJobSubmission>,
) -> Result<Response, ApiError> {
    let user_id = auth_user.user.id;

    let new_job = NewThumbnailJob {
        user_id,
        prompt: payload.prompt,
        source_image_url: payload.source_image_url,
    }
    .normalize();

    if new_job.prompt.is_empty() {
        return Err(AppError::validation("prompt must not be empty").into());
    }

    let job = state
        .job_repo
        .insert(new_job)
        .await
        .map_err(AppError::from)?;

    let started = Instant::now();
    let result = generation::run_workflow(
        &state.http_client,
        &state.workflow_url,
        &state.workflow_api_key,
        &state.workflow_id,
        &job.prompt,
        job.source_image_url.as_deref(),
    )
    .await;

    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    record_request_log(
        state.request_log_repo.clone(),
        user_id,
        generation::PROVIDER_NAME,
        "workflows/run",
        if result.is_ok() { "ok" } else { "error" },
        duration_ms,
    );

    match result {
        Ok(run) => {
            // run_workflow guarantees at least one output.
            let result_image_url = run.outputs[0].url.clone();
            let job = state
                .job_repo
                .complete(
                    job.id,
                    JobOutcome::Succeeded {
                        result_image_url,
                        provider_task_id: Some(run.task_id),
                    },
                )
                .await
                .map_err(AppError::from)?;

            info!(job_id = %job.id, "thumbnail job succeeded");
            Ok((StatusCode::CREATED, Json(job)).into_response())
        }
        Err(err) => {
            if let Err(mark_err) = state
                .job_repo
                .complete(
                    job.id,
                    JobOutcome::Failed {
                        error: err.to_string(),
                    },
                )
                .await
            {
                warn!(job_id = %job.id, error = %mark_err, "failed to mark job as failed");
            }
            Err(err.into())
        }
    }
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_job(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<JobId>,
) -> Result<Json<ThumbnailJob>, ApiError> {
    let job = state
        .job_repo
        .get(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(job))
}

#[tracing::instrument(skip(state, auth_user, query))]
pub(crate) async fn list_jobs(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<ThumbnailJob>>, ApiError> {
    let (request, _) = query.into_request_and_search::<JobSortKey>();
    let page = state
        .job_repo
        .list(auth_user.user.id, &request)
        .await
        .map_err(AppError::from)?;
    Ok(Json(page))
}
