use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::services::batch_import::{self, ImportSummary};
use crate::application::state::AppState;

/// Accept a ZIP archive as the raw request body and run the batch
/// importer. The archive size is bounded by the route's body limit.
#[tracing::instrument(skip(state, auth_user, body))]
pub(crate) async fn import_archive(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    body: Bytes,
) -> Result<Response, ApiError> {
    if body.is_empty() {
        return Err(AppError::validation("request body is empty").into());
    }

    let summary: ImportSummary =
        batch_import::import_archive(&state, auth_user.user.id, &body).await?;

    Ok(Json(summary).into_response())
}
