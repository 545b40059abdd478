use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::request_logs::RequestLog;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UsageQuery {
    limit: Option<u32>,
}

/// Recent external provider calls made on behalf of the caller.
#[tracing::instrument(skip(state, auth_user, query))]
pub(crate) async fn list_request_logs(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<UsageQuery>,
) -> Result<Json<Vec<RequestLog>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let logs = state
        .request_log_repo
        .list_recent(auth_user.user.id, limit)
        .await
        .map_err(AppError::from)?;
    Ok(Json(logs))
}
