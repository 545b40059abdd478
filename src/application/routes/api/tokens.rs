use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::TokenId;
use crate::domain::tokens::{NewToken, Token};
use crate::infrastructure::auth::{generate_token, hash_token};

#[derive(Debug, Deserialize)]
pub(crate) struct NewTokenSubmission {
    name: String,
}

/// Response for token creation. The raw token appears here and nowhere
/// else; only its hash is stored.
#[derive(Debug, Serialize)]
pub(crate) struct CreatedToken {
    pub id: TokenId,
    pub name: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_token(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<NewTokenSubmission>,
) -> Result<Response, ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("token name must not be empty").into());
    }

    let raw_token = generate_token();
    let new_token = NewToken::new(auth_user.user.id, hash_token(&raw_token), name);

    let token = state
        .token_repo
        .insert(new_token)
        .await
        .map_err(AppError::from)?;

    info!(token_id = %token.id, name = %token.name, "api token created");

    let created = CreatedToken {
        id: token.id,
        name: token.name,
        token: raw_token,
        created_at: token.created_at,
    };
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_tokens(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Token>>, ApiError> {
    let tokens = state
        .token_repo
        .list_by_user(auth_user.user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(tokens))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn revoke_token(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<TokenId>,
) -> Result<StatusCode, ApiError> {
    state
        .token_repo
        .revoke(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;

    info!(token_id = %id, "api token revoked");
    Ok(StatusCode::NO_CONTENT)
}
