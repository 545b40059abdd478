use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::{ListQuery, record_request_log};
use crate::application::state::AppState;
use crate::domain::RepositoryError;
use crate::domain::gallery::{GalleryImage, GallerySortKey, ImageSource, NewGalleryImage};
use crate::domain::ids::GalleryImageId;
use crate::domain::listing::Page;
use crate::infrastructure::image_processing::inspect_image;
use crate::infrastructure::media_host;

/// Upload raw image bytes to the gallery. Uploads are deduplicated per
/// user on the checksum of the original bytes: a repeat upload returns
/// the existing row without touching the media host.
#[tracing::instrument(skip(state, auth_user, body))]
pub(crate) async fn upload_image(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    body: Bytes,
) -> Result<Response, ApiError> {
    let user_id = auth_user.user.id;

    if body.is_empty() {
        return Err(AppError::validation("request body is empty").into());
    }

    let info = inspect_image(&body).map_err(|e| AppError::validation(e.to_string()))?;

    let checksum = hex_digest(&body);
    match state.gallery_repo.get_by_checksum(user_id, &checksum).await {
        Ok(existing) => {
            info!(image_id = %existing.id, "duplicate upload, returning existing image");
            return Ok((StatusCode::OK, Json(existing)).into_response());
        }
        Err(RepositoryError::NotFound) => {}
        Err(err) => return Err(AppError::from(err).into()),
    }

    let started = Instant::now();
    let result = media_host::upload_image(
        &state.http_client,
        &state.media_host_url,
        &state.media_host_api_key,
        &body,
        info.content_type,
        "gallery",
    )
    .await;

    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    record_request_log(
        state.request_log_repo.clone(),
        user_id,
        media_host::PROVIDER_NAME,
        "images",
        if result.is_ok() { "ok" } else { "error" },
        duration_ms,
    );

    let hosted = result?;

    let new_image = NewGalleryImage {
        user_id,
        checksum,
        content_type: info.content_type.to_string(),
        byte_size: body.len() as i64,
        width: info.width,
        height: info.height,
        url: hosted.url,
        host_public_id: hosted.public_id,
        source: ImageSource::Uploaded,
    };

    let image = state
        .gallery_repo
        .insert(new_image)
        .await
        .map_err(AppError::from)?;

    info!(image_id = %image.id, content_type = %image.content_type, "gallery image uploaded");
    Ok((StatusCode::CREATED, Json(image)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_image(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<GalleryImageId>,
) -> Result<Json<GalleryImage>, ApiError> {
    let image = state
        .gallery_repo
        .get(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(image))
}

#[tracing::instrument(skip(state, auth_user, query))]
pub(crate) async fn list_images(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<GalleryImage>>, ApiError> {
    let (request, search) = query.into_request_and_search::<GallerySortKey>();
    let page = state
        .gallery_repo
        .list(auth_user.user.id, &request, search.as_deref())
        .await
        .map_err(AppError::from)?;
    Ok(Json(page))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_image(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<GalleryImageId>,
) -> Result<StatusCode, ApiError> {
    let user_id = auth_user.user.id;
    let image = state
        .gallery_repo
        .get(user_id, id)
        .await
        .map_err(AppError::from)?;

    state
        .gallery_repo
        .delete(user_id, id)
        .await
        .map_err(AppError::from)?;

    // Host-side deletion is best-effort; the local row is already gone.
    media_host::delete_image(
        &state.http_client,
        &state.media_host_url,
        &state.media_host_api_key,
        &image.host_public_id,
    )
    .await;

    info!(image_id = %id, "gallery image deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    crate::infrastructure::auth::hex_encode(&digest)
}
