use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::errors::AppError;
use crate::application::state::AppState;
use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::projects::{
    CoverProject, MAX_VERSIONS_PER_PROJECT, NewCoverProject, NewCoverVersion,
};
use crate::domain::slug::slugify;
use crate::infrastructure::archive::{self, ArchiveEntry};
use crate::infrastructure::image_processing::{make_thumbnail, sniff_content_type};
use crate::infrastructure::media_host;

/// Outcome of one batch import run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub projects_created: u32,
    pub projects_updated: u32,
    pub versions_created: u32,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Import a ZIP archive of cover images: unpack, group entries by their
/// top-level folder, and append each image as a version of the matching
/// project (created on demand). Strictly sequential; one failed group
/// does not abort the rest.
pub async fn import_archive(
    state: &AppState,
    user_id: UserId,
    archive_bytes: &[u8],
) -> Result<ImportSummary, AppError> {
    let entries = archive::unpack(archive_bytes).map_err(|e| AppError::validation(e.to_string()))?;

    if entries.is_empty() {
        return Err(AppError::validation("archive contains no files"));
    }

    let mut summary = ImportSummary::default();

    // BTreeMap keeps group order deterministic.
    let mut groups: BTreeMap<String, Vec<ArchiveEntry>> = BTreeMap::new();
    for entry in entries {
        if sniff_content_type(&entry.bytes).is_none() {
            summary.skipped.push(SkippedEntry {
                name: entry.path.clone(),
                reason: "not a supported image type".to_string(),
            });
            continue;
        }
        groups.entry(entry.group_name().to_string()).or_default().push(entry);
    }

    for (group, files) in groups {
        match find_or_create_project(state, user_id, &group, &mut summary).await {
            Ok(project) => import_group_files(state, &project, &group, &files, &mut summary).await,
            Err(err) => {
                warn!(group, error = %err, "import group failed");
                skip_files(&mut summary, &files, &group, &err);
            }
        }
    }

    info!(
        projects_created = summary.projects_created,
        projects_updated = summary.projects_updated,
        versions_created = summary.versions_created,
        skipped = summary.skipped.len(),
        "batch import finished"
    );

    Ok(summary)
}

/// Import one folder's worth of images into a single project. A failed
/// upload stops the group: versions already written stay (and stay counted),
/// while the failing file and the remainder of the group are reported as
/// skipped.
async fn import_group_files(
    state: &AppState,
    project: &CoverProject,
    group: &str,
    files: &[ArchiveEntry],
    summary: &mut ImportSummary,
) {
    let mut version_count = match state.version_repo.count_for_project(project.id).await {
        Ok(count) => count,
        Err(err) => {
            warn!(group, error = %err, "import group failed");
            skip_files(summary, files, group, &AppError::from(err));
            return;
        }
    };

    for (index, file) in files.iter().enumerate() {
        // Check the cap before touching the media host, so capped files
        // never leave orphaned assets there.
        if version_count >= MAX_VERSIONS_PER_PROJECT {
            summary.skipped.push(SkippedEntry {
                name: file.path.clone(),
                reason: format!(
                    "project already holds the maximum of {MAX_VERSIONS_PER_PROJECT} versions"
                ),
            });
            continue;
        }

        match import_file(state, project, file).await {
            Ok(()) => {
                summary.versions_created += 1;
                version_count += 1;
            }
            Err(AppError::Validation(reason)) => {
                summary.skipped.push(SkippedEntry {
                    name: file.path.clone(),
                    reason,
                });
            }
            Err(err) => {
                warn!(group, file = %file.path, error = %err, "import group failed");
                skip_files(summary, &files[index..], group, &err);
                break;
            }
        }
    }

    if let Err(err) = state.project_repo.touch(project.id).await {
        warn!(project_id = %project.id, error = %err, "failed to touch project after import");
    }
}

fn skip_files(summary: &mut ImportSummary, files: &[ArchiveEntry], group: &str, err: &AppError) {
    for file in files {
        summary.skipped.push(SkippedEntry {
            name: file.path.clone(),
            reason: format!("group '{group}' failed: {err}"),
        });
    }
}

async fn import_file(
    state: &AppState,
    project: &CoverProject,
    file: &ArchiveEntry,
) -> Result<(), AppError> {
    let content_type = sniff_content_type(&file.bytes)
        .ok_or_else(|| AppError::validation("not a supported image type"))?;

    let hosted = media_host::upload_image(
        &state.http_client,
        &state.media_host_url,
        &state.media_host_api_key,
        &file.bytes,
        content_type,
        &format!("covers/{}", project.slug),
    )
    .await?;

    let thumbnail_url = match make_thumbnail_bounded(state, &file.bytes).await {
        Ok(thumb) => {
            match media_host::upload_image(
                &state.http_client,
                &state.media_host_url,
                &state.media_host_api_key,
                &thumb,
                "image/jpeg",
                &format!("covers/{}/thumbs", project.slug),
            )
            .await
            {
                Ok(hosted_thumb) => Some(hosted_thumb.url),
                Err(err) => {
                    warn!(file = %file.path, error = %err, "thumbnail upload failed");
                    None
                }
            }
        }
        Err(err) => {
            warn!(file = %file.path, error = %err, "thumbnail generation failed");
            None
        }
    };

    let new_version = NewCoverVersion {
        project_id: project.id,
        image_url: hosted.url,
        thumbnail_url,
        source_image_url: None,
        prompt: None,
        provider_task_id: None,
    };

    state
        .version_repo
        .insert(new_version)
        .await
        .map_err(AppError::from)?;

    Ok(())
}

/// Thumbnail encoding is CPU-bound, so run it on a blocking thread under
/// the shared semaphore.
async fn make_thumbnail_bounded(state: &AppState, bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let _permit = state
        .image_semaphore
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| AppError::unexpected(e.to_string()))?;

    let bytes = bytes.to_vec();
    tokio::task::spawn_blocking(move || make_thumbnail(&bytes))
        .await
        .map_err(|e| AppError::unexpected(e.to_string()))?
        .map_err(|e| AppError::unexpected(e.to_string()))
}

async fn find_or_create_project(
    state: &AppState,
    user_id: UserId,
    group: &str,
    summary: &mut ImportSummary,
) -> Result<CoverProject, AppError> {
    let slug = slugify(group);
    if slug.is_empty() {
        return Err(AppError::validation(format!(
            "folder name '{group}' produces an empty slug"
        )));
    }

    match state.project_repo.get_by_slug(user_id, &slug).await {
        Ok(project) => {
            summary.projects_updated += 1;
            Ok(project)
        }
        Err(RepositoryError::NotFound) => {
            let new_project = NewCoverProject {
                user_id,
                name: group.trim().to_string(),
            }
            .normalize();
            let project = state
                .project_repo
                .insert(new_project)
                .await
                .map_err(AppError::from)?;
            info!(project_id = %project.id, slug = %project.slug, "import created project");
            summary.projects_created += 1;
            Ok(project)
        }
        Err(err) => Err(AppError::from(err)),
    }
}
