//! Handlers for the single archive of a release, at
//! `/projects/{project_id}/releases/{release_id}/archive`.
//!
//! Creating an archive bundles the requested pages, in request order, into
//! a stored (uncompressed) zip. A release holds at most one archive; it must
//! be deleted before another can be built.

use std::collections::{HashMap, HashSet};

use axum::extract::State;
use axum::Json;
use ims_core::archive::{build_archive, ArchiveEntry};
use ims_core::error::CoreError;
use ims_core::naming::{archive_filename, page_entry_names};
use ims_core::types::DbId;
use ims_db::models::archive::{Archive, ArchiveFields, CreateArchive};
use ims_db::models::page::PageBlob;
use ims_db::repositories::{ArchiveRepo, PageRepo, ReleaseRepo};

use super::{ensure_project, ensure_release};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::response::{Binary, Created};
use crate::state::AppState;

/// Reject empty and duplicated page id lists.
fn check_page_ids(page_ids: &[DbId]) -> AppResult<()> {
    if page_ids.is_empty() {
        return Err(CoreError::Validation("pageIds must not be empty".to_string()).into());
    }
    let mut seen = HashSet::with_capacity(page_ids.len());
    if let Some(dup) = page_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(CoreError::Validation(format!("Page {dup} is listed more than once")).into());
    }
    Ok(())
}

/// Order loaded blobs as requested. Any id missing from `blobs` belongs to
/// another release (or does not exist) and fails the whole request.
fn order_blobs(page_ids: &[DbId], blobs: Vec<PageBlob>) -> AppResult<Vec<PageBlob>> {
    let mut by_id: HashMap<DbId, PageBlob> = blobs.into_iter().map(|b| (b.id, b)).collect();
    page_ids
        .iter()
        .map(|id| {
            by_id.remove(id).ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Page {id} does not belong to this release"
                )))
            })
        })
        .collect()
}

/// GET /api/projects/{project_id}/releases/{release_id}/archive
pub async fn get(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Json<Archive>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let archive = ArchiveRepo::find_by_release(&state.pool, release_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Archive",
            id: release_id,
        })?;
    Ok(Json(archive))
}

/// POST /api/projects/{project_id}/releases/{release_id}/archive
pub async fn create(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<CreateArchive>,
) -> AppResult<Created<Archive>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    check_page_ids(&input.page_ids)?;

    if ArchiveRepo::find_by_release(&state.pool, release_id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!(
            "Release {release_id} already has an archive; delete it first"
        ))
        .into());
    }

    let blobs = PageRepo::find_blobs(&state.pool, release_id, &input.page_ids).await?;
    let blobs = order_blobs(&input.page_ids, blobs)?;

    let names = page_entry_names(
        blobs
            .iter()
            .map(|b| (b.name.as_str(), b.mime_type.extension())),
    );
    let entries: Vec<ArchiveEntry<'_>> = blobs
        .iter()
        .zip(&names)
        .map(|(blob, name)| ArchiveEntry {
            name,
            bytes: &blob.contents,
        })
        .collect();
    let built = build_archive(&entries)?;

    let fields = ArchiveFields {
        release_id,
        page_ids: input.page_ids,
        size: built.content_size,
        bundle_size: built.bundle_size(),
        checksum: built.checksum,
        contents: built.bytes,
    };
    let archive = ArchiveRepo::create(&state.pool, project_id, &fields)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Release",
            id: release_id,
        })?;

    tracing::info!(
        release_id,
        archive_id = archive.id,
        pages = archive.page_ids.len(),
        bundle_size = archive.bundle_size,
        "Archive built"
    );
    Ok(Created::new(
        format!("/api/projects/{project_id}/releases/{release_id}/archive"),
        archive,
    ))
}

/// DELETE /api/projects/{project_id}/releases/{release_id}/archive
pub async fn delete(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Json<Archive>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let archive = ArchiveRepo::find_by_release(&state.pool, release_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Archive",
            id: release_id,
        })?;

    if !ArchiveRepo::delete_by_release(&state.pool, release_id).await? {
        return Err(CoreError::NotFound {
            entity: "Archive",
            id: release_id,
        }
        .into());
    }

    tracing::info!(release_id, archive_id = archive.id, "Archive deleted");
    Ok(Json(archive))
}

/// GET /api/projects/{project_id}/releases/{release_id}/archive/data
///
/// Served as `{projectName}-{chapter}.{version}.zip`.
pub async fn data(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Binary> {
    let project = ensure_project(&state.pool, project_id).await?;
    let release = ReleaseRepo::find_scoped(&state.pool, project_id, release_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Release",
            id: release_id,
        })?;
    let bytes = ArchiveRepo::find_contents(&state.pool, release_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Archive",
            id: release_id,
        })?;

    Ok(Binary {
        content_type: "application/zip",
        filename: Some(archive_filename(
            &project.project_name,
            &release.chapter,
            release.version,
        )),
        bytes,
    })
}
