//! Handlers for releases, scoped under `/projects/{project_id}/releases`.
//!
//! Status is a free-form draft/released field: any transition is accepted.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use ims_core::error::CoreError;
use ims_core::naming::{validate_chapter, validate_version};
use ims_core::types::DbId;
use ims_db::models::release::{Release, ReleaseFields, ReleaseInput};
use ims_db::models::CascadeSummary;
use ims_db::repositories::ReleaseRepo;

use super::{ensure_project, ensure_release, validate};
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::query::ListParams;
use crate::response::Created;
use crate::state::AppState;

/// Validate client input and stamp the release date.
fn to_fields(project_id: DbId, input: ReleaseInput) -> AppResult<ReleaseFields> {
    validate(validate_chapter(&input.chapter))?;
    let version = validate_version(input.version).map_err(CoreError::Validation)?;
    Ok(ReleaseFields {
        project_id,
        chapter: input.chapter,
        version,
        status: input.status,
        released_on: Utc::now(),
    })
}

/// GET /api/projects/{project_id}/releases
pub async fn list_by_project(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<DbId>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<Json<Vec<Release>>> {
    ensure_project(&state.pool, project_id).await?;
    let releases = ReleaseRepo::list_by_project(&state.pool, project_id, params.order).await?;
    Ok(Json(releases))
}

/// POST /api/projects/{project_id}/releases
pub async fn create(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<ReleaseInput>,
) -> AppResult<Created<Release>> {
    ensure_project(&state.pool, project_id).await?;
    let fields = to_fields(project_id, input)?;

    let release = ReleaseRepo::create(&state.pool, &fields)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        })?;

    tracing::info!(
        project_id,
        release_id = release.id,
        chapter = %release.chapter,
        version = release.version,
        "Release created"
    );
    Ok(Created::new(
        format!("/api/projects/{project_id}/releases/{}", release.id),
        release,
    ))
}

/// GET /api/projects/{project_id}/releases/{release_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Json<Release>> {
    let release = ensure_release(&state.pool, project_id, release_id).await?;
    Ok(Json(release))
}

/// PUT /api/projects/{project_id}/releases/{release_id}
///
/// Full replace; `releasedOn` is refreshed to the time of the update.
pub async fn update(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<ReleaseInput>,
) -> AppResult<Json<Release>> {
    ensure_project(&state.pool, project_id).await?;
    let fields = to_fields(project_id, input)?;

    let release = ReleaseRepo::update(&state.pool, release_id, &fields)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Release",
            id: release_id,
        })?;

    tracing::info!(project_id, release_id, status = %release.status, "Release updated");
    Ok(Json(release))
}

/// DELETE /api/projects/{project_id}/releases/{release_id}
///
/// Removes the release with its pages and archive.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Json<CascadeSummary>> {
    ensure_project(&state.pool, project_id).await?;
    let summary = ReleaseRepo::delete(&state.pool, project_id, release_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Release",
            id: release_id,
        })?;

    tracing::info!(
        project_id,
        release_id,
        pages = summary.pages,
        archives = summary.archives,
        "Release deleted"
    );
    Ok(Json(summary))
}
