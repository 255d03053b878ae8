//! Handlers for pages, scoped under
//! `/projects/{project_id}/releases/{release_id}/pages`.

use axum::extract::State;
use axum::Json;
use ims_core::error::CoreError;
use ims_core::naming::validate_page_name;
use ims_core::page_image::decode_page_payload;
use ims_core::types::DbId;
use ims_db::models::page::{Page, PageFields, PageInput};
use ims_db::repositories::PageRepo;

use super::{ensure_release, validate};
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::response::{Binary, Created};
use crate::state::AppState;

/// Validate the name and decode the base64 image into row values.
fn to_fields(release_id: DbId, input: PageInput) -> AppResult<PageFields> {
    validate(validate_page_name(&input.name))?;
    let decoded = decode_page_payload(&input.data)?;
    Ok(PageFields::from_decoded(release_id, input.name, decoded))
}

/// GET /api/projects/{project_id}/releases/{release_id}/pages
///
/// Pages come back in upload order.
pub async fn list_by_release(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Json<Vec<Page>>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let pages = PageRepo::list_by_release(&state.pool, release_id).await?;
    Ok(Json(pages))
}

/// POST /api/projects/{project_id}/releases/{release_id}/pages
pub async fn create(
    State(state): State<AppState>,
    ApiPath((project_id, release_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<PageInput>,
) -> AppResult<Created<Page>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let fields = to_fields(release_id, input)?;

    let page = PageRepo::create(&state.pool, project_id, &fields)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Release",
            id: release_id,
        })?;

    tracing::info!(
        release_id,
        page_id = page.id,
        name = %page.name,
        size = page.size,
        "Page uploaded"
    );
    Ok(Created::new(
        format!(
            "/api/projects/{project_id}/releases/{release_id}/pages/{}",
            page.id
        ),
        page,
    ))
}

/// GET /api/projects/{project_id}/releases/{release_id}/pages/{page_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath((project_id, release_id, page_id)): ApiPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<Page>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let page = PageRepo::find_scoped(&state.pool, release_id, page_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Page",
            id: page_id,
        })?;
    Ok(Json(page))
}

/// PUT /api/projects/{project_id}/releases/{release_id}/pages/{page_id}
///
/// Replaces both the name and the image.
pub async fn update(
    State(state): State<AppState>,
    ApiPath((project_id, release_id, page_id)): ApiPath<(DbId, DbId, DbId)>,
    ApiJson(input): ApiJson<PageInput>,
) -> AppResult<Json<Page>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let fields = to_fields(release_id, input)?;

    let page = PageRepo::update(&state.pool, page_id, &fields)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Page",
            id: page_id,
        })?;

    tracing::info!(release_id, page_id, size = page.size, "Page replaced");
    Ok(Json(page))
}

/// DELETE /api/projects/{project_id}/releases/{release_id}/pages/{page_id}
///
/// Returns the removed page's metadata.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath((project_id, release_id, page_id)): ApiPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<Page>> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let page = PageRepo::find_scoped(&state.pool, release_id, page_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Page",
            id: page_id,
        })?;

    if !PageRepo::delete(&state.pool, release_id, page_id).await? {
        return Err(CoreError::NotFound {
            entity: "Page",
            id: page_id,
        }
        .into());
    }

    tracing::info!(release_id, page_id, "Page deleted");
    Ok(Json(page))
}

/// GET /api/projects/{project_id}/releases/{release_id}/pages/{page_id}/data
pub async fn data(
    State(state): State<AppState>,
    ApiPath((project_id, release_id, page_id)): ApiPath<(DbId, DbId, DbId)>,
) -> AppResult<Binary> {
    ensure_release(&state.pool, project_id, release_id).await?;
    let blob = PageRepo::find_blob(&state.pool, release_id, page_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Page",
            id: page_id,
        })?;

    Ok(Binary {
        content_type: blob.mime_type.as_str(),
        filename: None,
        bytes: blob.contents,
    })
}
