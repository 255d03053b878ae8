//! Public page downloads addressed by name instead of id.

use axum::extract::State;
use ims_core::download_key::parse_page_download;
use ims_db::repositories::{PageRepo, ReleaseRepo};

use crate::error::{AppError, AppResult};
use crate::extract::ApiPath;
use crate::response::Binary;
use crate::state::AppState;

/// GET /downloads/{projectName}-{chapter}.{version}/{page}.{ext}
///
/// The page is matched by its exact file name first, then by the stem, so a
/// page stored as `001` is served for `001.png` and `001.jpg` alike.
pub async fn page(
    State(state): State<AppState>,
    ApiPath((release_key, page_file)): ApiPath<(String, String)>,
) -> AppResult<Binary> {
    let key = parse_page_download(&release_key, &page_file)?;

    let release =
        ReleaseRepo::find_by_key(&state.pool, &key.project_slug, &key.chapter, key.version)
            .await?
            .ok_or_else(|| not_found(format!("No release matches '{release_key}'")))?;

    let blob = PageRepo::find_blob_by_name(&state.pool, release.id, &key.page_stem, &key.page_file)
        .await?
        .ok_or_else(|| not_found(format!("No page '{page_file}' in '{release_key}'")))?;

    Ok(Binary {
        content_type: blob.mime_type.as_str(),
        filename: None,
        bytes: blob.contents,
    })
}

fn not_found(message: String) -> AppError {
    AppError::NotFound(message)
}
