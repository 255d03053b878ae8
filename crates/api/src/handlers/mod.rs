pub mod archive;
pub mod downloads;
pub mod page;
pub mod project;
pub mod release;

use ims_core::error::CoreError;
use ims_core::types::DbId;
use ims_db::models::project::Project;
use ims_db::models::release::Release;
use ims_db::repositories::{ProjectRepo, ReleaseRepo};
use ims_db::DbPool;

use crate::error::{AppError, AppResult};

/// Load a project or fail with 404.
pub(crate) async fn ensure_project(pool: &DbPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id).into())
}

/// Load a release under its project, failing with 404 for whichever
/// ancestor does not resolve.
pub(crate) async fn ensure_release(
    pool: &DbPool,
    project_id: DbId,
    release_id: DbId,
) -> AppResult<Release> {
    ensure_project(pool, project_id).await?;
    ReleaseRepo::find_scoped(pool, project_id, release_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Release", release_id).into())
}

/// Lift a field validator's message into a 400.
pub(crate) fn validate(result: Result<(), String>) -> AppResult<()> {
    result.map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}
