//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::Json;
use ims_core::error::CoreError;
use ims_core::naming::{validate_project_name, validate_project_slug};
use ims_core::types::DbId;
use ims_db::models::project::{Project, ProjectInput, ProjectSummary};
use ims_db::models::CascadeSummary;
use ims_db::repositories::ProjectRepo;

use super::validate;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::query::ListParams;
use crate::response::Created;
use crate::state::AppState;

fn validate_input(input: &ProjectInput) -> AppResult<()> {
    validate(validate_project_name(&input.name))?;
    validate(validate_project_slug(&input.project_name))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<Created<Project>> {
    validate_input(&input)?;
    let project = ProjectRepo::create(&state.pool, &input).await?;

    tracing::info!(
        project_id = project.id,
        project_name = %project.project_name,
        "Project created"
    );
    Ok(Created::new(format!("/api/projects/{}", project.id), project))
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<Json<Vec<ProjectSummary>>> {
    let projects = ProjectRepo::list(&state.pool, params.order).await?;
    Ok(Json(projects.into_iter().map(ProjectSummary::from).collect()))
}

/// GET /api/projects/{project_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;
    Ok(Json(project))
}

/// PUT /api/projects/{project_id}
///
/// Full replace: omitted optional fields reset to their defaults.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<Json<Project>> {
    validate_input(&input)?;
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;

    tracing::info!(project_id = id, "Project updated");
    Ok(Json(project))
}

/// DELETE /api/projects/{project_id}
///
/// Removes the project with all of its releases, pages and archives.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<CascadeSummary>> {
    let summary = ProjectRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;

    tracing::info!(
        project_id = id,
        releases = summary.releases,
        pages = summary.pages,
        archives = summary.archives,
        "Project deleted"
    );
    Ok(Json(summary))
}
