//! Route definitions for the `/projects` resource and everything owned by
//! a project (releases, pages, archive).

use axum::routing::get;
use axum::Router;

use crate::handlers::{archive, page, project, release};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                                  -> project::list
/// POST   /                                                  -> project::create
/// GET    /{project_id}                                      -> project::get_by_id
/// PUT    /{project_id}                                      -> project::update
/// DELETE /{project_id}                                      -> project::delete
///
/// GET    /{project_id}/releases                             -> release::list_by_project
/// POST   /{project_id}/releases                             -> release::create
/// GET    /{project_id}/releases/{release_id}                -> release::get_by_id
/// PUT    /{project_id}/releases/{release_id}                -> release::update
/// DELETE /{project_id}/releases/{release_id}                -> release::delete
///
/// GET    /{project_id}/releases/{release_id}/pages          -> page::list_by_release
/// POST   /{project_id}/releases/{release_id}/pages          -> page::create
/// GET    /{project_id}/releases/{release_id}/pages/{page_id}       -> page::get_by_id
/// PUT    /{project_id}/releases/{release_id}/pages/{page_id}       -> page::update
/// DELETE /{project_id}/releases/{release_id}/pages/{page_id}       -> page::delete
/// GET    /{project_id}/releases/{release_id}/pages/{page_id}/data  -> page::data
///
/// GET    /{project_id}/releases/{release_id}/archive        -> archive::get
/// POST   /{project_id}/releases/{release_id}/archive        -> archive::create
/// DELETE /{project_id}/releases/{release_id}/archive        -> archive::delete
/// GET    /{project_id}/releases/{release_id}/archive/data   -> archive::data
/// ```
pub fn router() -> Router<AppState> {
    let page_routes = Router::new()
        .route("/", get(page::list_by_release).post(page::create))
        .route(
            "/{page_id}",
            get(page::get_by_id).put(page::update).delete(page::delete),
        )
        .route("/{page_id}/data", get(page::data));

    let archive_routes = Router::new()
        .route(
            "/",
            get(archive::get).post(archive::create).delete(archive::delete),
        )
        .route("/data", get(archive::data));

    let release_routes = Router::new()
        .route("/", get(release::list_by_project).post(release::create))
        .route(
            "/{release_id}",
            get(release::get_by_id)
                .put(release::update)
                .delete(release::delete),
        )
        .nest("/{release_id}/pages", page_routes)
        .nest("/{release_id}/archive", archive_routes);

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{project_id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/releases", release_routes)
}
