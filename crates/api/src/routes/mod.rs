pub mod downloads;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                         list, create
/// /projects/{project_id}                            get, update, delete
/// /projects/{project_id}/releases                   list, create
/// /projects/{project_id}/releases/{release_id}      get, update, delete
/// .../releases/{release_id}/pages                   list, create
/// .../releases/{release_id}/pages/{page_id}         get, update, delete
/// .../releases/{release_id}/pages/{page_id}/data    raw image
/// .../releases/{release_id}/archive                 get, create, delete
/// .../releases/{release_id}/archive/data            zip bundle
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/projects", project::router())
}
