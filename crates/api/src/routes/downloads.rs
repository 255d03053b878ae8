//! Public download routes, mounted at `/downloads`.

use axum::routing::get;
use axum::Router;

use crate::handlers::downloads;
use crate::state::AppState;

/// ```text
/// GET /{release_key}/{page_file}   -> downloads::page
/// ```
///
/// `release_key` is `{projectName}-{chapter}.{version}`, `page_file` is
/// `{page}.{ext}`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{release_key}/{page_file}", get(downloads::page))
}
