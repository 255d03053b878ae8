//! Integration tests for public page downloads by name.

mod common;

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::{body_bytes, body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn page_is_served_by_release_key_and_name(pool: PgPool) {
    let project_id = common::create_project(&pool, "foo-slug").await;
    let release_id = common::create_release(&pool, project_id, "1").await;
    common::upload_page(&pool, project_id, release_id, "001").await;

    for path in ["/downloads/foo-slug-1.1/001.png", "/downloads/foo-slug-1.1/001.jpg"] {
        let response = get(common::build_test_app(pool.clone()), path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(response.headers()["content-type"], "image/png");
        assert_eq!(
            body_bytes(response).await,
            STANDARD.decode(common::PNG_BASE64).unwrap()
        );
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_release_or_page_returns_404(pool: PgPool) {
    let project_id = common::create_project(&pool, "foo-slug").await;
    let release_id = common::create_release(&pool, project_id, "1").await;
    common::upload_page(&pool, project_id, release_id, "001").await;

    for path in [
        "/downloads/foo-slug-1.1/999.png",
        "/downloads/foo-slug-1.2/001.png",
        "/downloads/bar-1.1/001.png",
    ] {
        let response = get(common::build_test_app(pool.clone()), path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_key_returns_400(pool: PgPool) {
    for path in ["/downloads/no-version/001.png", "/downloads/foo-1.1/noext"] {
        let response = get(common::build_test_app(pool.clone()), path).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}
