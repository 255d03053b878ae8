#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use ims_api::config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
use ims_api::router::build_app_router;
use ims_api::state::AppState;

/// 1x1 grayscale PNG, 68 bytes.
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
pub const PNG_SIZE: i64 = 68;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::delete(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::put(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a project named after its slug, returning its id.
pub async fn create_project(pool: &PgPool, slug: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/projects",
        json!({"name": format!("Project {slug}"), "projectName": slug}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create chapter `chapter` version 1 under a project, returning its id.
pub async fn create_release(pool: &PgPool, project_id: i64, chapter: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/projects/{project_id}/releases"),
        json!({"chapter": chapter, "version": 1, "status": "draft"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Upload the test PNG under `name`, returning the page id.
pub async fn upload_page(pool: &PgPool, project_id: i64, release_id: i64, name: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &pages_uri(project_id, release_id),
        json!({"name": name, "data": PNG_BASE64}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

pub fn release_uri(project_id: i64, release_id: i64) -> String {
    format!("/api/projects/{project_id}/releases/{release_id}")
}

pub fn pages_uri(project_id: i64, release_id: i64) -> String {
    format!("{}/pages", release_uri(project_id, release_id))
}

pub fn archive_uri(project_id: i64, release_id: i64) -> String {
    format!("{}/archive", release_uri(project_id, release_id))
}
