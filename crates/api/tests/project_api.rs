//! HTTP-level integration tests for the `/api/projects` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_project_returns_201_with_location(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/projects",
        json!({"name": "Foo", "projectName": "foo-slug", "description": "A series", "status": "ongoing"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()["location"].to_str().unwrap().to_string();
    let json = body_json(response).await;
    let id = json["id"].as_i64().unwrap();
    assert_eq!(location, format!("/api/projects/{id}"));
    assert_eq!(json["name"], "Foo");
    assert_eq!(json["projectName"], "foo-slug");
    assert_eq!(json["description"], "A series");
    assert_eq!(json["status"], "ongoing");
    assert!(json["createdAt"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn read_returns_created_fields(pool: PgPool) {
    let created = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/projects",
            json!({"name": "Foo", "projectName": "foo", "status": "published"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = get(common::build_test_app(pool), &format!("/api/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_project_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/projects/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Project with id 999999 not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_numeric_id_returns_400(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/projects/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Validation and uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_name_or_slug_returns_409(pool: PgPool) {
    common::create_project(&pool, "foo").await;

    let same_slug = post_json(
        common::build_test_app(pool.clone()),
        "/api/projects",
        json!({"name": "Other", "projectName": "foo"}),
    )
    .await;
    assert_eq!(same_slug.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(same_slug).await["code"], "CONFLICT");

    let same_name = post_json(
        common::build_test_app(pool),
        "/api/projects",
        json!({"name": "Project foo", "projectName": "other"}),
    )
    .await;
    assert_eq!(same_name.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_input_returns_400(pool: PgPool) {
    let cases = [
        json!({"name": "Foo"}),
        json!({"name": "", "projectName": "foo"}),
        json!({"name": "Foo", "projectName": "has space"}),
        json!({"name": "Foo", "projectName": "foo", "status": "paused"}),
    ];
    for body in cases {
        let response =
            post_json(common::build_test_app(pool.clone()), "/api/projects", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_returns_summaries_in_requested_order(pool: PgPool) {
    let first = common::create_project(&pool, "first").await;
    let second = common::create_project(&pool, "second").await;

    let newest = body_json(get(common::build_test_app(pool.clone()), "/api/projects").await).await;
    let ids: Vec<_> = newest
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
    assert!(newest[0].get("description").is_none());
    assert_eq!(newest[0]["projectName"], "second");

    let oldest = body_json(
        get(common::build_test_app(pool.clone()), "/api/projects?order=oldest").await,
    )
    .await;
    assert_eq!(oldest[0]["id"], first);

    let ordering = body_json(
        get(common::build_test_app(pool.clone()), "/api/projects?ordering=oldest").await,
    )
    .await;
    assert_eq!(ordering[0]["id"], first);

    let bad = get(common::build_test_app(pool), "/api/projects?order=sideways").await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_replaces_all_fields(pool: PgPool) {
    let created = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/projects",
            json!({"name": "Foo", "projectName": "foo", "description": "old", "status": "published"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/projects/{id}"),
        json!({"name": "Bar", "projectName": "bar"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "Bar");
    assert_eq!(json["projectName"], "bar");
    assert_eq!(json["description"], "");
    assert_eq!(json["status"], "ongoing");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_missing_or_colliding_project(pool: PgPool) {
    common::create_project(&pool, "taken").await;
    let id = common::create_project(&pool, "mine").await;

    let missing = put_json(
        common::build_test_app(pool.clone()),
        "/api/projects/999999",
        json!({"name": "X", "projectName": "x"}),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let collision = put_json(
        common::build_test_app(pool),
        &format!("/api/projects/{id}"),
        json!({"name": "Mine", "projectName": "taken"}),
    )
    .await;
    assert_eq!(collision.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_returns_cascade_summary(pool: PgPool) {
    let project_id = common::create_project(&pool, "foo").await;
    let release_id = common::create_release(&pool, project_id, "1").await;
    common::create_release(&pool, project_id, "2").await;
    common::upload_page(&pool, project_id, release_id, "001").await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/projects/{project_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"releases": 2, "pages": 1, "archives": 0})
    );

    let again = delete(
        common::build_test_app(pool),
        &format!("/api/projects/{project_id}"),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
