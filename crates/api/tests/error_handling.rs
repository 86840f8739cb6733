//! Error envelope behaviour across endpoints.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{expect_json, get_auth, local_store, post_multipart_auth, PNG_BYTES};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let token = app.token(&pool).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/proveedores")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn not_found_envelope_names_the_entity(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let token = app.token(&pool).await;

    let response = get_auth(app.router(), "/api/proveedores/31337", &token).await;
    let json = expect_json(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Supplier with id 31337 not found");
    assert!(json.get("data").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validation_envelope_shape(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let token = app.token(&pool).await;

    let response = common::post_json_auth(
        app.router(),
        "/api/proveedores",
        serde_json::json!({}),
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "The given data was invalid.");
    assert_eq!(
        json["data"]["errors"]["commercial_name"][0],
        "The commercial_name field is required."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_numeric_id_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let token = app.token(&pool).await;

    let response = get_auth(app.router(), "/api/articulos/abc", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn body_over_upload_limit_is_413(pool: PgPool) {
    let app = common::build_test_app_with(
        pool.clone(),
        |config| config.max_upload_bytes = 1024,
        local_store,
    )
    .await;
    let token = app.token(&pool).await;

    let mut picture = PNG_BYTES.to_vec();
    picture.resize(4096, 0);
    let form = common::article_form("ART-BIG").file("images[]", "big.png", "image/png", &picture);
    let response = post_multipart_auth(app.router(), "/api/articulos", form, &token).await;
    let json = expect_json(response, StatusCode::PAYLOAD_TOO_LARGE).await;
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");

    let body = serde_json::json!({ "commercial_name": "x".repeat(4096) });
    let response = common::post_json_auth(app.router(), "/api/proveedores", body, &token).await;
    expect_json(response, StatusCode::PAYLOAD_TOO_LARGE).await;

    // Small bodies still pass through the same stack.
    let response = get_auth(app.router(), "/api/articulos", &token).await;
    expect_json(response, StatusCode::OK).await;
}
