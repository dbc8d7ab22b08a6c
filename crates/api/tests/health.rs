//! Liveness endpoint and top-level routing.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, token_for};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_reports_database_reachable(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["aggregation_running"], false);
    assert!(json["version"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn api_requires_bearer_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/reports").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_with_unknown_role_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/reports", &token_for(1, "admin")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
