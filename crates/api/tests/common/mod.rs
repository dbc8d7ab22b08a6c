#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use qalab_api::auth::jwt::{generate_access_token, JwtConfig};
use qalab_api::config::{AggregationConfig, ServerConfig};
use qalab_api::router::build_app_router;
use qalab_api::state::AppState;
use qalab_core::dashboard::AlertThresholds;
use qalab_core::roles::{ROLE_INSTRUCTOR, ROLE_STUDENT};
use qalab_core::types::DbId;
use qalab_db::models::experiment::CreateExperiment;
use qalab_db::models::team::{CreateTeam, Team};
use qalab_db::models::test_case::{CreateTestCase, TestCase};
use qalab_db::models::user::{CreateUser, User};
use qalab_db::repositories::{ExperimentRepo, TeamRepo, TestCaseRepo, UserRepo};

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-bytes".to_string(),
            access_token_expiry_mins: 15,
        },
        aggregation: AggregationConfig::default(),
        alert_thresholds: AlertThresholds::default(),
    }
}

/// Build the full application router on top of `pool`, with the same
/// middleware stack the binary uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

/// A valid bearer token for `user_id` with `role`.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should be served")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::put(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::delete(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body as raw text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@lab.test", name.to_lowercase()),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_instructor(pool: &PgPool) -> User {
    create_user(pool, "Instructor", ROLE_INSTRUCTOR).await
}

pub async fn create_student(pool: &PgPool, name: &str) -> User {
    create_user(pool, name, ROLE_STUDENT).await
}

/// An experiment running for the first two weeks of March 2026.
pub async fn create_team(pool: &PgPool, name: &str) -> Team {
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
    let experiment = ExperimentRepo::create(
        pool,
        &CreateExperiment {
            title: format!("{name} experiment"),
            description: None,
            methodology: "Agile Methodology".to_string(),
            start_date: start,
            end_date: start + Duration::days(14),
        },
    )
    .await
    .expect("experiment creation should succeed");

    TeamRepo::create(
        pool,
        &CreateTeam {
            name: name.to_string(),
            experiment_id: experiment.id,
        },
    )
    .await
    .expect("team creation should succeed")
}

pub async fn create_test_case(pool: &PgPool, author_id: DbId, team_ids: &[DbId]) -> TestCase {
    TestCaseRepo::create(
        pool,
        author_id,
        &CreateTestCase {
            title: "Login with valid credentials".to_string(),
            description: None,
            steps: vec!["Open login page".to_string(), "Submit form".to_string()],
            assigned_team_ids: team_ids.to_vec(),
        },
    )
    .await
    .expect("test case creation should succeed")
}
