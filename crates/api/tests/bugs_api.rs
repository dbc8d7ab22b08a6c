//! HTTP-level tests for bug logging and the status audit log.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth, token_for};
use qalab_core::roles::ROLE_STUDENT;
use serde_json::json;
use sqlx::PgPool;

fn new_bug(team_id: i64) -> serde_json::Value {
    json!({
        "title": "Export button does nothing",
        "description": "Clicking export on the report page has no effect",
        "reproduction_steps": ["Open reports", "Click export"],
        "team_id": team_id,
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_changes_are_audited_in_order(pool: PgPool) {
    let student = common::create_student(&pool, "Cy").await;
    let team = common::create_team(&pool, "Beta").await;
    let token = token_for(student.id, ROLE_STUDENT);
    let app = common::build_test_app(pool);

    let response = post_json_auth(app.clone(), "/api/v1/bugs", new_bug(team.id), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let bug = body_json(response).await["data"].clone();
    assert_eq!(bug["current_status"], "open");
    assert_eq!(bug["severity"], "medium");
    assert_eq!(bug["reporter_id"], student.id);
    let bug_id = bug["id"].as_i64().unwrap();

    let status_uri = format!("/api/v1/bugs/{bug_id}/status");
    let response = put_json_auth(
        app.clone(),
        &status_uri,
        json!({ "status": "in review", "comment": "Looking into it" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = put_json_auth(app.clone(), &status_uri, json!({ "status": "resolved" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["current_status"], "resolved");

    let response = get_auth(app, &format!("/api/v1/bugs/{bug_id}/history"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let statuses: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["open", "in review", "resolved"]);
    assert_eq!(json["data"][1]["comment"], "Looking into it");
    assert_eq!(json["data"][1]["changed_by"], student.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_status_is_rejected(pool: PgPool) {
    let student = common::create_student(&pool, "Di").await;
    let team = common::create_team(&pool, "Beta").await;
    let token = token_for(student.id, ROLE_STUDENT);
    let app = common::build_test_app(pool);

    let response = post_json_auth(app.clone(), "/api/v1/bugs", new_bug(team.id), &token).await;
    let bug_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &format!("/api/v1/bugs/{bug_id}/status"),
        json!({ "status": "wontfix" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bug_without_reproduction_steps_is_rejected(pool: PgPool) {
    let student = common::create_student(&pool, "Ed").await;
    let team = common::create_team(&pool, "Beta").await;
    let token = token_for(student.id, ROLE_STUDENT);
    let app = common::build_test_app(pool);

    let mut body = new_bug(team.id);
    body["reproduction_steps"] = json!([]);
    let response = post_json_auth(app, "/api/v1/bugs", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_team_and_bug_are_404(pool: PgPool) {
    let student = common::create_student(&pool, "Flo").await;
    let token = token_for(student.id, ROLE_STUDENT);
    let app = common::build_test_app(pool);

    let response = post_json_auth(app.clone(), "/api/v1/bugs", new_bug(9_999), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/bugs/9999/status",
        json!({ "status": "closed" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/v1/bugs/9999/history", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
