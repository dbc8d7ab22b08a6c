//! Integration tests for the bug status audit log.

use sqlx::PgPool;
use qalab_db::models::bug::{ChangeBugStatus, CreateBug};
use qalab_db::models::experiment::CreateExperiment;
use qalab_db::models::team::CreateTeam;
use qalab_db::models::user::CreateUser;
use qalab_db::repositories::{BugRepo, ExperimentRepo, TeamRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_team_and_user(pool: &PgPool) -> (i64, i64) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role: "student".to_string(),
        },
    )
    .await
    .unwrap();
    let now = chrono::Utc::now();
    let experiment = ExperimentRepo::create(
        pool,
        &CreateExperiment {
            title: "Spring".to_string(),
            description: None,
            methodology: "Agile Methodology".to_string(),
            start_date: now,
            end_date: now,
        },
    )
    .await
    .unwrap();
    let team = TeamRepo::create(
        pool,
        &CreateTeam {
            name: "Alpha".to_string(),
            experiment_id: experiment.id,
        },
    )
    .await
    .unwrap();
    (team.id, user.id)
}

fn new_bug(team_id: i64) -> CreateBug {
    CreateBug {
        title: "Login button unresponsive".to_string(),
        description: "Nothing happens on click".to_string(),
        reproduction_steps: vec!["Open login".to_string(), "Click".to_string()],
        screenshots: vec!["https://files.lab.test/login.png".to_string()],
        severity: None,
        team_id,
    }
}

fn status(s: &str) -> ChangeBugStatus {
    ChangeBugStatus {
        status: s.to_string(),
        comment: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn new_bug_starts_open_with_one_entry(pool: PgPool) {
    let (team_id, user_id) = seed_team_and_user(&pool).await;
    let bug = BugRepo::create(&pool, user_id, &new_bug(team_id)).await.unwrap();

    assert_eq!(bug.current_status, "open");
    assert_eq!(bug.severity, "medium");
    assert_eq!(bug.screenshots.len(), 1);

    let history = BugRepo::history(&pool, bug.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "open");
    assert_eq!(history[0].changed_by, user_id);
}

#[sqlx::test(migrations = "./migrations")]
async fn transitions_are_appended_in_order(pool: PgPool) {
    let (team_id, user_id) = seed_team_and_user(&pool).await;
    let bug = BugRepo::create(&pool, user_id, &new_bug(team_id)).await.unwrap();

    BugRepo::change_status(&pool, bug.id, user_id, &status("in review"))
        .await
        .unwrap()
        .unwrap();
    let resolved = BugRepo::change_status(&pool, bug.id, user_id, &status("resolved"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.current_status, "resolved");

    let history = BugRepo::history(&pool, bug.id).await.unwrap();
    let statuses: Vec<&str> = history.iter().map(|h| h.status.as_str()).collect();
    assert_eq!(statuses, vec!["open", "in review", "resolved"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn unchanged_status_adds_no_entry(pool: PgPool) {
    let (team_id, user_id) = seed_team_and_user(&pool).await;
    let bug = BugRepo::create(&pool, user_id, &new_bug(team_id)).await.unwrap();

    BugRepo::change_status(&pool, bug.id, user_id, &status("open"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(BugRepo::history(&pool, bug.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn change_status_of_missing_bug_returns_none(pool: PgPool) {
    let (_, user_id) = seed_team_and_user(&pool).await;
    let result = BugRepo::change_status(&pool, 999_999, user_id, &status("closed"))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn history_rows_cannot_be_rewritten(pool: PgPool) {
    let (team_id, user_id) = seed_team_and_user(&pool).await;
    let bug = BugRepo::create(&pool, user_id, &new_bug(team_id)).await.unwrap();

    let update = sqlx::query("UPDATE bug_status_history SET status = 'closed' WHERE bug_id = $1")
        .bind(bug.id)
        .execute(&pool)
        .await;
    assert!(update.is_err(), "UPDATE on the audit log must be rejected");

    let delete = sqlx::query("DELETE FROM bug_status_history WHERE bug_id = $1")
        .bind(bug.id)
        .execute(&pool)
        .await;
    assert!(delete.is_err(), "DELETE on the audit log must be rejected");

    assert_eq!(BugRepo::history(&pool, bug.id).await.unwrap()[0].status, "open");
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_a_team_cascades_to_bugs_and_history(pool: PgPool) {
    let (team_id, user_id) = seed_team_and_user(&pool).await;
    let bug = BugRepo::create(&pool, user_id, &new_bug(team_id)).await.unwrap();

    assert!(TeamRepo::delete(&pool, team_id).await.unwrap());
    assert!(!BugRepo::exists(&pool, bug.id).await.unwrap());
    assert!(BugRepo::history(&pool, bug.id).await.unwrap().is_empty());
}
