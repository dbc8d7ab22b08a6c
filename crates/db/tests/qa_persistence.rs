//! Integration tests for snapshot and report persistence.

use chrono::{Duration, Utc};
use qalab_core::qa_metrics::{PerformanceSnapshot, QaReportDraft};
use qalab_db::models::experiment::CreateExperiment;
use qalab_db::models::team::CreateTeam;
use qalab_db::repositories::{ExperimentRepo, PerformanceMetricRepo, QaReportRepo, TeamRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_team(pool: &PgPool, name: &str) -> i64 {
    let now = Utc::now();
    let experiment = ExperimentRepo::create(
        pool,
        &CreateExperiment {
            title: format!("{name} experiment"),
            description: None,
            methodology: "Waterfall Methodology".to_string(),
            start_date: now - Duration::days(30),
            end_date: now,
        },
    )
    .await
    .unwrap();
    TeamRepo::create(
        pool,
        &CreateTeam {
            name: name.to_string(),
            experiment_id: experiment.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn snapshot(team_id: i64, coverage: f64) -> PerformanceSnapshot {
    PerformanceSnapshot {
        team_id,
        bugs_logged: 4,
        bugs_resolved_count: 3,
        avg_resolution_time_hours: 12.0,
        test_cases_executed: 3,
        test_pass_rate: 2.0 / 3.0,
        test_coverage: coverage,
        defect_density: 4000.0 / 3.0,
        recorded_at: Utc::now(),
    }
}

fn draft(team: &str, pass_rate: f64) -> QaReportDraft {
    let now = Utc::now();
    QaReportDraft {
        team_name: team.to_string(),
        period_start: now - Duration::days(30),
        period_end: now,
        tests_designed: 2,
        tests_executed: 3,
        test_coverage: 100.0,
        pass_count: 2,
        fail_count: 1,
        pass_rate,
        new_defects: 4,
        defects_closed: 3,
        defect_density: 4000.0 / 3.0,
        severity_critical: 1,
        severity_high: 0,
        severity_medium: 3,
        severity_low: 0,
        generated_at: now,
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn latest_snapshot_is_replaced_not_appended(pool: PgPool) {
    let team_id = seed_team(&pool, "Alpha").await;

    PerformanceMetricRepo::upsert_latest(&pool, &snapshot(team_id, 50.0)).await.unwrap();
    PerformanceMetricRepo::upsert_latest(&pool, &snapshot(team_id, 75.0)).await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performance_metrics_latest")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let latest = PerformanceMetricRepo::find_latest(&pool, team_id).await.unwrap().unwrap();
    assert_eq!(latest.test_coverage, 75.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn history_keeps_one_row_per_day(pool: PgPool) {
    let team_id = seed_team(&pool, "Alpha").await;

    PerformanceMetricRepo::upsert_history_for_day(&pool, &snapshot(team_id, 50.0)).await.unwrap();
    PerformanceMetricRepo::upsert_history_for_day(&pool, &snapshot(team_id, 60.0)).await.unwrap();

    let mut yesterday = snapshot(team_id, 40.0);
    yesterday.recorded_at = Utc::now() - Duration::days(1);
    PerformanceMetricRepo::upsert_history_for_day(&pool, &yesterday).await.unwrap();

    let history = PerformanceMetricRepo::history(&pool, team_id, None, None, 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].test_coverage, 60.0);
    assert_eq!(history[1].test_coverage, 40.0);

    let recent = PerformanceMetricRepo::history(
        &pool,
        team_id,
        Some(Utc::now() - Duration::hours(1)),
        None,
        50,
    )
    .await
    .unwrap();
    assert_eq!(recent.len(), 1);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn report_upsert_overwrites_by_team_name(pool: PgPool) {
    let first = QaReportRepo::upsert(&pool, &draft("Alpha", 50.0)).await.unwrap();
    let second = QaReportRepo::upsert(&pool, &draft("Alpha", 66.67)).await.unwrap();

    assert_eq!(first.id, second.id);
    let all = QaReportRepo::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].pass_rate, 66.67);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_except_removes_stale_teams(pool: PgPool) {
    QaReportRepo::upsert(&pool, &draft("Alpha", 80.0)).await.unwrap();
    QaReportRepo::upsert(&pool, &draft("Beta", 40.0)).await.unwrap();

    let removed = QaReportRepo::delete_except(&pool, &["Alpha".to_string()]).await.unwrap();
    assert_eq!(removed, 1);

    assert!(QaReportRepo::find_by_team_name(&pool, "Beta").await.unwrap().is_none());
    assert!(QaReportRepo::find_by_team_name(&pool, "Alpha").await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_except_with_no_teams_clears_everything(pool: PgPool) {
    QaReportRepo::upsert(&pool, &draft("Alpha", 80.0)).await.unwrap();
    let removed = QaReportRepo::delete_except(&pool, &[]).await.unwrap();
    assert_eq!(removed, 1);
    assert!(QaReportRepo::list_all(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn coverage_above_hundred_is_rejected_by_schema(pool: PgPool) {
    let mut bad = draft("Alpha", 50.0);
    bad.test_coverage = 150.0;
    assert!(QaReportRepo::upsert(&pool, &bad).await.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn team_names_are_unique(pool: PgPool) {
    let first = seed_team(&pool, "Alpha").await;

    let experiment = ExperimentRepo::create(
        &pool,
        &CreateExperiment {
            title: "Second cohort".to_string(),
            description: None,
            methodology: "Agile Methodology".to_string(),
            start_date: Utc::now() - Duration::days(7),
            end_date: Utc::now(),
        },
    )
    .await
    .unwrap();
    let err = TeamRepo::create(
        &pool,
        &CreateTeam {
            name: "Alpha".to_string(),
            experiment_id: experiment.id,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.constraint(), Some("uq_teams_name"));
    assert!(TeamRepo::find_by_id(&pool, first).await.unwrap().is_some());
}
