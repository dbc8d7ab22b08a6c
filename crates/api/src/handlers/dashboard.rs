//! Handlers for the instructor and team dashboards.
//!
//! Both dashboards fold each team's most recent QA reports into a summary
//! and evaluate the alert thresholds from server configuration.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use qalab_core::dashboard::{
    evaluate_alerts, latest_reports_per_team, merge_recent_activity, summarize_overall,
    summarize_team, ActivityKind, Alert, OverallQaMetrics, RecentActivity, ReportSample,
    TeamSummary, REPORTS_PER_TEAM,
};
use qalab_core::error::CoreError;
use qalab_core::types::DbId;
use qalab_db::models::team::Team;
use qalab_db::repositories::{
    BugRepo, ExperimentRepo, QaReportRepo, TeamRepo, TestCaseRepo, UserRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Newest bugs and newest experiments pulled into the activity feed.
const RECENT_FEED_SIZE: i64 = 3;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct InstructorTotals {
    pub teams: i64,
    pub users: i64,
    pub experiments: i64,
    pub bugs: i64,
}

#[derive(Debug, Serialize)]
pub struct InstructorDashboard {
    pub totals: InstructorTotals,
    pub qa_metrics: OverallQaMetrics,
    pub team_summaries: Vec<TeamSummary>,
    pub alerts: Vec<Alert>,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Serialize)]
pub struct TeamTotals {
    pub members: usize,
    pub bugs: i64,
    pub test_cases: usize,
}

#[derive(Debug, Serialize)]
pub struct TeamDashboard {
    pub team: Team,
    pub totals: TeamTotals,
    pub qa_metrics: TeamSummary,
    pub alerts: Vec<Alert>,
}

// ---------------------------------------------------------------------------
// GET /dashboard/instructor
// ---------------------------------------------------------------------------

pub async fn instructor_dashboard(
    RequireInstructor(_user): RequireInstructor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let totals = InstructorTotals {
        teams: TeamRepo::count(pool).await?,
        users: UserRepo::count(pool).await?,
        experiments: ExperimentRepo::count(pool).await?,
        bugs: BugRepo::count(pool).await?,
    };

    let rows = QaReportRepo::latest_per_team(pool, REPORTS_PER_TEAM as i64).await?;
    let grouped = latest_reports_per_team(rows.into_iter().map(ReportSample::from));

    let qa_metrics = summarize_overall(grouped.values().flatten());

    let thresholds = state.config.alert_thresholds;
    let mut team_summaries = Vec::with_capacity(grouped.len());
    let mut alerts = Vec::new();
    for (team_name, reports) in &grouped {
        let summary = summarize_team(team_name, reports);
        alerts.extend(evaluate_alerts(&summary, &thresholds, Some(team_name.as_str())));
        team_summaries.push(summary);
    }

    let recent_bugs = BugRepo::list_recent(pool, RECENT_FEED_SIZE).await?;
    let recent_experiments = ExperimentRepo::list_recent(pool, RECENT_FEED_SIZE).await?;
    let recent_activity = merge_recent_activity(
        recent_bugs
            .into_iter()
            .map(|b| RecentActivity {
                kind: ActivityKind::Bug,
                title: b.title,
                team: b.team_name.unwrap_or_default(),
                created_at: b.created_at,
            })
            .chain(recent_experiments.into_iter().map(|e| RecentActivity {
                kind: ActivityKind::Experiment,
                title: e.title,
                team: String::new(),
                created_at: e.created_at,
            })),
    );

    Ok(Json(DataResponse {
        data: InstructorDashboard {
            totals,
            qa_metrics,
            team_summaries,
            alerts,
            recent_activity,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /dashboard/teams/{team_id}
// ---------------------------------------------------------------------------

/// Summary for one team. Students may only view a team they belong to.
pub async fn team_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let team = TeamRepo::find_by_id(&state.pool, team_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Team", team_id)))?;

    let dashboard = build_team_dashboard(&state, &auth, team).await?;
    Ok(Json(DataResponse { data: dashboard }))
}

// ---------------------------------------------------------------------------
// GET /dashboard/me
// ---------------------------------------------------------------------------

/// Summary for the caller's own team.
pub async fn my_team_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let team = TeamRepo::find_for_student(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Team",
                id: format!("for user {}", auth.user_id),
            })
        })?;

    let dashboard = build_team_dashboard(&state, &auth, team).await?;
    Ok(Json(DataResponse { data: dashboard }))
}

/// Refresh reports, then fold the team's recent reports.
///
/// A failed refresh is logged and the dashboard is served from the reports
/// already stored.
async fn build_team_dashboard(state: &AppState, auth: &AuthUser, team: Team) -> AppResult<TeamDashboard> {
    let pool = &state.pool;

    let member_ids = TeamRepo::member_ids(pool, team.id).await?;
    if !auth.is_instructor() && !member_ids.contains(&auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only view your own team's dashboard".into(),
        )));
    }

    if let Err(e) = state.aggregator.run().await {
        tracing::warn!(team_id = team.id, error = %e, "Report refresh failed, serving stored reports");
    }

    let reports: Vec<ReportSample> =
        QaReportRepo::latest_for_team(pool, &team.name, REPORTS_PER_TEAM as i64)
            .await?
            .into_iter()
            .map(ReportSample::from)
            .collect();
    let qa_metrics = summarize_team(&team.name, &reports);
    let alerts = evaluate_alerts(&qa_metrics, &state.config.alert_thresholds, None);

    let totals = TeamTotals {
        members: member_ids.len(),
        bugs: BugRepo::count_for_team(pool, team.id).await?,
        test_cases: TestCaseRepo::assigned_ids_for_team(pool, team.id).await?.len(),
    };

    Ok(TeamDashboard {
        team,
        totals,
        qa_metrics,
        alerts,
    })
}
