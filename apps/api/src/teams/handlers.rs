//! Axum route handlers for the Teams API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::teams::binding::{has_locations, BindingReport, Team};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub teams: Vec<Team>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindResponse {
    /// Whether the submitted teams already carried locations.
    pub had_locations: bool,
    pub max_team_length: usize,
    #[serde(flatten)]
    pub report: BindingReport,
}

/// POST /api/v1/teams/bind
///
/// Registers every label with the team area (font sizing), then binds the
/// teams to the floor plan's seats with the configured binder.
pub async fn handle_bind_teams(
    State(state): State<AppState>,
    Json(request): Json<BindRequest>,
) -> Result<Json<BindResponse>, AppError> {
    let had_locations = has_locations(&request.teams);
    let seats = state.plan.read().await.seats()?;

    let max_team_length = {
        let mut area = state.team_area.write().await;
        area.register_team_ids(request.teams.iter().map(|t| t.label.as_str()));
        state.persist_team_area(&area).await?;
        area.max_team_length
    };

    let report = state.binder.bind(request.teams, &seats);
    if !report.unseated.is_empty() {
        warn!(
            unseated = report.unseated.len(),
            seats = seats.len(),
            "More teams than seats"
        );
    }
    info!(
        seated = report.seated.len(),
        empty = report.empty_seats.len(),
        binder = %report.binder,
        "Teams bound to seats"
    );

    Ok(Json(BindResponse {
        had_locations,
        max_team_length,
        report,
    }))
}
