//! Axum route handlers for the Map, Layout, and Team Area APIs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::coordinate::{normalize_degrees, Coordinate};
use crate::layout::floor_plan::ResolvedPlacement;
use crate::layout::room::{Element, Room, RoomPlacement};
use crate::layout::sequence::SequenceType;
use crate::layout::team_area::AreaLayout;
use crate::layout::{
    FloorPlan, RotationCoordinate, TeamArea, MAP_SETTING_KEY, TEAM_AREA_SETTING_KEY,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatsResponse {
    pub placements: Vec<ResolvedPlacement>,
    /// Every seat on the canvas, in binding order.
    pub seats: Vec<RotationCoordinate>,
    pub seat_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlacementRequest {
    pub room: String,
    #[serde(default)]
    pub coord: RotationCoordinate,
}

/// Drag/rotate gesture result. `coord` sets the transform outright; the
/// deltas are applied after it.
#[derive(Debug, Default, Deserialize)]
pub struct PlacementPatch {
    pub coord: Option<RotationCoordinate>,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    #[serde(default)]
    pub rotate: f64,
}

/// Canvas point to hit-test against placement outlines.
#[derive(Debug, Deserialize)]
pub struct HitQuery {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencePreview {
    #[serde(rename = "type")]
    pub kind: SequenceType,
    pub axis_name: &'static str,
    pub direction_name: &'static str,
    pub points: Vec<RotationCoordinate>,
}

#[derive(Debug, Serialize)]
pub struct ExpandResponse {
    /// Anchor followed by every sequence, as the element emits them.
    pub points: Vec<RotationCoordinate>,
    pub sequences: Vec<SequencePreview>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterTeamsRequest {
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLengthResponse {
    pub max_team_length: usize,
}

/// Deserializes a JSON body, reporting structural errors (negative counts,
/// short outlines) as validation errors.
fn parse_body<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::Validation(format!("Invalid {what}: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Map handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/map
pub async fn handle_get_map(State(state): State<AppState>) -> Json<FloorPlan> {
    Json(state.plan.read().await.clone())
}

/// PUT /api/v1/map
pub async fn handle_put_map(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<FloorPlan>, AppError> {
    state.apply_setting(MAP_SETTING_KEY, body).await?;
    Ok(Json(state.plan.read().await.clone()))
}

/// GET /api/v1/map/seats
pub async fn handle_get_seats(
    State(state): State<AppState>,
) -> Result<Json<SeatsResponse>, AppError> {
    let placements = state.plan.read().await.resolve_all()?;
    let seats: Vec<RotationCoordinate> = placements
        .iter()
        .flat_map(|p| p.seats.iter().copied())
        .collect();
    Ok(Json(SeatsResponse {
        seat_count: seats.len(),
        placements,
        seats,
    }))
}

/// GET /api/v1/map/hit?x=..&y=..
///
/// Placements under a canvas point, topmost first.
pub async fn handle_hit_test(
    State(state): State<AppState>,
    Query(query): Query<HitQuery>,
) -> Json<Vec<RoomPlacement>> {
    let plan = state.plan.read().await;
    let hits = plan
        .placements_at(Coordinate::new(query.x, query.y))
        .into_iter()
        .cloned()
        .collect();
    Json(hits)
}

/// PUT /api/v1/map/rooms/:name
pub async fn handle_put_room(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Room>, AppError> {
    let room: Room = parse_body(body, "room")?;
    if room.name() != name {
        return Err(AppError::Validation(format!(
            "Room name '{}' does not match path '{name}'",
            room.name()
        )));
    }

    let mut plan = state.plan.write().await;
    let replaced = plan.upsert_room(room.clone()).is_some();
    state.persist_plan(&plan).await?;
    info!(room = %name, replaced, seats = room.seat_count(), "Room template saved");
    Ok(Json(room))
}

/// DELETE /api/v1/map/rooms/:name
pub async fn handle_delete_room(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut plan = state.plan.write().await;
    plan.remove_room(&name)?;
    state.persist_plan(&plan).await?;
    info!(room = %name, "Room template removed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/map/placements
pub async fn handle_create_placement(
    State(state): State<AppState>,
    Json(request): Json<CreatePlacementRequest>,
) -> Result<(StatusCode, Json<RoomPlacement>), AppError> {
    let placement = RoomPlacement::new(request.room, request.coord);
    let mut plan = state.plan.write().await;
    plan.add_placement(placement.clone())?;
    state.persist_plan(&plan).await?;
    info!(id = %placement.id, room = %placement.room, "Placement added");
    Ok((StatusCode::CREATED, Json(placement)))
}

/// GET /api/v1/map/placements/:id
pub async fn handle_get_placement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResolvedPlacement>, AppError> {
    let plan = state.plan.read().await;
    let placement = plan
        .placement(id)
        .ok_or_else(|| AppError::NotFound(format!("Placement {id} not found")))?;
    Ok(Json(plan.resolve_placement(placement)?))
}

/// PATCH /api/v1/map/placements/:id
pub async fn handle_patch_placement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PlacementPatch>,
) -> Result<Json<ResolvedPlacement>, AppError> {
    let mut plan = state.plan.write().await;
    let placement = plan
        .placement_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("Placement {id} not found")))?;

    if let Some(coord) = patch.coord {
        placement.coord = RotationCoordinate {
            rotation: normalize_degrees(coord.rotation),
            ..coord
        };
    }
    placement.translate(patch.dx, patch.dy);
    placement.rotate_by(patch.rotate);

    let placement = placement.clone();
    let resolved = plan.resolve_placement(&placement)?;
    state.persist_plan(&plan).await?;
    Ok(Json(resolved))
}

/// DELETE /api/v1/map/placements/:id
pub async fn handle_delete_placement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut plan = state.plan.write().await;
    plan.remove_placement(id)
        .ok_or_else(|| AppError::NotFound(format!("Placement {id} not found")))?;
    state.persist_plan(&plan).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Layout preview
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout/expand
///
/// Expands a single element without touching the floor plan, for editor previews.
pub async fn handle_expand(Json(body): Json<Value>) -> Result<Json<ExpandResponse>, AppError> {
    let element: Element = parse_body(body, "element")?;
    let sequences = element
        .repeats
        .iter()
        .map(|r| SequencePreview {
            kind: r.kind,
            axis_name: r.axis_name(),
            direction_name: r.direction_name(),
            points: r.expand(element.base),
        })
        .collect();

    Ok(Json(ExpandResponse {
        points: element.generate_points(),
        sequences,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Team area handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/teamarea
pub async fn handle_get_team_area(State(state): State<AppState>) -> Json<TeamArea> {
    Json(state.team_area.read().await.clone())
}

/// PUT /api/v1/teamarea
///
/// Replaces the parameters; the registered label maximum is kept.
pub async fn handle_put_team_area(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<TeamArea>, AppError> {
    state.apply_setting(TEAM_AREA_SETTING_KEY, body).await?;
    Ok(Json(state.team_area.read().await.clone()))
}

/// GET /api/v1/teamarea/metrics
pub async fn handle_team_area_metrics(State(state): State<AppState>) -> Json<AreaLayout> {
    let layout = state.team_area.read().await.layout();
    if layout.degenerate_seats {
        warn!(
            seats = layout.seats.len(),
            table_width = layout.table.width,
            "Seat row does not fit the table; seats collapsed to zero width"
        );
    }
    Json(layout)
}

/// POST /api/v1/teamarea/teams
pub async fn handle_register_teams(
    State(state): State<AppState>,
    Json(request): Json<RegisterTeamsRequest>,
) -> Result<Json<TeamLengthResponse>, AppError> {
    let mut area = state.team_area.write().await;
    area.register_team_ids(request.labels.iter().map(String::as_str));
    state.persist_team_area(&area).await?;
    Ok(Json(TeamLengthResponse {
        max_team_length: area.max_team_length,
    }))
}

/// DELETE /api/v1/teamarea/teams
pub async fn handle_reset_teams(
    State(state): State<AppState>,
) -> Result<Json<TeamLengthResponse>, AppError> {
    let mut area = state.team_area.write().await;
    area.reset_team_length();
    state.persist_team_area(&area).await?;
    info!("Team label maximum reset");
    Ok(Json(TeamLengthResponse { max_team_length: 0 }))
}
