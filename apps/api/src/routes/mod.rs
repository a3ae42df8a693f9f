pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::layout::handlers as layout;
use crate::settings::handlers as settings;
use crate::state::AppState;
use crate::teams::handlers as teams;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Settings API
        .route("/api/v1/settings", get(settings::handle_list_settings))
        .route(
            "/api/v1/settings/:key",
            get(settings::handle_get_setting).put(settings::handle_put_setting),
        )
        .route(
            "/api/v1/settings/:key/value",
            get(settings::handle_get_setting_value),
        )
        // Map API
        .route(
            "/api/v1/map",
            get(layout::handle_get_map).put(layout::handle_put_map),
        )
        .route("/api/v1/map/seats", get(layout::handle_get_seats))
        .route("/api/v1/map/hit", get(layout::handle_hit_test))
        .route(
            "/api/v1/map/rooms/:name",
            put(layout::handle_put_room).delete(layout::handle_delete_room),
        )
        .route(
            "/api/v1/map/placements",
            post(layout::handle_create_placement),
        )
        .route(
            "/api/v1/map/placements/:id",
            get(layout::handle_get_placement)
                .patch(layout::handle_patch_placement)
                .delete(layout::handle_delete_placement),
        )
        // Layout preview
        .route("/api/v1/layout/expand", post(layout::handle_expand))
        // Team area API
        .route(
            "/api/v1/teamarea",
            get(layout::handle_get_team_area).put(layout::handle_put_team_area),
        )
        .route(
            "/api/v1/teamarea/metrics",
            get(layout::handle_team_area_metrics),
        )
        .route(
            "/api/v1/teamarea/teams",
            post(layout::handle_register_teams).delete(layout::handle_reset_teams),
        )
        // Teams API
        .route("/api/v1/teams/bind", post(teams::handle_bind_teams))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
