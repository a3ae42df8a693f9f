// Layout engine: coordinate algebra, sequence expansion, room composition,
// and team area metrics. Everything below `handlers` is pure and synchronous.

pub mod coordinate;
pub mod error;
pub mod floor_plan;
pub mod handlers;
pub mod room;
pub mod sequence;
pub mod team_area;

// Re-export the public API consumed by other modules (state, teams, handlers).
pub use coordinate::RotationCoordinate;
pub use error::LayoutError;
pub use floor_plan::{default_floor_plan, FloorPlan, MAP_SETTING_KEY};
pub use team_area::TeamArea;

/// Settings key the team area parameters are stored under.
pub const TEAM_AREA_SETTING_KEY: &str = "teamarea";
