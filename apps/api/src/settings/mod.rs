// Settings: JSON key/value configuration resources keyed by name.
// The "map" and "teamarea" keys back the live floor plan and team area.

pub mod handlers;
pub mod store;
