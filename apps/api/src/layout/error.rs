use thiserror::Error;

/// Structurally invalid layout input.
///
/// Degenerate-but-renderable states (zero counts, zero separations, zero
/// radii, non-positive seat widths) are never errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("count must be non-negative, got {0}")]
    InvalidSequenceCount(i64),

    #[error("sequence count {num} exceeds the maximum of {max}")]
    SequenceCountTooLarge { num: i64, max: u32 },

    #[error("seat count {num} exceeds the maximum of {max}")]
    SeatCountTooLarge { num: i64, max: u32 },

    #[error("room '{room}' outline needs at least 3 points, got {points}")]
    MalformedOutline { room: String, points: usize },

    #[error("room '{0}' is not registered")]
    UnknownRoom(String),

    #[error("room '{0}' is already registered with a different layout")]
    DuplicateRoom(String),

    #[error("room '{room}' is still used by {placements} placement(s)")]
    RoomInUse { room: String, placements: usize },
}
