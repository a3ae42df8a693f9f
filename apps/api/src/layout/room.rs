//! Room composition: elements expand into seats, rooms concatenate their
//! elements, and placements move a whole room template onto the canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::coordinate::{normalize_degrees, Coordinate, RotationCoordinate};
use crate::layout::error::LayoutError;
use crate::layout::sequence::{expand, Repeat};

pub const MIN_OUTLINE_POINTS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Element
// ────────────────────────────────────────────────────────────────────────────

/// An anchor plus the repeats rooted there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub base: RotationCoordinate,
    #[serde(default)]
    pub repeats: Vec<Repeat>,
}

impl Element {
    pub fn new(base: RotationCoordinate) -> Self {
        Element {
            base,
            repeats: Vec::new(),
        }
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeats.push(repeat);
        self
    }

    /// The anchor followed by each repeat's expansion, in declaration order.
    /// Every repeat expands independently from the same anchor.
    pub fn generate_points(&self) -> Vec<RotationCoordinate> {
        let mut points = Vec::with_capacity(self.point_count());
        points.push(self.base);
        for repeat in &self.repeats {
            points.extend(expand(self.base, repeat));
        }
        points
    }

    pub fn point_count(&self) -> usize {
        1 + self
            .repeats
            .iter()
            .map(|r| r.num as usize)
            .sum::<usize>()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Room
// ────────────────────────────────────────────────────────────────────────────

/// A reusable layout template: outline polygon plus elements.
///
/// The outline is only used for rendering and hit-testing, never for
/// collision. Construction (including deserialization) rejects outlines with
/// fewer than three points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoomSpec", into = "RoomSpec")]
pub struct Room {
    name: String,
    outline: Vec<Coordinate>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoomSpec {
    name: String,
    outline: Vec<Coordinate>,
    #[serde(default)]
    elements: Vec<Element>,
}

impl TryFrom<RoomSpec> for Room {
    type Error = LayoutError;

    fn try_from(spec: RoomSpec) -> Result<Self, Self::Error> {
        Room::new(spec.name, spec.outline, spec.elements)
    }
}

impl From<Room> for RoomSpec {
    fn from(room: Room) -> Self {
        RoomSpec {
            name: room.name,
            outline: room.outline,
            elements: room.elements,
        }
    }
}

impl Room {
    pub fn new(
        name: impl Into<String>,
        outline: Vec<Coordinate>,
        elements: Vec<Element>,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        if outline.len() < MIN_OUTLINE_POINTS {
            return Err(LayoutError::MalformedOutline {
                room: name,
                points: outline.len(),
            });
        }
        Ok(Room {
            name,
            outline,
            elements,
        })
    }

    /// Axis-aligned rectangle outline centred on the room origin.
    pub fn rectangle(
        name: impl Into<String>,
        width: f64,
        height: f64,
        elements: Vec<Element>,
    ) -> Self {
        let half = Coordinate::new(width / 2.0, height / 2.0);
        let outline = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .into_iter()
            .map(|(x, y)| Coordinate::new(x, y).multiply_componentwise(half))
            .collect();
        Room {
            name: name.into(),
            outline,
            elements,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outline(&self) -> &[Coordinate] {
        &self.outline
    }

    /// All seats of all elements, in element declaration order.
    pub fn generate_seats(&self) -> Vec<RotationCoordinate> {
        self.elements
            .iter()
            .flat_map(Element::generate_points)
            .collect()
    }

    pub fn seat_count(&self) -> usize {
        self.elements.iter().map(Element::point_count).sum()
    }

    /// Even-odd ray cast against the outline, in room-local coordinates.
    pub fn contains(&self, point: Coordinate) -> bool {
        let mut inside = false;
        let n = self.outline.len();
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.outline[i], self.outline[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RoomPlacement
// ────────────────────────────────────────────────────────────────────────────

/// One drawn instance of a room template.
///
/// The placement names its template instead of owning a copy, so an edit to
/// the template shows up in every placement of it. The owning registry
/// (`FloorPlan`) resolves the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPlacement {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub room: String,
    pub coord: RotationCoordinate,
}

impl RoomPlacement {
    pub fn new(room: impl Into<String>, coord: RotationCoordinate) -> Self {
        RoomPlacement {
            id: Uuid::new_v4(),
            room: room.into(),
            coord,
        }
    }

    /// Every seat of `room`, rotated about the origin by the placement's
    /// rotation and then translated by its position.
    pub fn resolve(&self, room: &Room) -> Vec<RotationCoordinate> {
        resolve_placement(room, self.coord)
    }

    /// The room outline in canvas coordinates.
    pub fn resolve_outline(&self, room: &Room) -> Vec<Coordinate> {
        room.outline()
            .iter()
            .map(|p| p.rotate(self.coord.rotation).add(self.coord.position()))
            .collect()
    }

    /// Whether a canvas point falls inside this placement's outline. The
    /// point is taken back into room-local coordinates first.
    pub fn contains(&self, room: &Room, point: Coordinate) -> bool {
        let local = (point - self.coord.position()).rotate(-self.coord.rotation);
        room.contains(local)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.coord.x += dx;
        self.coord.y += dy;
    }

    /// Turns the placement about its own anchor; rotation stays in [0, 360).
    pub fn rotate_by(&mut self, degrees: f64) {
        self.coord.rotation = normalize_degrees(self.coord.rotation + degrees);
    }
}

pub fn resolve_placement(room: &Room, coord: RotationCoordinate) -> Vec<RotationCoordinate> {
    room.generate_seats()
        .into_iter()
        .map(|seat| coord.transform(seat))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
