//! Floor plan: the room template registry plus the placements drawn from it.
//!
//! Stored as the `"map"` setting. The serialized form lists templates under
//! `rooms` and lets each placement either name a template or carry one inline
//! (older maps embed the room in every placement); inline rooms are
//! registered as templates on load.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::coordinate::{Coordinate, RotationCoordinate};
use crate::layout::error::LayoutError;
use crate::layout::room::{Element, Room, RoomPlacement};
use crate::layout::sequence::{Repeat, SequenceAxis, SequenceDirection};

/// Settings key the floor plan is stored under.
pub const MAP_SETTING_KEY: &str = "map";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FloorPlanSpec", into = "FloorPlanSpec")]
pub struct FloorPlan {
    rooms: Vec<Room>,
    placements: Vec<RoomPlacement>,
}

/// A placement after expansion, in canvas coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPlacement {
    pub id: Uuid,
    pub room: String,
    pub coord: RotationCoordinate,
    pub outline: Vec<Coordinate>,
    pub seats: Vec<RotationCoordinate>,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire form
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FloorPlanSpec {
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    placements: Vec<PlacementSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlacementSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    room: RoomRef,
    #[serde(default)]
    coord: RotationCoordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RoomRef {
    Named(String),
    Inline(Room),
}

impl TryFrom<FloorPlanSpec> for FloorPlan {
    type Error = LayoutError;

    fn try_from(spec: FloorPlanSpec) -> Result<Self, Self::Error> {
        let mut plan = FloorPlan::new();
        for room in spec.rooms {
            plan.register_room(room)?;
        }
        for placement in spec.placements {
            let name = match placement.room {
                RoomRef::Named(name) => name,
                RoomRef::Inline(room) => {
                    let name = room.name().to_string();
                    plan.register_room(room)?;
                    name
                }
            };
            plan.add_placement(RoomPlacement {
                id: placement.id.unwrap_or_else(Uuid::new_v4),
                room: name,
                coord: placement.coord,
            })?;
        }
        Ok(plan)
    }
}

impl From<FloorPlan> for FloorPlanSpec {
    fn from(plan: FloorPlan) -> Self {
        FloorPlanSpec {
            rooms: plan.rooms,
            placements: plan
                .placements
                .into_iter()
                .map(|p| PlacementSpec {
                    id: Some(p.id),
                    room: RoomRef::Named(p.room),
                    coord: p.coord,
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry operations
// ────────────────────────────────────────────────────────────────────────────

impl FloorPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name() == name)
    }

    pub fn placements(&self) -> &[RoomPlacement] {
        &self.placements
    }

    pub fn placement(&self, id: Uuid) -> Option<&RoomPlacement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn placement_mut(&mut self, id: Uuid) -> Option<&mut RoomPlacement> {
        self.placements.iter_mut().find(|p| p.id == id)
    }

    /// Adds a template on load. The same name twice is accepted only when
    /// both definitions are identical.
    fn register_room(&mut self, room: Room) -> Result<(), LayoutError> {
        match self.room(room.name()) {
            Some(existing) if *existing == room => Ok(()),
            Some(_) => Err(LayoutError::DuplicateRoom(room.name().to_string())),
            None => {
                self.rooms.push(room);
                Ok(())
            }
        }
    }

    /// Inserts or replaces a template; every placement naming it picks up
    /// the change. Returns the replaced template, if any.
    pub fn upsert_room(&mut self, room: Room) -> Option<Room> {
        match self.rooms.iter_mut().find(|r| r.name() == room.name()) {
            Some(slot) => Some(std::mem::replace(slot, room)),
            None => {
                self.rooms.push(room);
                None
            }
        }
    }

    /// Removes a template that no placement uses.
    pub fn remove_room(&mut self, name: &str) -> Result<Room, LayoutError> {
        let in_use = self.placements.iter().filter(|p| p.room == name).count();
        if in_use > 0 {
            return Err(LayoutError::RoomInUse {
                room: name.to_string(),
                placements: in_use,
            });
        }
        let idx = self
            .rooms
            .iter()
            .position(|r| r.name() == name)
            .ok_or_else(|| LayoutError::UnknownRoom(name.to_string()))?;
        Ok(self.rooms.remove(idx))
    }

    pub fn add_placement(&mut self, placement: RoomPlacement) -> Result<Uuid, LayoutError> {
        if self.room(&placement.room).is_none() {
            return Err(LayoutError::UnknownRoom(placement.room));
        }
        let id = placement.id;
        self.placements.push(placement);
        Ok(id)
    }

    pub fn remove_placement(&mut self, id: Uuid) -> Option<RoomPlacement> {
        let idx = self.placements.iter().position(|p| p.id == id)?;
        Some(self.placements.remove(idx))
    }

    // ── derived geometry ────────────────────────────────────────────────────

    pub fn resolve_placement(
        &self,
        placement: &RoomPlacement,
    ) -> Result<ResolvedPlacement, LayoutError> {
        let room = self
            .room(&placement.room)
            .ok_or_else(|| LayoutError::UnknownRoom(placement.room.clone()))?;
        Ok(ResolvedPlacement {
            id: placement.id,
            room: placement.room.clone(),
            coord: placement.coord,
            outline: placement.resolve_outline(room),
            seats: placement.resolve(room),
        })
    }

    /// Every placement resolved, in placement order.
    pub fn resolve_all(&self) -> Result<Vec<ResolvedPlacement>, LayoutError> {
        self.placements
            .iter()
            .map(|p| self.resolve_placement(p))
            .collect()
    }

    /// All seats on the canvas as one ordered list (placement order, then
    /// seat order within the room). This is the list teams are bound to.
    pub fn seats(&self) -> Result<Vec<RotationCoordinate>, LayoutError> {
        Ok(self
            .resolve_all()?
            .into_iter()
            .flat_map(|p| p.seats)
            .collect())
    }

    /// Placements whose outline contains the canvas point, topmost (last
    /// drawn) first.
    pub fn placements_at(&self, point: Coordinate) -> Vec<&RoomPlacement> {
        self.placements
            .iter()
            .rev()
            .filter(|p| self.room(&p.room).is_some_and(|room| p.contains(room, point)))
            .collect()
    }

    pub fn seat_count(&self) -> usize {
        self.placements
            .iter()
            .filter_map(|p| self.room(&p.room))
            .map(Room::seat_count)
            .sum()
    }
}

/// The demo map a fresh installation starts with.
pub fn default_floor_plan() -> FloorPlan {
    let main = Room::rectangle(
        "Main room",
        200.0,
        200.0,
        vec![
            Element::new(RotationCoordinate::new(0.0, 0.0, 0.0))
                .with_repeat(Repeat {
                    equivalent_spaced: true,
                    ..Repeat::line(
                        3,
                        SequenceAxis::Horizontal,
                        SequenceDirection::Negative,
                        1000.0,
                    )
                })
                .with_repeat(Repeat::circle(
                    2,
                    SequenceAxis::Horizontal,
                    SequenceDirection::Positive,
                    500.0,
                    0.0,
                    true,
                )),
            Element::new(RotationCoordinate::new(100.0, 400.0, 0.0)),
        ],
    );

    FloorPlan {
        placements: vec![RoomPlacement::new(main.name(), RotationCoordinate::default())],
        rooms: vec![main],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::coordinate::tests::{assert_close, assert_coord_close};

    fn hall(elements: Vec<Element>) -> Room {
        Room::rectangle("Hall", 10.0, 10.0, elements)
    }

    fn plan_with_hall() -> FloorPlan {
        let mut plan = FloorPlan::new();
        plan.upsert_room(hall(vec![Element::new(RotationCoordinate::default())]));
        plan
    }

    // ── registry ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_placement_requires_known_room() {
        let mut plan = FloorPlan::new();
        let err = plan
            .add_placement(RoomPlacement::new("Nowhere", RotationCoordinate::default()))
            .unwrap_err();
        assert_eq!(err, LayoutError::UnknownRoom("Nowhere".to_string()));
    }

    #[test]
    fn test_template_edit_propagates_to_all_placements() {
        let mut plan = plan_with_hall();
        plan.add_placement(RoomPlacement::new("Hall", RotationCoordinate::new(0.0, 0.0, 0.0)))
            .unwrap();
        plan.add_placement(RoomPlacement::new("Hall", RotationCoordinate::new(50.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(plan.seat_count(), 2);

        let replaced = plan.upsert_room(hall(vec![
            Element::new(RotationCoordinate::default()),
            Element::new(RotationCoordinate::new(1.0, 0.0, 0.0)),
        ]));
        assert!(replaced.is_some());
        assert_eq!(plan.rooms().len(), 1);

        let resolved = plan.resolve_all().unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|p| p.seats.len() == 2));
        assert_coord_close(resolved[1].seats[1].position(), Coordinate::new(51.0, 0.0));
    }

    #[test]
    fn test_remove_room_in_use_is_rejected() {
        let mut plan = plan_with_hall();
        let id = plan
            .add_placement(RoomPlacement::new("Hall", RotationCoordinate::default()))
            .unwrap();

        let err = plan.remove_room("Hall").unwrap_err();
        assert_eq!(
            err,
            LayoutError::RoomInUse {
                room: "Hall".to_string(),
                placements: 1
            }
        );

        assert!(plan.remove_placement(id).is_some());
        assert!(plan.remove_room("Hall").is_ok());
        assert_eq!(
            plan.remove_room("Hall").unwrap_err(),
            LayoutError::UnknownRoom("Hall".to_string())
        );
    }

    #[test]
    fn test_seats_concatenate_in_placement_order() {
        let mut plan = plan_with_hall();
        plan.add_placement(RoomPlacement::new("Hall", RotationCoordinate::new(5.0, 0.0, 0.0)))
            .unwrap();
        plan.add_placement(RoomPlacement::new("Hall", RotationCoordinate::new(-5.0, 0.0, 0.0)))
            .unwrap();
        let seats = plan.seats().unwrap();
        assert_close(seats[0].x, 5.0);
        assert_close(seats[1].x, -5.0);
    }

    // ── serialization ───────────────────────────────────────────────────────

    #[test]
    fn test_inline_room_map_registers_template() {
        let json = r#"{
            "placements": [{
                "coord": {"x": 100, "y": 0, "rotation": 90},
                "room": {
                    "name": "Main room",
                    "outline": [{"x":-100,"y":-100},{"x":100,"y":-100},{"x":100,"y":100},{"x":-100,"y":100}],
                    "elements": [{"base": {"x":0,"y":0,"rotation":0}, "repeats": []}]
                }
            }]
        }"#;
        let plan: FloorPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.rooms().len(), 1);
        assert_eq!(plan.placements()[0].room, "Main room");

        let seats = plan.seats().unwrap();
        assert_eq!(seats.len(), 1);
        assert_close(seats[0].x, 100.0);
        assert_close(seats[0].y, 0.0);
        assert_close(seats[0].rotation, 90.0);
    }

    #[test]
    fn test_named_placement_must_resolve() {
        let json = r#"{"rooms": [], "placements": [{"room": "Ghost", "coord": {"x":0,"y":0}}]}"#;
        let err = serde_json::from_str::<FloorPlan>(json).unwrap_err();
        assert!(err.to_string().contains("Ghost"), "got: {err}");
    }

    #[test]
    fn test_conflicting_duplicate_rooms_rejected() {
        let a = serde_json::to_value(hall(vec![])).unwrap();
        let b = serde_json::to_value(hall(vec![Element::new(RotationCoordinate::default())]))
            .unwrap();
        let json = serde_json::json!({ "rooms": [a, b] });
        let err = serde_json::from_value::<FloorPlan>(json).unwrap_err();
        assert!(err.to_string().contains("already registered"), "got: {err}");
    }

    #[test]
    fn test_serialized_form_reloads_with_same_ids() {
        let plan = default_floor_plan();
        let json = serde_json::to_string(&plan).unwrap();
        let reloaded: FloorPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, plan);
    }

    // ── default map ─────────────────────────────────────────────────────────

    #[test]
    fn test_placements_at_returns_topmost_first() {
        let mut plan = plan_with_hall();
        let lower = RoomPlacement::new("Hall", RotationCoordinate::new(0.0, 0.0, 0.0));
        let upper = RoomPlacement::new("Hall", RotationCoordinate::new(4.0, 0.0, 0.0));
        plan.add_placement(lower.clone()).unwrap();
        plan.add_placement(upper.clone()).unwrap();

        let ids: Vec<Uuid> = plan
            .placements_at(Coordinate::new(2.0, 0.0))
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![upper.id, lower.id]);
        assert!(plan.placements_at(Coordinate::new(50.0, 50.0)).is_empty());
        assert_eq!(plan.placement(upper.id), Some(&upper));
    }

    #[test]
    fn test_default_floor_plan_seats() {
        let plan = default_floor_plan();
        let seats = plan.seats().unwrap();
        // element 1: anchor + 3 line + 2 circle, element 2: anchor
        assert_eq!(seats.len(), 7);
        assert_coord_close(seats[1].position(), Coordinate::new(-1000.0, 0.0));
        assert_coord_close(seats[3].position(), Coordinate::new(-3000.0, 0.0));
        assert_coord_close(seats[4].position(), Coordinate::new(500.0, 0.0));
        assert_coord_close(seats[5].position(), Coordinate::new(-500.0, 0.0));
        assert_coord_close(seats[6].position(), Coordinate::new(100.0, 400.0));
    }
}
