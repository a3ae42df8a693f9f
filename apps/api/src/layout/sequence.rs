//! Sequence expansion: turns a declarative `Repeat` into positioned seats.
//!
//! # Traversal table
//! Every `(type, axis, dir)` combination resolves through [`traversal`] to a
//! start direction (in the anchor's local frame) and a sense:
//!
//! ```text
//! type    axis        dir       start   sense
//! line    horizontal  positive  +x      +1   (along +x)
//! line    horizontal  negative  +x      -1   (along -x)
//! line    vertical    positive  +y      +1   (along +y)
//! line    vertical    negative  +y      -1   (along -y)
//! circle  horizontal  positive  +x      -1   (clockwise)
//! circle  horizontal  negative  +x      +1   (counter-clockwise)
//! circle  vertical    positive  +y      +1   (counter-clockwise)
//! circle  vertical    negative  +y      -1   (clockwise)
//! ```
//!
//! The anchor itself is never part of an expansion; `Element` emits it.

use serde::{Deserialize, Serialize};

use crate::layout::coordinate::{normalize_degrees, Coordinate, RotationCoordinate};
use crate::layout::error::LayoutError;

/// Largest `num` a single repeat may request. Editor counts are small;
/// anything above this is rejected instead of expanded.
pub const MAX_SEQUENCE_COUNT: u32 = 1_000;

// ────────────────────────────────────────────────────────────────────────────
// Enums
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    Line,
    Circle,
}

/// Line: the axis repeats extend along. Circle: picks the traversal sense
/// (horizontal reads as clockwise, vertical as counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceDirection {
    Positive,
    Negative,
}

// ────────────────────────────────────────────────────────────────────────────
// Traversal dispatch
// ────────────────────────────────────────────────────────────────────────────

/// How one sequence combination walks away from its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traversal {
    /// Line: unit step direction. Circle: direction of the first point from the center.
    pub start: Coordinate,
    /// Line: sign of travel. Circle: +1 counter-clockwise, -1 clockwise.
    pub sense: f64,
}

pub fn traversal(kind: SequenceType, axis: SequenceAxis, dir: SequenceDirection) -> Traversal {
    use SequenceAxis::*;
    use SequenceDirection::*;
    use SequenceType::*;

    let (start, sense) = match (kind, axis, dir) {
        (Line, Horizontal, Positive) => (Coordinate::UNIT_X, 1.0),
        (Line, Horizontal, Negative) => (Coordinate::UNIT_X, -1.0),
        (Line, Vertical, Positive) => (Coordinate::UNIT_Y, 1.0),
        (Line, Vertical, Negative) => (Coordinate::UNIT_Y, -1.0),
        (Circle, Horizontal, Positive) => (Coordinate::UNIT_X, -1.0),
        (Circle, Horizontal, Negative) => (Coordinate::UNIT_X, 1.0),
        (Circle, Vertical, Positive) => (Coordinate::UNIT_Y, 1.0),
        (Circle, Vertical, Negative) => (Coordinate::UNIT_Y, -1.0),
    };
    Traversal { start, sense }
}

/// Human label for the axis field as an editor shows it.
pub fn axis_name(kind: SequenceType, axis: SequenceAxis) -> &'static str {
    match (kind, axis) {
        (SequenceType::Line, SequenceAxis::Horizontal) => "horizontal",
        (SequenceType::Line, SequenceAxis::Vertical) => "vertical",
        (SequenceType::Circle, SequenceAxis::Horizontal) => "clockwise",
        (SequenceType::Circle, SequenceAxis::Vertical) => "counter-clockwise",
    }
}

/// Human label for the direction field as an editor shows it.
pub fn direction_name(kind: SequenceType, dir: SequenceDirection) -> &'static str {
    match (kind, dir) {
        (SequenceType::Line, SequenceDirection::Positive) => "positive",
        (SequenceType::Line, SequenceDirection::Negative) => "negative",
        (SequenceType::Circle, SequenceDirection::Positive) => "forward",
        (SequenceType::Circle, SequenceDirection::Negative) => "reverse",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Repeat
// ────────────────────────────────────────────────────────────────────────────

/// A declarative rule generating a line or circle of points from an anchor.
///
/// `radius` only matters for circles. `separation` is the distance between
/// points on a line, or the angular step in degrees on a circle that is not
/// `equivalent_spaced`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RepeatSpec", into = "RepeatSpec")]
pub struct Repeat {
    pub kind: SequenceType,
    pub num: u32,
    pub axis: SequenceAxis,
    pub dir: SequenceDirection,
    pub radius: f64,
    pub separation: f64,
    pub equivalent_spaced: bool,
}

/// Wire form of a `Repeat`; `num` is signed so negative counts are rejected
/// with a layout error instead of a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepeatSpec {
    #[serde(rename = "type")]
    kind: SequenceType,
    num: i64,
    axis: SequenceAxis,
    dir: SequenceDirection,
    #[serde(default)]
    radius: f64,
    #[serde(default)]
    separation: f64,
    #[serde(default)]
    equivalent_spaced: bool,
}

impl TryFrom<RepeatSpec> for Repeat {
    type Error = LayoutError;

    fn try_from(spec: RepeatSpec) -> Result<Self, Self::Error> {
        Repeat::new(
            spec.kind,
            spec.num,
            spec.axis,
            spec.dir,
            spec.radius,
            spec.separation,
            spec.equivalent_spaced,
        )
    }
}

impl From<Repeat> for RepeatSpec {
    fn from(repeat: Repeat) -> Self {
        RepeatSpec {
            kind: repeat.kind,
            num: i64::from(repeat.num),
            axis: repeat.axis,
            dir: repeat.dir,
            radius: repeat.radius,
            separation: repeat.separation,
            equivalent_spaced: repeat.equivalent_spaced,
        }
    }
}

impl Repeat {
    /// Builds a repeat from editor input, rejecting negative counts and
    /// counts above [`MAX_SEQUENCE_COUNT`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: SequenceType,
        num: i64,
        axis: SequenceAxis,
        dir: SequenceDirection,
        radius: f64,
        separation: f64,
        equivalent_spaced: bool,
    ) -> Result<Self, LayoutError> {
        if num < 0 {
            return Err(LayoutError::InvalidSequenceCount(num));
        }
        if num > i64::from(MAX_SEQUENCE_COUNT) {
            return Err(LayoutError::SequenceCountTooLarge {
                num,
                max: MAX_SEQUENCE_COUNT,
            });
        }
        Ok(Repeat {
            kind,
            num: num as u32,
            axis,
            dir,
            radius,
            separation,
            equivalent_spaced,
        })
    }

    pub fn line(num: u32, axis: SequenceAxis, dir: SequenceDirection, separation: f64) -> Self {
        Repeat {
            kind: SequenceType::Line,
            num,
            axis,
            dir,
            radius: 0.0,
            separation,
            equivalent_spaced: false,
        }
    }

    pub fn circle(
        num: u32,
        axis: SequenceAxis,
        dir: SequenceDirection,
        radius: f64,
        separation: f64,
        equivalent_spaced: bool,
    ) -> Self {
        Repeat {
            kind: SequenceType::Circle,
            num,
            axis,
            dir,
            radius,
            separation,
            equivalent_spaced,
        }
    }

    pub fn traversal(&self) -> Traversal {
        traversal(self.kind, self.axis, self.dir)
    }

    pub fn axis_name(&self) -> &'static str {
        axis_name(self.kind, self.axis)
    }

    pub fn direction_name(&self) -> &'static str {
        direction_name(self.kind, self.dir)
    }

    /// Degrees between consecutive circle points. Zero for an empty sequence.
    pub fn angular_step(&self) -> f64 {
        if self.num == 0 {
            0.0
        } else if self.equivalent_spaced {
            360.0 / f64::from(self.num)
        } else {
            self.separation
        }
    }

    pub fn expand(&self, base: RotationCoordinate) -> Vec<RotationCoordinate> {
        expand(base, self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Expansion
// ────────────────────────────────────────────────────────────────────────────

/// Expands `repeat` around `base`, returning exactly `repeat.num` points.
///
/// The sequence is oriented in the anchor's local frame: `base.rotation`
/// turns the line axis and the circle's start direction.
pub fn expand(base: RotationCoordinate, repeat: &Repeat) -> Vec<RotationCoordinate> {
    if repeat.num == 0 {
        return Vec::new();
    }

    let route = repeat.traversal();
    match repeat.kind {
        SequenceType::Line => expand_line(base, repeat, route),
        SequenceType::Circle => expand_circle(base, repeat, route),
    }
}

/// Points `k = 1..=num` at `k × separation` along the local axis. Facing is
/// inherited from the anchor.
fn expand_line(
    base: RotationCoordinate,
    repeat: &Repeat,
    route: Traversal,
) -> Vec<RotationCoordinate> {
    let origin = base.position();
    let step = route
        .start
        .rotate(base.rotation)
        .multiply(route.sense * repeat.separation);

    (1..=repeat.num)
        .map(|k| {
            origin
                .add(step.multiply(f64::from(k)))
                .with_rotation(base.rotation)
        })
        .collect()
}

/// Points `k = 0..num` on a circle of `radius` around the anchor, each
/// facing outward from the center. A zero radius collapses every point onto
/// the anchor with rotation 0.
fn expand_circle(
    base: RotationCoordinate,
    repeat: &Repeat,
    route: Traversal,
) -> Vec<RotationCoordinate> {
    let center = base.position();
    let first = route
        .start
        .rotate(base.rotation)
        .normalize()
        .multiply(repeat.radius);
    let step = repeat.angular_step() * route.sense;

    (0..repeat.num)
        .map(|k| {
            let offset = first.rotate(step * f64::from(k));
            let facing = if offset.magnitude() == 0.0 {
                0.0
            } else {
                normalize_degrees(offset.as_angle())
            };
            center.add(offset).with_rotation(facing)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
