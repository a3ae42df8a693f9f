//! 2D coordinate algebra used by every layout computation.
//!
//! `Coordinate` and `RotationCoordinate` are `Copy` values: every consumer
//! gets its own copy, so rotating one seat can never move another.
//! Angles are in degrees, counter-clockwise from the positive x-axis.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Coordinate
// ────────────────────────────────────────────────────────────────────────────

/// A point (or free vector) on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0.0, y: 0.0 };
    pub const UNIT_X: Coordinate = Coordinate { x: 1.0, y: 0.0 };
    pub const UNIT_Y: Coordinate = Coordinate { x: 0.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotates about the origin. Callers rotating about another pivot must
    /// translate, rotate, then translate back.
    pub fn rotate(self, angle_degrees: f64) -> Coordinate {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Coordinate {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn add(self, other: Coordinate) -> Coordinate {
        Coordinate::new(self.x + other.x, self.y + other.y)
    }

    pub fn multiply(self, scalar: f64) -> Coordinate {
        Coordinate::new(self.x * scalar, self.y * scalar)
    }

    pub fn multiply_componentwise(self, other: Coordinate) -> Coordinate {
        Coordinate::new(self.x * other.x, self.y * other.y)
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length vector normalizes to the zero vector instead of failing,
    /// so a collapsed separation still renders as a collapsed shape.
    pub fn normalize(self) -> Coordinate {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Coordinate::ORIGIN;
        }
        self.multiply(1.0 / magnitude)
    }

    /// Signed angle in degrees from `other` to `self`, as a plain difference
    /// of `atan2` values. The result lies in (-360, 360); reduce with
    /// [`normalize_degrees`] when a canonical range is needed.
    pub fn angle_with(self, other: Coordinate) -> f64 {
        (self.y.atan2(self.x) - other.y.atan2(other.x)).to_degrees()
    }

    /// Angle relative to the positive x-axis.
    pub fn as_angle(self) -> f64 {
        self.angle_with(Coordinate::UNIT_X)
    }

    pub fn distance_to(self, other: Coordinate) -> f64 {
        (self - other).magnitude()
    }

    pub fn with_rotation(self, rotation: f64) -> RotationCoordinate {
        RotationCoordinate {
            x: self.x,
            y: self.y,
            rotation,
        }
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::add(self, rhs)
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coordinate {
    type Output = Coordinate;

    fn neg(self) -> Coordinate {
        Coordinate::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Coordinate {
    type Output = Coordinate;

    fn mul(self, rhs: f64) -> Coordinate {
        self.multiply(rhs)
    }
}

/// Reduces an angle in degrees to [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let reduced = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if reduced >= 360.0 { 0.0 } else { reduced }
}

// ────────────────────────────────────────────────────────────────────────────
// RotationCoordinate
// ────────────────────────────────────────────────────────────────────────────

/// A point plus the direction a seat (or a placed room) faces there.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationCoordinate {
    pub x: f64,
    pub y: f64,
    /// Degrees, counter-clockwise from the positive x-axis.
    #[serde(default)]
    pub rotation: f64,
}

impl RotationCoordinate {
    pub const fn new(x: f64, y: f64, rotation: f64) -> Self {
        Self { x, y, rotation }
    }

    pub fn position(self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }

    /// Applies this value as a placement transform to `point`: rotate the
    /// point about the origin by `self.rotation`, then translate by
    /// `(self.x, self.y)`. The point's own facing is turned by the same angle.
    pub fn transform(self, point: RotationCoordinate) -> RotationCoordinate {
        point
            .position()
            .rotate(self.rotation)
            .add(self.position())
            .with_rotation(point.rotation + self.rotation)
    }
}

impl From<RotationCoordinate> for Coordinate {
    fn from(value: RotationCoordinate) -> Self {
        value.position()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
