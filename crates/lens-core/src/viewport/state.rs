use std::ops::{Add, Sub};

use crate::consts::NATURAL_SCALE;

/// A position in container-local pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero, negative or NaN dimensions cannot take part in fit math.
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// What the host needs to draw: content is scaled about its top-left corner,
/// then offset by the translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    /// Map a content-space point to container space.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    /// Map a container-space point back to content space.
    pub fn invert(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }
}

/// Viewport transform plus drag bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub is_dragging: bool,
    /// Pointer position minus translation at drag start.
    pub drag_origin: Point,
    /// True while the view should follow container resizes with a re-fit.
    /// Cleared by any manual zoom or pan.
    pub is_fit_active: bool,
}

impl ViewportState {
    pub fn transform(&self) -> Transform {
        Transform {
            scale: self.scale,
            translate_x: self.translate_x,
            translate_y: self.translate_y,
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: NATURAL_SCALE,
            translate_x: 0.0,
            translate_y: 0.0,
            is_dragging: false,
            drag_origin: Point::ZERO,
            is_fit_active: false,
        }
    }
}

/// Snapshot taken when the second finger lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchState {
    pub initial_distance: f64,
    pub initial_scale: f64,
    /// Midpoint between the two touches at gesture start.
    pub anchor: Point,
}

impl PinchState {
    pub fn new(a: Point, b: Point, initial_scale: f64) -> Self {
        Self {
            initial_distance: a.distance(b),
            initial_scale,
            anchor: a.midpoint(b),
        }
    }

    /// Ratio of the current finger distance to the initial one, or `None`
    /// when the gesture started with both fingers on the same spot.
    pub fn distance_ratio(&self, a: Point, b: Point) -> Option<f64> {
        if self.initial_distance <= f64::EPSILON {
            return None;
        }
        Some(a.distance(b) / self.initial_distance)
    }
}
