//! Rectangles, sizes and layout constraints.

use cgmath::{Point2, Vector2, Zero};

/// A size in points.
pub type Size = Vector2<f64>;

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns a new rectangle inset by the given edge amounts.
    ///
    /// The size never goes negative.
    pub fn inset(&self, top: f64, bottom: f64, left: f64, right: f64) -> Rect {
        Rect {
            origin: (self.origin.x + left, self.origin.y + top).into(),
            size: (
                (self.size.x - left - right).max(0.),
                (self.size.y - top - bottom).max(0.),
            )
                .into(),
        }
    }
}

/// Size limits passed from a layout down to its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub min: Size,
    pub max: Size,
}

impl Constraints {
    /// Constraints that allow exactly one size.
    pub fn tight(size: Size) -> Constraints {
        Constraints {
            min: size,
            max: size,
        }
    }

    /// Constraints from zero up to `max`.
    pub fn loose(max: Size) -> Constraints {
        Constraints {
            min: Vector2::zero(),
            max,
        }
    }

    /// Clamps a size into these constraints.
    pub fn constrain(&self, size: Size) -> Size {
        Vector2::new(
            size.x.max(self.min.x).min(self.max.x.max(self.min.x)),
            size.y.max(self.min.y).min(self.max.y.max(self.min.y)),
        )
    }
}
