//! Geometry primitives in diagram coordinates.
//!
//! All coordinates are `f64` because clients measure rendered text and shapes
//! with sub-pixel precision.

use serde::{Deserialize, Serialize};

/// A position in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Builds a rectangle from a top-left corner and a size.
    pub fn from_parts(position: Point, size: Dimension) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Returns the top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the size.
    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_parts_keeps_corner_and_size() {
        // Arrange / Act
        let b = Bounds::from_parts(Point::new(10.0, -4.5), Dimension::new(80.0, 20.0));

        // Assert
        assert_eq!(b.position(), Point::new(10.0, -4.5));
        assert_eq!(b.size(), Dimension::new(80.0, 20.0));
    }

    #[test]
    fn test_point_json_uses_plain_field_names() {
        let json = serde_json::to_string(&Point::new(1.0, 2.5)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.5}"#);
    }
}
