//! Stroke data model: timestamped points grouped into strokes and gestures.
//!
//! A `Stroke` is one continuous pointer-down-to-pointer-up path, stored as an
//! ordered list of timestamped points. A `StrokeSet` is the full gesture for
//! one symbol, possibly spanning several pen lifts. Insertion order is
//! temporal order in both cases.

use serde::{Deserialize, Serialize};

/// A single sampled point on the capture surface.
///
/// Coordinates are pixels relative to the capture frame; they may fall outside
/// `[0, frame]` while drawing, since leaving the surface mid-gesture is
/// permitted. `time` is milliseconds, shifted so the first committed point of
/// a session sits at (or near) zero when time re-shifting is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub time: u64,
}

impl Point {
    pub fn new(x: i32, y: i32, time: u64) -> Self {
        Self { x, y, time }
    }

    /// Squared Euclidean distance to another point, in pixel units.
    pub fn dist_squared(&self, other: &Point) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

/// One continuous pen-down-to-pen-up path. Non-empty once committed.
pub type Stroke = Vec<Point>;

/// All strokes forming one symbol gesture, in completion order.
pub type StrokeSet = Vec<Stroke>;

/// Total number of points across all strokes of a gesture.
pub fn total_points(strokes: &StrokeSet) -> usize {
    strokes.iter().map(|stroke| stroke.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dist_squared() {
        let a = Point::new(0, 0, 0);
        let b = Point::new(3, 4, 10);
        assert_eq!(a.dist_squared(&b), 25);
        assert_eq!(b.dist_squared(&a), 25);
        assert_eq!(a.dist_squared(&a), 0);
    }

    #[test]
    fn test_dist_squared_negative_coords() {
        let a = Point::new(-2, -3, 0);
        let b = Point::new(1, 1, 0);
        assert_eq!(a.dist_squared(&b), 9 + 16);
    }

    #[test]
    fn test_total_points() {
        let strokes: StrokeSet = vec![
            vec![Point::new(0, 0, 0), Point::new(10, 0, 5)],
            vec![Point::new(5, 5, 20)],
        ];
        assert_eq!(total_points(&strokes), 3);
        assert_eq!(total_points(&Vec::new()), 0);
    }

    #[test]
    fn test_point_json_shape() {
        let p = Point::new(50, 60, 1620);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":50,"y":60,"time":1620}"#);
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
