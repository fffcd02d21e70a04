//! Bounding boxes and gesture normalization.
//!
//! Normalization uniformly rescales and recenters a gesture into a fixed
//! frame, preserving its aspect ratio. The scale is sized so the gesture's
//! bounding box plus the configured margin fits the shorter frame dimension,
//! and the box center is aligned with the frame center. All output
//! coordinates therefore land in `[0, frame_width] x [0, frame_height]` by
//! construction; no post-hoc clamping is applied.

use crate::stroke::{Point, StrokeSet};

/// Minimal axis-aligned box containing every point of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }
}

/// Computes the bounding box of a gesture, scanning every point once.
///
/// Returns `None` when the set is empty or its first stroke is empty: an
/// empty leading stroke yields "no box" rather than a scan of later strokes.
/// Committed strokes are never empty, so this only rules out degenerate input.
pub fn bounding_box(strokes: &StrokeSet) -> Option<BoundingBox> {
    let first = strokes.first()?.first()?;
    let mut bbox = BoundingBox {
        x_min: first.x,
        x_max: first.x,
        y_min: first.y,
        y_max: first.y,
    };

    for stroke in strokes {
        for point in stroke {
            bbox.x_min = bbox.x_min.min(point.x);
            bbox.x_max = bbox.x_max.max(point.x);
            bbox.y_min = bbox.y_min.min(point.y);
            bbox.y_max = bbox.y_max.max(point.y);
        }
    }
    Some(bbox)
}

/// Rescales and recenters a gesture into the given frame, with integer
/// output coordinates and timestamps passed through unchanged.
///
/// `margin` is the padding ratio around the scaled bounding box, expected in
/// `(0, 0.5)`. A gesture without a bounding box normalizes to an empty set.
/// A degenerate box (single dot) keeps a scale of 1.0 so a lone dot is
/// recentered but not magnified.
pub fn normalize(frame_width: u32, frame_height: u32, margin: f64, strokes: &StrokeSet) -> StrokeSet {
    let Some(bbox) = bounding_box(strokes) else {
        return Vec::new();
    };

    let frame_dim = frame_width.min(frame_height) as f64;
    let box_dim = bbox.width().max(bbox.height()) as f64;
    let scale = if box_dim == 0.0 {
        1.0
    } else {
        (1.0 - 2.0 * margin) * frame_dim / box_dim
    };

    // Center of the scaled box aligned to the center of the frame.
    let offset_x = (frame_width as f64 - scale * (bbox.x_min + bbox.x_max) as f64) / 2.0;
    let offset_y = (frame_height as f64 - scale * (bbox.y_min + bbox.y_max) as f64) / 2.0;

    strokes
        .iter()
        .map(|stroke| {
            stroke
                .iter()
                .map(|p| Point {
                    x: (scale * p.x as f64 + offset_x).round() as i32,
                    y: (scale * p.y as f64 + offset_y).round() as i32,
                    time: p.time,
                })
                .collect()
        })
        .collect()
}
