//! Labeled training samples.

use serde::{Deserialize, Serialize};

use crate::stroke::{self, StrokeSet};

/// A normalized, labeled gesture ready to enter a dataset.
///
/// `id` is the count of samples already submitted in the session, so it is
/// monotonic per session but not globally unique across files. `frame_width`
/// and `frame_height` record the capture precision, since it may differ
/// between contributors and a unified format is wanted when merging files.
/// `total_point_count` is derived from the strokes and never mutated on its
/// own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: u64,
    pub symbol_label: String,
    pub unicode: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub total_point_count: usize,
    pub strokes: StrokeSet,
}

impl Sample {
    /// Pure constructor; sums the stroke lengths for `total_point_count`.
    ///
    /// An empty gesture yields a sample with zero points. Rejecting such
    /// submissions is the caller's job, at the submission boundary.
    pub fn build(
        id: u64,
        symbol_label: impl Into<String>,
        unicode: impl Into<String>,
        frame_width: u32,
        frame_height: u32,
        strokes: StrokeSet,
    ) -> Self {
        Self {
            id,
            symbol_label: symbol_label.into(),
            unicode: unicode.into(),
            frame_width,
            frame_height,
            total_point_count: stroke::total_points(&strokes),
            strokes,
        }
    }
}
