//! Stroke capture: turns pointer events into timestamped strokes.
//!
//! A `CaptureSession` owns the state of one drawing session: the strokes
//! committed so far, the stroke currently being drawn, and the session time
//! offset. It is an explicit two-state machine (idle / capturing) so a second
//! pointer-down cannot interleave with an in-progress gesture; the GUI feeds
//! it pointer events and draws feedback from the committed points.
//!
//! Pointer-move samples are filtered by a minimum-step threshold so high
//! polling rates do not oversample the path: a move must end strictly more
//! than `MIN_STEP_SIZE_SQUARED` squared pixels away from the previous
//! committed point to be recorded.

use tracing::warn;

use crate::stroke::{Point, Stroke, StrokeSet};

/// Moves at or below this squared distance from the previous committed point
/// are skipped (about a 5 px minimum step).
pub const MIN_STEP_SIZE_SQUARED: i64 = 25;

enum CaptureState {
    Idle,
    Capturing { pending: Stroke },
}

/// State of one drawing session on the capture surface.
pub struct CaptureSession {
    strokes: StrokeSet,
    state: CaptureState,
    time_offset: Option<u64>,
    reshift_time: bool,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    /// New session with time re-shifting enabled: point times are relative to
    /// the first committed point, which keeps payloads small and avoids
    /// leaking absolute timestamps.
    pub fn new() -> Self {
        Self {
            strokes: Vec::new(),
            state: CaptureState::Idle,
            time_offset: None,
            reshift_time: true,
        }
    }

    /// New session recording raw wall-clock milliseconds instead.
    pub fn with_raw_timestamps() -> Self {
        Self {
            reshift_time: false,
            ..Self::new()
        }
    }

    /// Strokes committed so far, in completion order.
    pub fn strokes(&self) -> &StrokeSet {
        &self.strokes
    }

    /// The stroke currently being drawn, if a gesture is in progress.
    pub fn pending(&self) -> Option<&Stroke> {
        match &self.state {
            CaptureState::Idle => None,
            CaptureState::Capturing { pending } => Some(pending),
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && !self.is_capturing()
    }

    /// Starts a new gesture and commits its initial point immediately, so a
    /// click with no movement still records one dot. A pointer-down while a
    /// gesture is already in progress is ignored; move and up handlers are
    /// only live between a down and its matching up.
    pub fn pointer_down(&mut self, x: i32, y: i32, now_ms: u64) {
        if self.is_capturing() {
            warn!("pointer down ignored: a gesture is already in progress");
            return;
        }
        let point = Point::new(x, y, self.shifted_time(now_ms));
        self.state = CaptureState::Capturing { pending: vec![point] };
    }

    /// Feeds a pointer-move sample. Returns true when the point was committed
    /// (it cleared the minimum-step filter), so callers can draw feedback per
    /// committed point. Moves outside a gesture are ignored.
    pub fn pointer_move(&mut self, x: i32, y: i32, now_ms: u64) -> bool {
        if !self.is_capturing() {
            return false;
        }
        let time = self.shifted_time(now_ms);
        let candidate = Point::new(x, y, time);
        match &mut self.state {
            CaptureState::Idle => false,
            CaptureState::Capturing { pending } => {
                if let Some(prev) = pending.last() {
                    if candidate.dist_squared(prev) <= MIN_STEP_SIZE_SQUARED {
                        return false;
                    }
                }
                pending.push(candidate);
                true
            }
        }
    }

    /// Ends the gesture. The pending stroke is appended to the set when it
    /// holds at least one point, and discarded otherwise. Returns true when a
    /// stroke was appended.
    pub fn pointer_up(&mut self) -> bool {
        let state = std::mem::replace(&mut self.state, CaptureState::Idle);
        match state {
            CaptureState::Idle => false,
            CaptureState::Capturing { pending } => {
                if pending.is_empty() {
                    return false;
                }
                self.strokes.push(pending);
                true
            }
        }
    }

    /// Drops all captured strokes and resets the session clock, ready for the
    /// next symbol.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.state = CaptureState::Idle;
        self.time_offset = None;
    }

    fn shifted_time(&mut self, now_ms: u64) -> u64 {
        if !self.reshift_time {
            return now_ms;
        }
        let offset = *self.time_offset.get_or_insert(now_ms);
        now_ms.saturating_sub(offset)
    }
}
