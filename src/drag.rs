// Drag-resize controller
//
// Turns a pointer drag on the sidebar edge into throttled, clamped width
// commits. Each drag is a `DragGesture` value: created on pointer-down,
// dropped on pointer-up. Everything the move handler needs (origin, last
// commit time) lives in that value, so nothing survives between gestures.
//
// The controller never writes the config itself; every width goes through
// `Store::update_config`, which applies the clamp again.

use crate::model::clamp_sidebar_width;
use crate::store::Store;
use std::time::{Duration, Instant};

/// Minimum spacing between two width commits
pub const COMMIT_INTERVAL: Duration = Duration::from_millis(100);

/// Result of feeding a pointer move to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Width committed through the store
    Committed(f64),
    /// Inside the throttle window; the move was dropped
    Throttled,
    /// No gesture in progress
    Idle,
}

/// State owned by one drag, from pointer-down to pointer-up
#[derive(Debug, Clone)]
struct DragGesture {
    origin_x: f64,
    origin_width: f64,
    last_commit: Option<Instant>,
}

impl DragGesture {
    fn candidate_width(&self, x: f64) -> f64 {
        clamp_sidebar_width(self.origin_width + (x - self.origin_x))
    }

    fn throttled(&self, now: Instant) -> bool {
        self.last_commit
            .is_some_and(|last| now.saturating_duration_since(last) < COMMIT_INTERVAL)
    }
}

#[derive(Debug, Default)]
pub struct DragResizeController {
    gesture: Option<DragGesture>,
    /// Width observed when the last gesture ended
    resting_width: Option<f64>,
}

impl DragResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn resting_width(&self) -> Option<f64> {
        self.resting_width
    }

    /// Pointer-down on the drag handle
    ///
    /// A gesture still in progress (pointer-up lost) is ended first, so at
    /// most one gesture is ever attached.
    pub fn begin(&mut self, store: &Store, x: f64) {
        if self.gesture.is_some() {
            tracing::debug!("Drag restarted before previous gesture ended");
            self.end(store);
        }
        self.gesture = Some(DragGesture {
            origin_x: x,
            origin_width: store.config().sidebar_width,
            last_commit: None,
        });
    }

    /// Pointer-move at `x`, observed at `now`
    pub fn on_move(&mut self, store: &mut Store, x: f64, now: Instant) -> DragOutcome {
        let Some(gesture) = self.gesture.as_mut() else {
            return DragOutcome::Idle;
        };
        if gesture.throttled(now) {
            return DragOutcome::Throttled;
        }

        gesture.last_commit = Some(now);
        let width = gesture.candidate_width(x);
        store.update_config(|config| config.sidebar_width = width);
        DragOutcome::Committed(store.config().sidebar_width)
    }

    /// Pointer-up: detach the gesture and re-read the committed width
    pub fn end(&mut self, store: &Store) {
        if self.gesture.take().is_some() {
            let width = store.config().sidebar_width;
            tracing::debug!("Drag ended at width {}", width);
            self.resting_width = Some(width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{MAX_SIDEBAR_WIDTH, MIN_SIDEBAR_WIDTH};

    #[test]
    fn one_second_of_10ms_moves_commits_at_most_ten_times() {
        let mut store = Store::new();
        let mut drag = DragResizeController::new();
        let origin_width = store.config().sidebar_width;
        let start = Instant::now();

        drag.begin(&store, 100.0);
        let mut commits = 0;
        for step in 1..=100u64 {
            let now = start + Duration::from_millis(step * 10);
            if let DragOutcome::Committed(_) = drag.on_move(&mut store, 150.0, now) {
                commits += 1;
            }
        }
        drag.end(&store);

        assert!(commits <= 10, "{commits} commits");
        assert!(commits > 0);
        assert_eq!(
            store.config().sidebar_width,
            clamp_sidebar_width(origin_width + 50.0)
        );
    }

    #[test]
    fn moves_inside_window_are_dropped_not_queued() {
        let mut store = Store::new();
        let mut drag = DragResizeController::new();
        let t0 = Instant::now();

        drag.begin(&store, 0.0);
        assert_eq!(
            drag.on_move(&mut store, 10.0, t0),
            DragOutcome::Committed(310.0)
        );
        assert_eq!(
            drag.on_move(&mut store, 40.0, t0 + Duration::from_millis(50)),
            DragOutcome::Throttled
        );
        assert_eq!(store.config().sidebar_width, 310.0);

        // Next commit uses the newest pointer position, not the dropped one
        assert_eq!(
            drag.on_move(&mut store, 60.0, t0 + Duration::from_millis(100)),
            DragOutcome::Committed(360.0)
        );
    }

    #[test]
    fn widths_are_clamped_both_ways() {
        let mut store = Store::new();
        let mut drag = DragResizeController::new();
        let t0 = Instant::now();

        drag.begin(&store, 500.0);
        drag.on_move(&mut store, 5_000.0, t0);
        assert_eq!(store.config().sidebar_width, MAX_SIDEBAR_WIDTH);
        drag.on_move(&mut store, -5_000.0, t0 + COMMIT_INTERVAL);
        assert_eq!(store.config().sidebar_width, MIN_SIDEBAR_WIDTH);
    }

    #[test]
    fn next_gesture_starts_from_committed_width() {
        let mut store = Store::new();
        let mut drag = DragResizeController::new();
        let t0 = Instant::now();

        drag.begin(&store, 0.0);
        drag.on_move(&mut store, 80.0, t0);
        drag.end(&store);
        assert!(!drag.is_dragging());
        assert_eq!(drag.resting_width(), Some(380.0));

        drag.begin(&store, 0.0);
        drag.on_move(&mut store, 20.0, t0 + Duration::from_secs(1));
        drag.end(&store);
        assert_eq!(store.config().sidebar_width, 400.0);
    }

    #[test]
    fn moves_without_gesture_are_ignored() {
        let mut store = Store::new();
        let mut drag = DragResizeController::new();
        let revision = store.revision();
        assert_eq!(
            drag.on_move(&mut store, 400.0, Instant::now()),
            DragOutcome::Idle
        );
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn begin_while_dragging_replaces_gesture() {
        let mut store = Store::new();
        let mut drag = DragResizeController::new();
        let t0 = Instant::now();

        drag.begin(&store, 0.0);
        drag.on_move(&mut store, 50.0, t0);
        // Pointer-up was lost; a new press starts fresh from the committed width
        drag.begin(&store, 0.0);
        assert_eq!(drag.resting_width(), Some(350.0));
        assert_eq!(
            drag.on_move(&mut store, 10.0, t0 + Duration::from_millis(1)),
            DragOutcome::Committed(360.0)
        );
    }
}
