//! Continuous playback position derived from a coarse engine clock.
//!
//! The engine is polled every few hundred milliseconds. Between polls the
//! position is extrapolated from the last anchor so the progress bar can
//! animate smoothly; every poll replaces the estimate with the engine value.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::clock::Clock;

pub struct PositionTracker {
    clock: Arc<dyn Clock>,
    anchored_at: Instant,
    anchor: Duration,
    duration: Duration,
    running: bool,
    drag: Option<Duration>,
}

impl PositionTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let anchored_at = clock.now();
        Self {
            clock,
            anchored_at,
            anchor: Duration::ZERO,
            duration: Duration::ZERO,
            running: false,
            drag: None,
        }
    }

    /// Start over for a freshly loaded track: frozen at zero, no drag.
    pub fn reset(&mut self, duration: Duration) {
        self.duration = duration;
        self.running = false;
        self.drag = None;
        self.anchor(Duration::ZERO);
    }

    /// Stamp `(now, position)` as the new anchor.
    pub fn anchor(&mut self, position: Duration) {
        self.anchored_at = self.clock.now();
        self.anchor = self.clamp(position);
    }

    /// Current position estimate, clamped to `[0, duration]`.
    pub fn extrapolate(&self) -> Duration {
        if !self.running {
            return self.anchor;
        }
        let elapsed = self.clock.now().saturating_duration_since(self.anchored_at);
        self.clamp(self.anchor + elapsed)
    }

    /// Replace the estimate with the engine-reported position.
    ///
    /// Ignored while the user is dragging the seek slider.
    pub fn reconcile(&mut self, engine_position: Duration) {
        if self.drag.is_none() {
            self.anchor(engine_position);
        }
    }

    /// Stop extrapolating; the position at this instant becomes the anchor.
    pub fn freeze(&mut self) -> Duration {
        let at = self.extrapolate();
        self.running = false;
        self.anchor(at);
        at
    }

    /// Resume extrapolating from the frozen position.
    pub fn resume(&mut self) {
        let at = self.anchor;
        self.running = true;
        self.anchor(at);
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn begin_drag(&mut self) {
        self.drag = Some(self.extrapolate());
    }

    pub fn drag_to(&mut self, target: Duration) {
        if self.drag.is_some() {
            self.drag = Some(self.clamp(target));
        }
    }

    /// Finish a drag, returning the target the user let go at.
    pub fn end_drag(&mut self) -> Option<Duration> {
        self.drag.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// What the UI should show: the dragged target during a drag, the estimate otherwise.
    pub fn display(&self) -> Duration {
        self.drag.unwrap_or_else(|| self.extrapolate())
    }

    /// Time left in the track, `None` when the duration is unknown.
    pub fn remaining(&self) -> Option<Duration> {
        (!self.duration.is_zero()).then(|| self.duration.saturating_sub(self.extrapolate()))
    }

    /// Fraction of the track shown as played, `None` when the duration is unknown.
    pub fn progress(&self) -> Option<f64> {
        if self.duration.is_zero() {
            return None;
        }
        Some((self.display().as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0))
    }

    /// Clamp to `[0, duration]`; an unknown duration leaves the upper bound open.
    pub fn clamp(&self, position: Duration) -> Duration {
        if self.duration.is_zero() {
            position
        } else {
            position.min(self.duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::clock::ManualClock;

    fn tracker(duration_secs: u64) -> (PositionTracker, ManualClock) {
        let clock = ManualClock::new();
        let mut t = PositionTracker::new(Arc::new(clock.clone()));
        t.reset(Duration::from_secs(duration_secs));
        (t, clock)
    }

    #[test]
    fn extrapolate_right_after_anchor_returns_anchor() {
        let (mut t, _clock) = tracker(30);
        t.resume();
        t.anchor(Duration::from_secs(12));
        assert_eq!(t.extrapolate(), Duration::from_secs(12));
    }

    #[test]
    fn extrapolate_advances_only_while_running() {
        let (mut t, clock) = tracker(30);
        clock.advance(Duration::from_secs(5));
        assert_eq!(t.extrapolate(), Duration::ZERO);

        t.resume();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(t.extrapolate(), Duration::from_millis(1500));

        let frozen = t.freeze();
        clock.advance(Duration::from_secs(3));
        assert_eq!(t.extrapolate(), frozen);
    }

    #[test]
    fn extrapolate_clamps_to_duration() {
        let (mut t, clock) = tracker(10);
        t.resume();
        clock.advance(Duration::from_secs(60));
        assert_eq!(t.extrapolate(), Duration::from_secs(10));
        assert_eq!(t.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn unknown_duration_leaves_upper_bound_open() {
        let (mut t, clock) = tracker(0);
        t.resume();
        clock.advance(Duration::from_secs(600));
        assert_eq!(t.extrapolate(), Duration::from_secs(600));
        assert_eq!(t.remaining(), None);
        assert_eq!(t.progress(), None);
    }

    #[test]
    fn reconcile_replaces_estimate_with_engine_value() {
        let (mut t, clock) = tracker(30);
        t.resume();
        clock.advance(Duration::from_millis(500));
        // engine lagged behind the local estimate
        t.reconcile(Duration::from_millis(420));
        assert_eq!(t.extrapolate(), Duration::from_millis(420));

        // engine past the probed duration clamps rather than erroring
        t.reconcile(Duration::from_secs(31));
        assert_eq!(t.extrapolate(), Duration::from_secs(30));
    }

    #[test]
    fn drag_shows_target_and_blocks_reconcile() {
        let (mut t, clock) = tracker(30);
        t.resume();
        clock.advance(Duration::from_secs(4));
        t.begin_drag();
        t.drag_to(Duration::from_secs(20));
        clock.advance(Duration::from_secs(1));
        assert_eq!(t.display(), Duration::from_secs(20));
        assert_eq!(t.progress(), Some(20.0 / 30.0));

        t.reconcile(Duration::from_secs(25));
        assert_eq!(t.end_drag(), Some(Duration::from_secs(20)));
        // reconcile during the drag was dropped; still extrapolating from the old anchor
        assert_eq!(t.display(), Duration::from_secs(5));
    }

    #[test]
    fn drag_to_without_begin_is_ignored() {
        let (mut t, _clock) = tracker(30);
        t.drag_to(Duration::from_secs(9));
        assert!(!t.is_dragging());
        assert_eq!(t.end_drag(), None);
    }
}
