//! Idle detection and auto-rotation
//!
//! Two states: `Active` (initial) and `AutoRotating`. A single-shot timer is
//! armed whenever the viewer is (re)activated; when it fires the camera starts
//! auto-rotating, and any interaction stops it and re-arms the timer.

use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::camera::CameraControl;

/// Default idle delay before auto-rotation engages
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum InteractionState {
    #[default]
    Active,
    AutoRotating,
}

/// Single-shot, cancellable countdown driven by frame deltas
#[derive(Debug, Clone, Default)]
pub struct IdleTimer {
    remaining: Option<Duration>,
}

impl IdleTimer {
    /// Arm the timer, replacing any pending countdown
    pub fn schedule(&mut self, delay: Duration) {
        self.remaining = Some(delay);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// Advance the countdown; returns true exactly once, when it fires
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self.remaining {
            Some(remaining) if dt >= remaining => {
                self.remaining = None;
                true
            }
            Some(remaining) => {
                self.remaining = Some(remaining - dt);
                false
            }
            None => false,
        }
    }
}

/// Owner of `InteractionState`; writes only the camera's auto-rotate flag
#[derive(Debug, Clone)]
pub struct IdleController {
    state: InteractionState,
    timer: IdleTimer,
    idle_delay: Duration,
}

impl IdleController {
    pub fn new(idle_delay: Duration) -> Self {
        Self {
            state: InteractionState::Active,
            timer: IdleTimer::default(),
            idle_delay,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn idle_delay(&self) -> Duration {
        self.idle_delay
    }

    pub fn timer(&self) -> &IdleTimer {
        &self.timer
    }

    /// Viewer start: begin in `Active` with a fresh idle window
    pub fn start(&mut self, camera: &mut impl CameraControl) {
        self.state = InteractionState::Active;
        camera.set_auto_rotate(false);
        self.timer.schedule(self.idle_delay);
    }

    /// User interaction with the viewport
    pub fn on_interaction(&mut self, camera: &mut impl CameraControl) {
        if self.state == InteractionState::AutoRotating {
            debug!("Interaction stopped auto-rotation");
        }
        self.state = InteractionState::Active;
        camera.set_auto_rotate(false);
        self.timer.schedule(self.idle_delay);
    }

    /// Advance time; returns the new state when a transition happened
    pub fn advance(&mut self, dt: Duration, camera: &mut impl CameraControl) -> Option<InteractionState> {
        if self.timer.advance(dt) && self.state == InteractionState::Active {
            self.state = InteractionState::AutoRotating;
            camera.set_auto_rotate(true);
            debug!(delay_ms = self.idle_delay.as_millis() as u64, "Idle, auto-rotation engaged");
            return Some(self.state);
        }
        None
    }

    /// Viewer teardown: cancel the pending timer
    pub fn teardown(&mut self) {
        self.timer.cancel();
    }
}

impl Default for IdleController {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitController;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_timer_is_single_shot() {
        let mut timer = IdleTimer::default();
        timer.schedule(ms(100));
        assert!(!timer.advance(ms(60)));
        assert!(timer.advance(ms(40)));
        assert!(!timer.advance(ms(1000)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_schedule_replaces_pending_countdown() {
        let mut timer = IdleTimer::default();
        timer.schedule(ms(100));
        timer.advance(ms(90));
        timer.schedule(ms(100));
        assert_eq!(timer.remaining(), Some(ms(100)));
    }

    #[test]
    fn test_idle_delay_engages_auto_rotate() {
        let mut camera = OrbitController::default();
        let mut idle = IdleController::default();
        idle.start(&mut camera);

        assert_eq!(idle.advance(ms(1999), &mut camera), None);
        assert!(!camera.auto_rotate());
        assert_eq!(idle.advance(ms(1), &mut camera), Some(InteractionState::AutoRotating));
        assert!(camera.auto_rotate());
        assert!(!idle.timer().is_pending());
    }

    #[test]
    fn test_interaction_restarts_fresh_window() {
        let mut camera = OrbitController::default();
        let mut idle = IdleController::default();
        idle.start(&mut camera);

        idle.advance(ms(1500), &mut camera);
        idle.on_interaction(&mut camera);
        // 1500 + 1500 would have fired without the restart
        assert_eq!(idle.advance(ms(1500), &mut camera), None);
        assert_eq!(idle.state(), InteractionState::Active);
        assert_eq!(idle.advance(ms(500), &mut camera), Some(InteractionState::AutoRotating));
    }

    #[test]
    fn test_interaction_stops_auto_rotate() {
        let mut camera = OrbitController::default();
        let mut idle = IdleController::new(ms(10));
        idle.start(&mut camera);
        idle.advance(ms(10), &mut camera);
        assert_eq!(idle.state(), InteractionState::AutoRotating);

        idle.on_interaction(&mut camera);
        assert_eq!(idle.state(), InteractionState::Active);
        assert!(!camera.auto_rotate());
        assert_eq!(idle.timer().remaining(), Some(ms(10)));
    }

    #[test]
    fn test_teardown_cancels_timer() {
        let mut camera = OrbitController::default();
        let mut idle = IdleController::default();
        idle.start(&mut camera);
        idle.teardown();
        assert_eq!(idle.advance(ms(5000), &mut camera), None);
        assert_eq!(idle.state(), InteractionState::Active);
    }
}
