//! Camera auto-framing - aim at the base part once per document selection

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info};

use crate::camera::{Aabb, CameraControl};

/// Framing state for the currently selected document
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraFrame {
    pub target: Vec3,
    pub framed: bool,
    /// Document generation this frame belongs to
    pub generation: u64,
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            framed: false,
            generation: 0,
        }
    }
}

/// One-shot framer, re-armed on every document selection
#[derive(Debug, Default)]
pub struct AutoFramer {
    frame: CameraFrame,
}

impl AutoFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    /// Arm for a freshly selected document and return the camera to its home view
    pub fn rearm(&mut self, generation: u64, camera: &mut impl CameraControl) {
        self.frame = CameraFrame {
            target: self.frame.target,
            framed: false,
            generation,
        };
        camera.reset();
        debug!(generation, "Camera framer re-armed");
    }

    /// Whether a base load of `generation` would still be framed
    pub fn wants(&self, generation: u64) -> bool {
        !self.frame.framed && self.frame.generation == generation
    }

    /// Offer the bounds of a freshly loaded base part.
    ///
    /// Returns true when the camera target was moved. `None` bounds (a node
    /// without geometry) frame at `origin`.
    pub fn on_base_loaded(
        &mut self,
        generation: u64,
        bounds: Option<Aabb>,
        origin: Vec3,
        camera: &mut impl CameraControl,
    ) -> bool {
        if !self.wants(generation) {
            return false;
        }

        let target = bounds.map(|b| b.center()).unwrap_or(origin);
        camera.set_target(target);
        self.frame.target = target;
        self.frame.framed = true;

        info!(generation, target = ?target, "Framed camera on base part");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitController;

    fn bounds() -> Option<Aabb> {
        Some(Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 0.0)))
    }

    #[test]
    fn test_frames_once_per_generation() {
        let mut camera = OrbitController::default();
        let mut framer = AutoFramer::new();
        framer.rearm(1, &mut camera);

        assert!(framer.on_base_loaded(1, bounds(), Vec3::ZERO, &mut camera));
        assert_eq!(camera.target(), Vec3::new(2.0, 1.0, 0.0));
        assert!(framer.frame().framed);

        // A second base load in the same generation does not move the camera
        let other = Some(Aabb::new(Vec3::splat(10.0), Vec3::splat(12.0)));
        assert!(!framer.on_base_loaded(1, other, Vec3::ZERO, &mut camera));
        assert_eq!(camera.target(), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_stale_generation_ignored() {
        let mut camera = OrbitController::default();
        let mut framer = AutoFramer::new();
        framer.rearm(1, &mut camera);
        framer.rearm(2, &mut camera);

        assert!(!framer.on_base_loaded(1, bounds(), Vec3::ZERO, &mut camera));
        assert!(framer.on_base_loaded(2, bounds(), Vec3::ZERO, &mut camera));
    }

    #[test]
    fn test_rearm_resets_camera_and_flag() {
        let mut camera = OrbitController::default();
        let mut framer = AutoFramer::new();
        framer.rearm(1, &mut camera);
        framer.on_base_loaded(1, bounds(), Vec3::ZERO, &mut camera);

        framer.rearm(2, &mut camera);
        assert!(!framer.frame().framed);
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn test_missing_bounds_frame_at_origin() {
        let mut camera = OrbitController::default();
        let mut framer = AutoFramer::new();
        framer.rearm(1, &mut camera);
        assert!(framer.on_base_loaded(1, None, Vec3::new(0.0, 5.0, 0.0), &mut camera));
        assert_eq!(camera.target(), Vec3::new(0.0, 5.0, 0.0));
    }
}
