//! Orbit camera model and bounding volumes
//!
//! `OrbitController` is the renderer-agnostic camera-control collaborator:
//! a damped orbit around a target point with an optional auto-rotation. The
//! renderer copies `eye()` / `target()` into its camera every frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::time::Duration;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Bounds of a point cloud, `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, used to carry local bounds into world space
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

/// Camera-control collaborator driven by the framer, the idle machine and
/// the render loop. Each writer touches its own fields only.
pub trait CameraControl {
    fn set_target(&mut self, target: Vec3);
    fn set_auto_rotate(&mut self, enabled: bool);
    fn set_auto_rotate_speed(&mut self, radians_per_second: f32);
    /// Advance one frame (auto-rotation, damping)
    fn update(&mut self, dt: Duration);
    /// Return to the initial view
    fn reset(&mut self);
}

/// Orbit camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Initial eye position
    pub eye: [f32; 3],
    /// Initial look-at target
    pub target: [f32; 3],
    /// Radians of orbit per pixel of drag
    pub sensitivity: f32,
    pub zoom_speed: f32,
    /// Damping strength; higher settles faster
    pub smooth_factor: f32,
    /// Auto-rotation speed in radians per second
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
            // One revolution every 30 seconds
            auto_rotate_speed: TAU / 30.0,
            min_distance: 0.1,
            max_distance: 500.0,
        }
    }
}

const MAX_ELEVATION: f32 = 1.55;

/// Damped orbit controller (Y up)
#[derive(Debug, Clone)]
pub struct OrbitController {
    settings: OrbitSettings,
    target: Vec3,
    azimuth: f32,
    elevation: f32,
    distance: f32,
    target_distance: f32,
    pending_azimuth: f32,
    pending_elevation: f32,
    auto_rotate: bool,
    auto_rotate_speed: f32,
}

impl OrbitController {
    pub fn new(settings: OrbitSettings) -> Self {
        let mut controller = Self {
            target: Vec3::ZERO,
            azimuth: 0.0,
            elevation: 0.0,
            distance: 1.0,
            target_distance: 1.0,
            pending_azimuth: 0.0,
            pending_elevation: 0.0,
            auto_rotate: false,
            auto_rotate_speed: settings.auto_rotate_speed,
            settings,
        };
        controller.reset();
        controller
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Current eye position on the orbit sphere
    pub fn eye(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        self.target
            + Vec3::new(
                horizontal * self.azimuth.sin(),
                self.distance * self.elevation.sin(),
                horizontal * self.azimuth.cos(),
            )
    }

    /// Queue an orbit drag in pixels; applied gradually by `update`
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_azimuth -= dx * self.settings.sensitivity;
        self.pending_elevation += dy * self.settings.sensitivity;
    }

    /// Zoom by scroll lines; positive moves closer
    pub fn zoom(&mut self, scroll: f32) {
        let factor = 1.0 - scroll * self.settings.zoom_speed;
        self.target_distance = (self.target_distance * factor)
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }
}

impl CameraControl for OrbitController {
    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    fn set_auto_rotate_speed(&mut self, radians_per_second: f32) {
        self.auto_rotate_speed = radians_per_second;
    }

    fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();

        if self.auto_rotate {
            self.azimuth += self.auto_rotate_speed * dt;
        }

        let lerp_factor = 1.0 - (-self.settings.smooth_factor * 60.0 * dt).exp();

        let step_azimuth = self.pending_azimuth * lerp_factor;
        let step_elevation = self.pending_elevation * lerp_factor;
        self.pending_azimuth -= step_azimuth;
        self.pending_elevation -= step_elevation;
        self.azimuth = (self.azimuth + step_azimuth).rem_euclid(TAU);
        self.elevation = (self.elevation + step_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);

        self.distance += (self.target_distance - self.distance) * lerp_factor;
    }

    fn reset(&mut self) {
        let target = Vec3::from_array(self.settings.target);
        let offset = Vec3::from_array(self.settings.eye) - target;
        let distance = offset.length().max(self.settings.min_distance);

        self.target = target;
        self.distance = distance;
        self.target_distance = distance;
        self.azimuth = offset.x.atan2(offset.z).rem_euclid(TAU);
        self.elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.pending_azimuth = 0.0;
        self.pending_elevation = 0.0;
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(Vec::<Vec3>::new()).is_none());
        let aabb = Aabb::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 2.0)]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_initial_eye_matches_settings() {
        let orbit = OrbitController::default();
        assert!((orbit.eye() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert_eq!(orbit.target(), Vec3::ZERO);
    }

    #[test]
    fn test_auto_rotate_advances_only_when_enabled() {
        let mut orbit = OrbitController::default();
        let start = orbit.azimuth();
        orbit.update(Duration::from_secs(1));
        assert_eq!(orbit.azimuth(), start);

        orbit.set_auto_rotate(true);
        orbit.update(Duration::from_secs(1));
        assert!((orbit.azimuth() - (start + TAU / 30.0)).abs() < 1e-4);
    }

    #[test]
    fn test_damped_drag_converges() {
        let mut orbit = OrbitController::default();
        orbit.rotate(-100.0, 0.0);
        orbit.update(FRAME);
        let partial = orbit.azimuth();
        assert!(partial > 0.0 && partial < 0.5);
        for _ in 0..300 {
            orbit.update(FRAME);
        }
        assert!((orbit.azimuth() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut orbit = OrbitController::default();
        for _ in 0..200 {
            orbit.zoom(5.0);
            orbit.update(FRAME);
        }
        assert!(orbit.distance() >= orbit.settings().min_distance - 1e-4);
    }

    #[test]
    fn test_reset_restores_initial_view() {
        let mut orbit = OrbitController::default();
        orbit.set_target(Vec3::new(3.0, 1.0, 0.0));
        orbit.rotate(50.0, 20.0);
        orbit.zoom(2.0);
        for _ in 0..30 {
            orbit.update(FRAME);
        }
        orbit.reset();
        assert_eq!(orbit.target(), Vec3::ZERO);
        assert!((orbit.eye() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
    }
}
