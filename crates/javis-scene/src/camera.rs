//! Camera controls and orbit navigation

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use javis_core::OrbitController;

use crate::{JavisSystems, ViewerSettings};

/// Pixels per scroll line for pixel-precise wheels
const PIXELS_PER_LINE: f32 = 100.0;

/// Orbit controller driving the main camera
#[derive(Debug, Clone, Resource, Deref, DerefMut)]
pub struct OrbitCamera(pub OrbitController);

impl FromWorld for OrbitCamera {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<ViewerSettings>()
            .map(|s| s.orbit_settings())
            .unwrap_or_default();
        Self(OrbitController::new(settings))
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCamera>()
            .add_systems(Update, orbit_input.in_set(JavisSystems::Input))
            .add_systems(Update, apply_camera_transform.in_set(JavisSystems::Camera));
    }
}

/// Left drag (or one-finger drag) orbits, the wheel zooms
fn orbit_input(
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut contexts: EguiContexts,
    mut orbit: ResMut<OrbitCamera>,
) {
    let drag: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll: f32 = mouse_wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / PIXELS_PER_LINE,
        })
        .sum();

    // Check if egui wants the mouse - if so, don't process camera controls
    if contexts.ctx_mut().is_ok_and(|ctx| ctx.wants_pointer_input()) {
        return;
    }

    if mouse_button.pressed(MouseButton::Left) && drag != Vec2::ZERO {
        orbit.rotate(drag.x, drag.y);
    }

    if touch_input.iter().count() == 1 {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                orbit.rotate(delta.x, delta.y);
            }
        }
    }

    if scroll != 0.0 {
        orbit.zoom(scroll);
    }
}

/// Copy the orbit eye and target into the camera transform
pub(crate) fn apply_camera_transform(
    orbit: Res<OrbitCamera>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    for mut transform in &mut cameras {
        *transform = Transform::from_translation(orbit.eye()).looking_at(orbit.target(), Vec3::Y);
    }
}
