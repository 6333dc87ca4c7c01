//! Idle detection - auto-rotate the camera after a quiet period

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use javis_core::IdleController;

use crate::camera::OrbitCamera;
use crate::scene::SurfaceLayout;
use crate::{JavisSystems, ViewerSettings};

#[derive(Debug, Clone, Resource, Deref, DerefMut)]
pub struct Idle(pub IdleController);

impl FromWorld for Idle {
    fn from_world(world: &mut World) -> Self {
        let controller = world
            .get_resource::<ViewerSettings>()
            .map(|s| IdleController::new(s.viewer.idle_delay()))
            .unwrap_or_default();
        Self(controller)
    }
}

pub struct IdlePlugin;

impl Plugin for IdlePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Idle>()
            .add_systems(Startup, start_idle)
            .add_systems(Update, detect_interaction.in_set(JavisSystems::Input))
            .add_systems(Update, advance_idle.in_set(JavisSystems::Camera).before(crate::camera::apply_camera_transform))
            .add_systems(Last, stop_idle_on_exit);
    }
}

fn start_idle(mut idle: ResMut<Idle>, mut orbit: ResMut<OrbitCamera>) {
    idle.start(&mut orbit.0);
}

/// Pointer press or touch on the 3D surface counts as interaction
fn detect_interaction(
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    layout: Res<SurfaceLayout>,
    mut contexts: EguiContexts,
    mut idle: ResMut<Idle>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let pressed = mouse_button.get_just_pressed().next().is_some() || touch_input.any_just_pressed();
    if !pressed {
        return;
    }
    if contexts.ctx_mut().is_ok_and(|ctx| ctx.wants_pointer_input()) {
        return;
    }

    // Mouse presses outside the drawable surface are ignored
    let on_surface = windows
        .iter()
        .find_map(|w| w.physical_cursor_position())
        .map(|cursor| {
            let surface = layout.surface();
            surface.is_empty()
                || (cursor.x >= surface.x as f32
                    && cursor.y >= surface.y as f32
                    && cursor.x < (surface.x + surface.width) as f32
                    && cursor.y < (surface.y + surface.height) as f32)
        })
        .unwrap_or(true);

    if on_surface {
        idle.on_interaction(&mut orbit.0);
    }
}

fn advance_idle(time: Res<Time>, mut idle: ResMut<Idle>, mut orbit: ResMut<OrbitCamera>) {
    idle.advance(time.delta(), &mut orbit.0);
}

fn stop_idle_on_exit(mut exit: MessageReader<AppExit>, mut idle: ResMut<Idle>) {
    if exit.read().next().is_some() {
        idle.teardown();
    }
}
