//! Scene setup - camera, lights, clear color and the drawable surface

use bevy::camera::Viewport;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use javis_core::{Config, RenderLoop};

use crate::camera::{apply_camera_transform, MainCamera, OrbitCamera};
use crate::{JavisSystems, ViewerSettings};

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Drawable surface layout and frame counter
#[derive(Debug, Clone, Resource, Deref, DerefMut)]
pub struct SurfaceLayout(pub RenderLoop);

impl FromWorld for SurfaceLayout {
    fn from_world(world: &mut World) -> Self {
        let fraction = world
            .get_resource::<ViewerSettings>()
            .map(|s| s.viewer.viewport_fraction)
            .unwrap_or(javis_core::render::DEFAULT_VIEWPORT_FRACTION);
        Self(RenderLoop::new(fraction))
    }
}

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SurfaceLayout>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (resize_viewport, advance_frame)
                    .chain()
                    .in_set(JavisSystems::Camera)
                    .before(apply_camera_transform),
            );
    }
}

fn setup_scene(
    mut commands: Commands,
    settings: Option<Res<ViewerSettings>>,
    orbit: Res<OrbitCamera>,
) {
    let config = settings.map(|s| s.0.clone()).unwrap_or_default();
    let projection = config.camera.projection;

    commands.insert_resource(clear_color(&config));

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: projection.fov_degrees.to_radians(),
            near: projection.near,
            far: projection.far,
            ..default()
        }),
        Transform::from_translation(orbit.eye()).looking_at(orbit.target(), Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    // Directional light from above
    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 10.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
        MainDirectionalLight,
    ));
}

fn clear_color(config: &Config) -> ClearColor {
    let [r, g, b] = config.viewer.clear_color;
    ClearColor(Color::linear_rgb(r, g, b))
}

/// Keep the camera viewport at the configured fraction of the window
fn resize_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut layout: ResMut<SurfaceLayout>,
    mut cameras: Query<&mut Camera, With<MainCamera>>,
) {
    let Ok(window) = windows.single() else { return };
    if !layout.resize(window.physical_width(), window.physical_height()) {
        return;
    }

    let surface = layout.surface();
    for mut camera in &mut cameras {
        camera.viewport = if surface.is_empty() {
            None
        } else {
            Some(Viewport {
                physical_position: UVec2::new(surface.x, surface.y),
                physical_size: UVec2::new(surface.width, surface.height),
                ..default()
            })
        };
    }
}

/// Per-frame camera update (auto-rotation and damping)
fn advance_frame(time: Res<Time>, mut layout: ResMut<SurfaceLayout>, mut orbit: ResMut<OrbitCamera>) {
    layout.frame(time.delta(), &mut orbit.0);
}
