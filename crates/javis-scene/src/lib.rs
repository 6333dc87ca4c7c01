//! Javis Scene - Bevy front end for the part composition engine
//!
//! Binds `javis-core` to a real renderer: glTF parts are loaded through the
//! `AssetServer`, spawned as scene roots and framed by an orbit camera. The
//! selection panel is drawn with egui and talks to the engine through
//! [`SelectionRequest`] messages only.

pub mod camera;
pub mod catalog;
pub mod framing;
pub mod idle;
pub mod parts;
pub mod scene;
pub mod ui;

use bevy::prelude::*;
use javis_core::{CatalogEntry, Config};

/// Selection events emitted by the UI and consumed by the composition systems
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SelectionRequest {
    Document(CatalogEntry),
    Attachment {
        category: String,
        reference: Option<String>,
    },
    ReloadBase,
}

/// Loaded `javis.toml`
#[derive(Resource, Debug, Clone, Deref)]
pub struct ViewerSettings(pub Config);

/// Last user-facing status line
#[derive(Resource, Debug, Clone, Default)]
pub struct ViewerStatus {
    pub message: Option<String>,
    pub is_error: bool,
}

impl ViewerStatus {
    pub fn info(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.is_error = false;
    }

    pub fn error(&mut self, message: impl ToString) {
        self.message = Some(message.to_string());
        self.is_error = true;
    }
}

/// Ordering of the per-frame work
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavisSystems {
    /// Pointer and keyboard input
    Input,
    /// Selection handling and load completion
    Composition,
    /// Idle timer, camera update and transform sync
    Camera,
}

/// Plugin that sets up the whole viewer scene
pub struct JavisScenePlugin {
    pub config: Config,
}

impl JavisScenePlugin {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Plugin for JavisScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ViewerSettings(self.config.clone()))
            .init_resource::<ViewerStatus>()
            .add_message::<SelectionRequest>()
            .configure_sets(
                Update,
                (JavisSystems::Input, JavisSystems::Composition, JavisSystems::Camera).chain(),
            )
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(catalog::CatalogPlugin)
            .add_plugins(parts::PartsPlugin)
            .add_plugins(framing::FramingPlugin)
            .add_plugins(idle::IdlePlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use camera::{MainCamera, OrbitCamera};
pub use catalog::{CatalogPaths, CatalogState, RawJson};
pub use parts::{Composition, PartNode};
