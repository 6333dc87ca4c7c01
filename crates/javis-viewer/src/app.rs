//! Bevy application setup

use bevy::asset::AssetMetaCheck;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use javis_core::Config;
use javis_scene::{CatalogPaths, JavisScenePlugin, ViewerSettings};

/// Assemble the viewer app
pub fn build(config: Config, level: Level) -> App {
    let asset_root = CatalogPaths::asset_file_path(&config.catalog);

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.viewer.title.clone(),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_root,
                // Catalog servers don't ship .meta files
                meta_check: AssetMetaCheck::Never,
                ..default()
            })
            .set(LogPlugin {
                level,
                filter: "wgpu=error,naga=warn".to_string(),
                ..default()
            }),
    )
    // Picking must be added before EguiPlugin so it can detect PickingPlugin
    .add_plugins(DefaultPickingPlugins)
    .add_plugins(EguiPlugin::default())
    .add_plugins(JavisScenePlugin::new(config))
    .add_systems(Startup, log_startup);
    app
}

fn log_startup(settings: Res<ViewerSettings>) {
    info!("Javis v{}", env!("CARGO_PKG_VERSION"));
    info!(
        catalog = %settings.catalog.root,
        listing = %settings.catalog.listing,
        idle_delay_ms = settings.viewer.idle_delay_ms,
        "Configuration loaded"
    );
}
