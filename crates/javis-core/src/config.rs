//! Configuration loading (`javis.toml`)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::camera::OrbitSettings;
use crate::catalog::DEFAULT_LISTING;
use crate::render::{Projection, DEFAULT_VIEWPORT_FRACTION};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Milliseconds without interaction before auto-rotation starts
    #[serde(default = "default_idle_delay_ms")]
    pub idle_delay_ms: u64,
    /// Radians per second
    #[serde(default = "default_auto_rotate_speed")]
    pub auto_rotate_speed: f32,
    /// Orbit damping strength
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f32,
    /// Share of the window covered by the 3D surface
    #[serde(default = "default_viewport_fraction")]
    pub viewport_fraction: f32,
    /// Linear RGB
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            idle_delay_ms: default_idle_delay_ms(),
            auto_rotate_speed: default_auto_rotate_speed(),
            smooth_factor: default_smooth_factor(),
            viewport_fraction: default_viewport_fraction(),
            clear_color: default_clear_color(),
            title: default_title(),
        }
    }
}

impl ViewerConfig {
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}

fn default_idle_delay_ms() -> u64 {
    2000
}

fn default_auto_rotate_speed() -> f32 {
    OrbitSettings::default().auto_rotate_speed
}

fn default_smooth_factor() -> f32 {
    OrbitSettings::default().smooth_factor
}

fn default_viewport_fraction() -> f32 {
    DEFAULT_VIEWPORT_FRACTION
}

fn default_clear_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_title() -> String {
    "Javis 3D".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub projection: Projection,
    #[serde(default = "default_eye")]
    pub eye: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    /// Radians per dragged pixel
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            eye: default_eye(),
            target: [0.0; 3],
            sensitivity: default_sensitivity(),
            zoom_speed: default_zoom_speed(),
        }
    }
}

fn default_eye() -> [f32; 3] {
    [0.0, 0.0, 10.0]
}

fn default_sensitivity() -> f32 {
    OrbitSettings::default().sensitivity
}

fn default_zoom_speed() -> f32 {
    OrbitSettings::default().zoom_speed
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory or base URL holding the listing, documents and models
    #[serde(default = "default_catalog_root")]
    pub root: String,
    #[serde(default = "default_listing")]
    pub listing: String,
    /// Entry selected at startup
    #[serde(default)]
    pub initial: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: default_catalog_root(),
            listing: default_listing(),
            initial: None,
        }
    }
}

fn default_catalog_root() -> String {
    "assets".to_string()
}

fn default_listing() -> String {
    DEFAULT_LISTING.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for the catalog server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory served by the daemon; defaults to `catalog.root`
    #[serde(default)]
    pub catalog_root: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            catalog_root: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8090".to_string()
}

impl Config {
    /// Orbit controller settings assembled from `[viewer]` and `[camera]`
    pub fn orbit_settings(&self) -> OrbitSettings {
        OrbitSettings {
            eye: self.camera.eye,
            target: self.camera.target,
            sensitivity: self.camera.sensitivity,
            zoom_speed: self.camera.zoom_speed,
            smooth_factor: self.viewer.smooth_factor,
            auto_rotate_speed: self.viewer.auto_rotate_speed,
            ..OrbitSettings::default()
        }
    }

    /// Directory the daemon serves
    pub fn daemon_root(&self) -> &str {
        self.daemon
            .catalog_root
            .as_deref()
            .unwrap_or(&self.catalog.root)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.viewer.viewport_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "viewer.viewport_fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        let projection = &self.camera.projection;
        if projection.near <= 0.0 || projection.far <= projection.near {
            return Err(ConfigError::Invalid(format!(
                "camera.projection needs 0 < near < far, got near={} far={}",
                projection.near, projection.far
            )));
        }
        if self.catalog.listing.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog.listing is empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults when it is missing
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("Configuration file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;

    info!("Loaded configuration from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(Path::new("/nonexistent/javis.toml")).unwrap();
        assert_eq!(config.viewer.idle_delay(), Duration::from_millis(2000));
        assert_eq!(config.catalog.listing, "models.json");
        assert_eq!(config.camera.projection.fov_degrees, 75.0);
        assert_eq!(config.daemon_root(), "assets");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[viewer]
idle_delay_ms = 500

[camera.projection]
fov_degrees = 60.0

[daemon]
catalog_root = "/srv/catalog"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.viewer.idle_delay_ms, 500);
        assert_eq!(config.viewer.viewport_fraction, 0.85);
        assert_eq!(config.camera.projection.fov_degrees, 60.0);
        assert_eq!(config.camera.projection.far, 1000.0);
        assert_eq!(config.daemon_root(), "/srv/catalog");
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[viewer]\nviewport_fraction = 1.5").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_orbit_settings_follow_config() {
        let mut config = Config::default();
        config.viewer.auto_rotate_speed = 1.0;
        config.camera.eye = [0.0, 2.0, 5.0];
        let orbit = config.orbit_settings();
        assert_eq!(orbit.auto_rotate_speed, 1.0);
        assert_eq!(orbit.eye, [0.0, 2.0, 5.0]);
        assert_eq!(orbit.max_distance, OrbitSettings::default().max_distance);
    }
}
