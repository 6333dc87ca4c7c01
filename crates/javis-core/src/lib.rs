//! Javis Core - Part composition engine for the Javis 3D viewer
//!
//! This crate provides the renderer-agnostic pieces of the viewer:
//! - Catalog access and configuration documents (base part + categorized attachments)
//! - The composition engine keeping the scene consistent with the latest selection
//! - Camera auto-framing, orbit camera model and idle auto-rotation
//! - An async driver running loads on a single task
//! - `javis.toml` configuration

pub mod camera;
pub mod catalog;
pub mod composition;
pub mod config;
pub mod document;
pub mod driver;
pub mod framing;
pub mod idle;
pub mod loader;
pub mod part;
pub mod render;

pub use camera::{Aabb, CameraControl, OrbitController, OrbitSettings};
pub use catalog::{CatalogEntry, CatalogError, CatalogSource, DirectoryCatalog};
pub use composition::{
    CompositionEngine, CompositionError, DocumentPhase, LoadOutcome, LoadRequest, LoadedPart, SlotStatus,
};
pub use config::{load_config, Config, ConfigError};
pub use document::{CategoryOptions, ConfigurationDocument, DocumentError};
pub use driver::{Viewer, ViewerOptions};
pub use framing::{AutoFramer, CameraFrame};
pub use idle::{IdleController, IdleTimer, InteractionState};
pub use loader::{AssetLoadError, AssetLoader, LoadTicket, SceneGraph, Slot};
pub use part::{PartDescriptor, PartRecord, PartRole, PartTransform, VectorRecord};
pub use render::{Projection, RenderLoop, SurfaceRect};
