//! Catalog access through the Bevy asset server
//!
//! The listing and the configuration documents are plain JSON files fetched
//! with the same `AssetServer` that loads the models, so a catalog can live in
//! a local directory or behind an `http(s)://` base URL.

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext, LoadState};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use javis_core::catalog::{parse_document, parse_listing};
use javis_core::config::CatalogConfig;
use javis_core::{CatalogEntry, CatalogError};
use thiserror::Error;
use tracing::{error, info};

use crate::parts::{Composition, PartLoader};
use crate::{JavisSystems, SelectionRequest, ViewerSettings, ViewerStatus};

/// Unparsed JSON text
#[derive(Asset, TypePath, Debug, Clone)]
pub struct RawJson(pub String);

#[derive(Error, Debug)]
pub enum RawJsonError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid UTF-8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

#[derive(Default, TypePath)]
struct RawJsonLoader;

impl AssetLoader for RawJsonLoader {
    type Asset = RawJson;
    type Settings = ();
    type Error = RawJsonError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        Ok(RawJson(String::from_utf8(bytes)?))
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// Where catalog files live relative to the asset server
#[derive(Debug, Clone, Resource)]
pub struct CatalogPaths {
    /// Base URL when the catalog is remote; local catalogs are the asset root itself
    base_url: Option<String>,
    listing: String,
}

impl CatalogPaths {
    pub fn new(config: &CatalogConfig) -> Self {
        let base_url = is_url(&config.root).then(|| config.root.trim_end_matches('/').to_string());
        Self {
            base_url,
            listing: config.listing.clone(),
        }
    }

    /// Directory the `AssetPlugin` should read from
    pub fn asset_file_path(config: &CatalogConfig) -> String {
        if is_url(&config.root) {
            "assets".to_string()
        } else {
            config.root.clone()
        }
    }

    pub fn listing(&self) -> String {
        self.resolve(&self.listing)
    }

    /// Asset path for a catalog-relative reference
    pub fn resolve(&self, reference: &str) -> String {
        if is_url(reference) {
            return reference.to_string();
        }
        let relative = reference.trim_start_matches("./").trim_start_matches('/');
        match &self.base_url {
            Some(base) => format!("{}/{}", base, relative),
            None => relative.to_string(),
        }
    }
}

impl FromWorld for CatalogPaths {
    fn from_world(world: &mut World) -> Self {
        world
            .get_resource::<ViewerSettings>()
            .map(|s| Self::new(&s.catalog))
            .unwrap_or_else(|| Self::new(&CatalogConfig::default()))
    }
}

fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

struct PendingDocument {
    generation: u64,
    entry: CatalogEntry,
    handle: Handle<RawJson>,
}

/// Catalog listing and the document fetch in flight
#[derive(Resource, Default)]
pub struct CatalogState {
    pub entries: Vec<CatalogEntry>,
    listing: Option<Handle<RawJson>>,
    document: Option<PendingDocument>,
}

impl CatalogState {
    /// Track the fetch of `entry` for a document generation, replacing any older one
    pub fn fetch_document(
        &mut self,
        generation: u64,
        entry: CatalogEntry,
        asset_server: &AssetServer,
        paths: &CatalogPaths,
    ) {
        let handle = asset_server.load(paths.resolve(entry.as_str()));
        self.document = Some(PendingDocument {
            generation,
            entry,
            handle,
        });
    }

    pub fn is_fetching(&self) -> bool {
        self.document.is_some()
    }

    pub fn listing_pending(&self) -> bool {
        self.listing.is_some()
    }
}

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<RawJson>()
            .register_asset_loader(RawJsonLoader)
            .init_resource::<CatalogPaths>()
            .init_resource::<CatalogState>()
            .add_systems(Startup, request_listing)
            .add_systems(
                Update,
                (poll_listing, poll_document)
                    .chain()
                    .in_set(JavisSystems::Composition)
                    .after(crate::parts::apply_selections),
            );
    }
}

fn request_listing(
    mut catalog: ResMut<CatalogState>,
    asset_server: Res<AssetServer>,
    paths: Res<CatalogPaths>,
) {
    let path = paths.listing();
    info!(path = %path, "Requesting catalog listing");
    catalog.listing = Some(asset_server.load(path));
}

fn poll_listing(
    mut catalog: ResMut<CatalogState>,
    asset_server: Res<AssetServer>,
    documents: Res<Assets<RawJson>>,
    settings: Option<Res<ViewerSettings>>,
    mut status: ResMut<ViewerStatus>,
    mut requests: MessageWriter<SelectionRequest>,
) {
    let Some(handle) = catalog.listing.as_ref() else { return };

    let result = match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => match documents.get(handle) {
            Some(raw) => parse_listing(&raw.0),
            None => Err(CatalogError::catalog("listing asset missing")),
        },
        Some(LoadState::Failed(err)) => Err(CatalogError::catalog(err)),
        _ => return,
    };
    catalog.listing = None;

    match result {
        Ok(entries) => {
            info!(count = entries.len(), "Catalog listing loaded");
            let initial = settings
                .and_then(|s| s.catalog.initial.clone())
                .map(CatalogEntry::new)
                .or_else(|| entries.first().cloned());
            catalog.entries = entries;
            if let Some(entry) = initial {
                requests.write(SelectionRequest::Document(entry));
            }
        }
        Err(e) => {
            error!(error = %e, "Catalog unavailable");
            status.error(e);
        }
    }
}

/// Hand a finished document fetch to the engine and start its base part load
fn poll_document(
    mut catalog: ResMut<CatalogState>,
    documents: Res<Assets<RawJson>>,
    mut composition: ResMut<Composition>,
    mut loader: PartLoader,
    mut status: ResMut<ViewerStatus>,
) {
    let Some(pending) = catalog.document.as_ref() else { return };

    let result = match loader.asset_server.get_load_state(pending.handle.id()) {
        Some(LoadState::Loaded) => match documents.get(&pending.handle) {
            Some(raw) => parse_document(&pending.entry, &raw.0),
            None => Err(CatalogError::document(&pending.entry, "document asset missing")),
        },
        Some(LoadState::Failed(err)) => Err(CatalogError::document(&pending.entry, err)),
        _ => return,
    };
    let Some(pending) = catalog.document.take() else { return };

    match composition.document_fetched(pending.generation, result) {
        Ok(Some(request)) => {
            status.info(format!("Loading {}", pending.entry));
            loader.start(request);
        }
        Ok(None) => {}
        Err(e) => status.error(e),
    }
}
