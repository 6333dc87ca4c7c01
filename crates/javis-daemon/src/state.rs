//! Shared server state

use javis_core::{Config, DirectoryCatalog};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Catalog root is not a directory: {0}")]
    MissingRoot(String),
    #[error("Catalog root must be a local directory, got URL {0}")]
    RemoteRoot(String),
}

pub struct AppState {
    pub catalog: DirectoryCatalog,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, StateError> {
        let root = config.daemon_root().to_string();
        if root.starts_with("http://") || root.starts_with("https://") {
            return Err(StateError::RemoteRoot(root));
        }
        if !Path::new(&root).is_dir() {
            return Err(StateError::MissingRoot(root));
        }
        let catalog = DirectoryCatalog::with_listing(&root, config.catalog.listing.clone());
        Ok(Arc::new(Self { catalog, config }))
    }

    pub fn root(&self) -> &Path {
        self.catalog.root()
    }
}
