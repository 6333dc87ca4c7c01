//! Catalog access - entry listing and configuration document fetching
//!
//! The catalog is a listing document (by default `models.json`, a JSON array
//! of strings) whose entries each name a configuration document. Nothing here
//! retries or caches; failures are surfaced to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::document::ConfigurationDocument;

/// Default name of the catalog listing document
pub const DEFAULT_LISTING: &str = "models.json";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },
    #[error("Document unavailable for {entry}: {reason}")]
    DocumentUnavailable { entry: CatalogEntry, reason: String },
}

impl CatalogError {
    pub fn catalog(reason: impl fmt::Display) -> Self {
        CatalogError::CatalogUnavailable {
            reason: reason.to_string(),
        }
    }

    pub fn document(entry: &CatalogEntry, reason: impl fmt::Display) -> Self {
        CatalogError::DocumentUnavailable {
            entry: entry.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Opaque identifier of a catalog entry (path or name of its document)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntry(String);

impl CatalogEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogEntry {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Parse a listing document into catalog entries
pub fn parse_listing(content: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(content).map_err(CatalogError::catalog)?;
    Ok(entries
        .into_iter()
        .filter(|e| !e.as_str().trim().is_empty())
        .collect())
}

/// Parse a fetched configuration document, tagging failures with the entry
pub fn parse_document(entry: &CatalogEntry, content: &str) -> Result<ConfigurationDocument, CatalogError> {
    ConfigurationDocument::from_json(entry.clone(), content).map_err(|e| CatalogError::document(entry, e))
}

/// Source of catalog entries and their configuration documents
pub trait CatalogSource {
    fn list_entries(&self) -> impl Future<Output = Result<Vec<CatalogEntry>, CatalogError>>;

    fn fetch_document(
        &self,
        entry: &CatalogEntry,
    ) -> impl Future<Output = Result<ConfigurationDocument, CatalogError>>;
}

/// Catalog stored in a directory: a listing file plus the documents it names
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    listing: String,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_listing(root, DEFAULT_LISTING)
    }

    pub fn with_listing(root: impl Into<PathBuf>, listing: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            listing: listing.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an entry to a file below the root, refusing to escape it
    pub fn resolve(&self, entry: &CatalogEntry) -> Option<PathBuf> {
        let relative = Path::new(entry.as_str().trim_start_matches("./"));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl CatalogSource for DirectoryCatalog {
    async fn list_entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let path = self.root.join(&self.listing);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CatalogError::catalog(format!("{}: {}", path.display(), e)))?;
        let entries = parse_listing(&content)?;
        info!(path = %path.display(), count = entries.len(), "Loaded catalog listing");
        Ok(entries)
    }

    async fn fetch_document(&self, entry: &CatalogEntry) -> Result<ConfigurationDocument, CatalogError> {
        let path = self
            .resolve(entry)
            .ok_or_else(|| CatalogError::document(entry, "entry escapes catalog root"))?;
        debug!(entry = %entry, path = %path.display(), "Fetching configuration document");
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CatalogError::document(entry, e))?;
        parse_document(entry, &content)
    }
}
