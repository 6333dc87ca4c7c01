//! Asset loading and scene graph seams
//!
//! The loader turns an asset reference into a decoded asset; the scene graph
//! turns a decoded asset into a node that is actually visible. The composition
//! engine is the only caller of either and owns every staleness decision.

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::camera::Aabb;
use crate::part::PartTransform;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load asset {reference}: {cause}")]
pub struct AssetLoadError {
    pub reference: String,
    pub cause: String,
}

impl AssetLoadError {
    pub fn new(reference: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            reference: reference.into(),
            cause: cause.to_string(),
        }
    }
}

/// Asynchronous asset decoder
///
/// Every returned future resolves or fails exactly once and cannot be
/// cancelled; stale results are discarded by the caller instead.
pub trait AssetLoader {
    type Asset: 'static;

    fn load(&self, reference: &str) -> LocalBoxFuture<'static, Result<Self::Asset, AssetLoadError>>;
}

/// The mutable scene graph that part nodes are attached to
pub trait SceneGraph {
    /// Decoded asset produced by the loader
    type Asset;
    /// Handle to an attached node
    type Node;

    /// Instantiate the asset with the given placement and attach it
    fn attach(&mut self, asset: Self::Asset, transform: &PartTransform) -> Self::Node;

    /// Remove a previously attached node
    fn detach(&mut self, node: Self::Node);

    /// Drop an asset that will never be attached
    fn release(&mut self, asset: Self::Asset) {
        drop(asset);
    }

    /// World-space bounds of an attached node, if it has geometry yet
    fn bounds(&self, node: &Self::Node) -> Option<Aabb>;
}

/// Which slot of the composition a load is destined for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Base,
    Attachment(String),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Base => f.write_str("base"),
            Slot::Attachment(category) => write!(f, "attachment:{}", category),
        }
    }
}

/// Stamp carried by every in-flight load
///
/// `generation` invalidates results across document switches, `sequence`
/// invalidates results superseded by a newer request for the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket {
    pub generation: u64,
    pub slot: Slot,
    pub sequence: u64,
}
