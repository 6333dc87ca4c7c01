//! Single-task async driver
//!
//! `Viewer` wires the composition engine to a catalog source, an asset loader,
//! a scene graph and a camera. Loads run as futures on the caller's task and
//! complete in whatever order they resolve; the engine's tickets decide which
//! of them still reach the scene.

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

use crate::camera::CameraControl;
use crate::catalog::{CatalogEntry, CatalogError, CatalogSource};
use crate::composition::{CompositionEngine, CompositionError, LoadOutcome, LoadRequest};
use crate::config::Config;
use crate::framing::AutoFramer;
use crate::idle::{IdleController, DEFAULT_IDLE_DELAY};
use crate::loader::{AssetLoadError, AssetLoader, LoadTicket, SceneGraph, Slot};
use crate::render::{RenderLoop, DEFAULT_VIEWPORT_FRACTION};

type PendingLoad<A> = LocalBoxFuture<'static, (LoadTicket, Result<A, AssetLoadError>)>;

/// Runtime options for a [`Viewer`]
#[derive(Debug, Clone, Copy)]
pub struct ViewerOptions {
    pub idle_delay: Duration,
    pub viewport_fraction: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            idle_delay: DEFAULT_IDLE_DELAY,
            viewport_fraction: DEFAULT_VIEWPORT_FRACTION,
        }
    }
}

impl From<&Config> for ViewerOptions {
    fn from(config: &Config) -> Self {
        Self {
            idle_delay: config.viewer.idle_delay(),
            viewport_fraction: config.viewer.viewport_fraction,
        }
    }
}

pub struct Viewer<C, L, G, K>
where
    L: AssetLoader,
    G: SceneGraph<Asset = L::Asset>,
{
    catalog: C,
    loader: L,
    scene: G,
    camera: K,
    engine: CompositionEngine<G::Node>,
    framer: AutoFramer,
    idle: IdleController,
    render: RenderLoop,
    pending: FuturesUnordered<PendingLoad<L::Asset>>,
}

impl<C, L, G, K> Viewer<C, L, G, K>
where
    C: CatalogSource,
    L: AssetLoader,
    G: SceneGraph<Asset = L::Asset>,
    K: CameraControl,
{
    pub fn new(catalog: C, loader: L, scene: G, mut camera: K, options: ViewerOptions) -> Self {
        let mut idle = IdleController::new(options.idle_delay);
        idle.start(&mut camera);
        Self {
            catalog,
            loader,
            scene,
            camera,
            engine: CompositionEngine::new(),
            framer: AutoFramer::new(),
            idle,
            render: RenderLoop::new(options.viewport_fraction),
            pending: FuturesUnordered::new(),
        }
    }

    pub fn engine(&self) -> &CompositionEngine<G::Node> {
        &self.engine
    }

    pub fn scene(&self) -> &G {
        &self.scene
    }

    pub fn camera(&self) -> &K {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut K {
        &mut self.camera
    }

    pub fn framer(&self) -> &AutoFramer {
        &self.framer
    }

    pub fn idle(&self) -> &IdleController {
        &self.idle
    }

    pub fn render(&self) -> &RenderLoop {
        &self.render
    }

    /// Loads started but not yet completed, stale ones included
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub async fn list_entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.catalog.list_entries().await
    }

    /// Switch to another catalog entry and request its base part
    pub async fn select_document(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        let generation = self.engine.begin_document(&mut self.scene, entry.clone());
        self.framer.rearm(generation, &mut self.camera);

        let fetched = self.catalog.fetch_document(&entry).await;
        if let Some(request) = self.engine.document_fetched(generation, fetched)? {
            self.spawn(request);
        }
        Ok(())
    }

    pub fn select_attachment(&mut self, category: &str, reference: Option<&str>) -> Result<(), CompositionError> {
        if let Some(request) = self.engine.select_attachment(&mut self.scene, category, reference)? {
            self.spawn(request);
        }
        Ok(())
    }

    pub fn reload_base(&mut self) -> Result<(), CompositionError> {
        if let Some(request) = self.engine.reload_base()? {
            self.spawn(request);
        }
        Ok(())
    }

    /// Pointer or touch input on the viewport
    pub fn interaction(&mut self) {
        self.idle.on_interaction(&mut self.camera);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.render.resize(width, height)
    }

    /// One frame: install finished loads, advance the idle timer and the camera
    pub fn tick(&mut self, dt: Duration) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Some(Some((ticket, result))) = self.pending.next().now_or_never() {
            outcomes.push(self.finish(ticket, result));
        }
        self.idle.advance(dt, &mut self.camera);
        self.render.frame(dt, &mut self.camera);
        outcomes
    }

    /// Wait for the next load to finish and process it
    pub async fn next_outcome(&mut self) -> Option<LoadOutcome> {
        let (ticket, result) = self.pending.next().await?;
        Some(self.finish(ticket, result))
    }

    /// Wait until every in-flight load has finished
    pub async fn settle(&mut self) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_outcome().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Remove everything from the scene and stop the idle timer
    pub fn teardown(&mut self) {
        self.engine.unload_all(&mut self.scene);
        self.idle.teardown();
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "Dropping in-flight loads");
        }
        self.pending = FuturesUnordered::new();
    }

    fn spawn(&mut self, request: LoadRequest) {
        let LoadRequest { ticket, descriptor } = request;
        let load = self.loader.load(&descriptor.asset_reference);
        self.pending.push(async move { (ticket, load.await) }.boxed_local());
    }

    fn finish(&mut self, ticket: LoadTicket, result: Result<L::Asset, AssetLoadError>) -> LoadOutcome {
        let outcome = self.engine.complete(&mut self.scene, &ticket, result);
        match &outcome {
            LoadOutcome::Installed { slot: Slot::Base, generation } => {
                if let Some(base) = self.engine.base() {
                    let bounds = self.scene.bounds(&base.node);
                    self.framer.on_base_loaded(
                        *generation,
                        bounds,
                        base.descriptor.transform.position,
                        &mut self.camera,
                    );
                }
            }
            LoadOutcome::Failed(e) if ticket.slot == Slot::Base => {
                warn!(error = %e, "Base part unavailable, document stays selected");
            }
            _ => {}
        }
        outcome
    }
}
