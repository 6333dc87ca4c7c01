//! Scene composition engine
//!
//! Owns the composition state for the selected document: the base part and at
//! most one attachment per category. Every asynchronous load it requests is
//! stamped with a [`LoadTicket`]; a completion is installed only while its
//! ticket is still the current one for its slot, otherwise the asset is
//! released without ever touching the scene.
//!
//! The engine performs no I/O. Callers fetch documents and run loads, then
//! report the results back through [`CompositionEngine::document_fetched`] and
//! [`CompositionEngine::complete`].

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogEntry, CatalogError};
use crate::document::ConfigurationDocument;
use crate::loader::{AssetLoadError, LoadTicket, SceneGraph, Slot};
use crate::part::PartDescriptor;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("No configuration document is ready")]
    NotReady,
    #[error("Unknown part {reference} in category {category}")]
    UnknownPart { category: String, reference: String },
}

/// Document-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DocumentPhase {
    #[default]
    Empty,
    DocumentLoading,
    DocumentReady,
}

/// Per-slot state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    Unloaded,
    Loading,
    Loaded,
}

/// A part whose asset is loaded and attached to the scene
#[derive(Debug, Clone)]
pub struct LoadedPart<N> {
    pub descriptor: PartDescriptor,
    pub node: N,
}

#[derive(Debug)]
enum SlotState<N> {
    Loading {
        ticket: LoadTicket,
        descriptor: PartDescriptor,
    },
    Loaded(LoadedPart<N>),
}

impl<N> SlotState<N> {
    fn descriptor(&self) -> &PartDescriptor {
        match self {
            SlotState::Loading { descriptor, .. } => descriptor,
            SlotState::Loaded(part) => &part.descriptor,
        }
    }

    fn status(&self) -> SlotStatus {
        match self {
            SlotState::Loading { .. } => SlotStatus::Loading,
            SlotState::Loaded(_) => SlotStatus::Loaded,
        }
    }
}

/// A load the caller must start and later report through `complete`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub descriptor: PartDescriptor,
}

/// What happened to a finished load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Attached to the scene as the slot's active part
    Installed { slot: Slot, generation: u64 },
    /// Current request failed; the slot is left unloaded
    Failed(AssetLoadError),
    /// Superseded request; nothing was attached
    Discarded,
}

/// The composition engine, generic over the scene graph's node handle
#[derive(Debug)]
pub struct CompositionEngine<N> {
    phase: DocumentPhase,
    pending_entry: Option<CatalogEntry>,
    document: Option<ConfigurationDocument>,
    base: Option<SlotState<N>>,
    attachments: BTreeMap<String, SlotState<N>>,
    generation: u64,
    sequence: u64,
}

impl<N> Default for CompositionEngine<N> {
    fn default() -> Self {
        Self {
            phase: DocumentPhase::Empty,
            pending_entry: None,
            document: None,
            base: None,
            attachments: BTreeMap::new(),
            generation: 0,
            sequence: 0,
        }
    }
}

impl<N> CompositionEngine<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DocumentPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn document(&self) -> Option<&ConfigurationDocument> {
        self.document.as_ref()
    }

    /// Entry being fetched or displayed
    pub fn entry(&self) -> Option<&CatalogEntry> {
        self.document
            .as_ref()
            .map(|d| &d.entry)
            .or(self.pending_entry.as_ref())
    }

    pub fn base(&self) -> Option<&LoadedPart<N>> {
        match &self.base {
            Some(SlotState::Loaded(part)) => Some(part),
            _ => None,
        }
    }

    pub fn base_status(&self) -> SlotStatus {
        self.base
            .as_ref()
            .map(SlotState::status)
            .unwrap_or(SlotStatus::Unloaded)
    }

    pub fn attachment(&self, category: &str) -> Option<&LoadedPart<N>> {
        match self.attachments.get(category) {
            Some(SlotState::Loaded(part)) => Some(part),
            _ => None,
        }
    }

    pub fn attachment_status(&self, category: &str) -> SlotStatus {
        self.attachments
            .get(category)
            .map(SlotState::status)
            .unwrap_or(SlotStatus::Unloaded)
    }

    /// Asset reference selected for a category, whether loaded or still loading
    pub fn selected(&self, category: &str) -> Option<&str> {
        self.attachments
            .get(category)
            .map(|s| s.descriptor().asset_reference.as_str())
    }

    /// Attachments currently attached to the scene
    pub fn active_attachments(&self) -> impl Iterator<Item = (&str, &LoadedPart<N>)> {
        self.attachments.iter().filter_map(|(category, slot)| match slot {
            SlotState::Loaded(part) => Some((category.as_str(), part)),
            SlotState::Loading { .. } => None,
        })
    }

    /// Every node currently attached to the scene, base first
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.base()
            .into_iter()
            .chain(self.active_attachments().map(|(_, part)| part))
            .map(|part| &part.node)
    }

    /// Start selecting a document: drop everything shown and wait for its fetch.
    ///
    /// Returns the new generation; the caller fetches the document and hands
    /// the result to [`Self::document_fetched`] with that generation.
    pub fn begin_document<G>(&mut self, scene: &mut G, entry: CatalogEntry) -> u64
    where
        G: SceneGraph<Node = N>,
    {
        self.generation += 1;
        self.clear(scene);
        self.phase = DocumentPhase::DocumentLoading;
        info!(entry = %entry, generation = self.generation, "Selecting document");
        self.pending_entry = Some(entry);
        self.generation
    }

    /// Report the outcome of a document fetch started by `begin_document`.
    ///
    /// On success the base part load is returned. A result for a superseded
    /// generation is dropped and yields `Ok(None)`.
    pub fn document_fetched(
        &mut self,
        generation: u64,
        result: Result<ConfigurationDocument, CatalogError>,
    ) -> Result<Option<LoadRequest>, CatalogError> {
        if generation != self.generation || self.phase != DocumentPhase::DocumentLoading {
            debug!(generation, current = self.generation, "Discarding stale document fetch");
            return Ok(None);
        }

        self.pending_entry = None;
        match result {
            Ok(document) => {
                info!(
                    entry = %document.entry,
                    parts = document.parts().len(),
                    categories = document.categories().len(),
                    "Document ready"
                );
                let descriptor = document.base().clone();
                self.document = Some(document);
                self.phase = DocumentPhase::DocumentReady;
                Ok(Some(self.request(Slot::Base, descriptor)))
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch configuration document");
                self.phase = DocumentPhase::Empty;
                Err(e)
            }
        }
    }

    /// Select (or clear, with `None`) the attachment shown for a category
    pub fn select_attachment<G>(
        &mut self,
        scene: &mut G,
        category: &str,
        reference: Option<&str>,
    ) -> Result<Option<LoadRequest>, CompositionError>
    where
        G: SceneGraph<Node = N>,
    {
        let document = match (&self.document, self.phase) {
            (Some(document), DocumentPhase::DocumentReady) => document,
            _ => return Err(CompositionError::NotReady),
        };

        let Some(reference) = reference else {
            if let Some(previous) = self.attachments.remove(category) {
                debug!(category, reference = %previous.descriptor().asset_reference, "Clearing attachment");
                Self::discard(scene, previous);
            }
            return Ok(None);
        };

        let descriptor = document
            .find(category, reference)
            .cloned()
            .ok_or_else(|| CompositionError::UnknownPart {
                category: category.to_string(),
                reference: reference.to_string(),
            })?;

        if self.selected(category) == Some(reference) {
            return Ok(None);
        }

        if let Some(previous) = self.attachments.remove(category) {
            debug!(
                category,
                from = %previous.descriptor().asset_reference,
                to = %reference,
                "Replacing attachment"
            );
            Self::discard(scene, previous);
        }

        Ok(Some(self.request(Slot::Attachment(category.to_string()), descriptor)))
    }

    /// Re-request the base part after a failed load
    pub fn reload_base(&mut self) -> Result<Option<LoadRequest>, CompositionError> {
        let descriptor = match (&self.document, self.phase) {
            (Some(document), DocumentPhase::DocumentReady) => document.base().clone(),
            _ => return Err(CompositionError::NotReady),
        };
        if self.base.is_some() {
            return Ok(None);
        }
        Ok(Some(self.request(Slot::Base, descriptor)))
    }

    /// Report a finished load
    pub fn complete<G>(
        &mut self,
        scene: &mut G,
        ticket: &LoadTicket,
        result: Result<G::Asset, AssetLoadError>,
    ) -> LoadOutcome
    where
        G: SceneGraph<Node = N>,
    {
        if !self.is_current(ticket) {
            debug!(slot = %ticket.slot, generation = ticket.generation, "Discarding stale load");
            if let Ok(asset) = result {
                scene.release(asset);
            }
            return LoadOutcome::Discarded;
        }

        let slot_state = match &ticket.slot {
            Slot::Base => self.base.take(),
            Slot::Attachment(category) => self.attachments.remove(category),
        };
        let Some(SlotState::Loading { descriptor, .. }) = slot_state else {
            // is_current guarantees a loading slot
            return LoadOutcome::Discarded;
        };

        match result {
            Ok(asset) => {
                let node = scene.attach(asset, &descriptor.transform);
                info!(slot = %ticket.slot, reference = %descriptor.asset_reference, "Part attached");
                let loaded = SlotState::Loaded(LoadedPart { descriptor, node });
                match &ticket.slot {
                    Slot::Base => self.base = Some(loaded),
                    Slot::Attachment(category) => {
                        self.attachments.insert(category.clone(), loaded);
                    }
                }
                LoadOutcome::Installed {
                    slot: ticket.slot.clone(),
                    generation: ticket.generation,
                }
            }
            Err(e) => {
                warn!(slot = %ticket.slot, error = %e, "Part failed to load");
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Remove every part and forget the document
    pub fn unload_all<G>(&mut self, scene: &mut G)
    where
        G: SceneGraph<Node = N>,
    {
        self.generation += 1;
        self.clear(scene);
        self.phase = DocumentPhase::Empty;
    }

    fn clear<G>(&mut self, scene: &mut G)
    where
        G: SceneGraph<Node = N>,
    {
        if let Some(base) = self.base.take() {
            Self::discard(scene, base);
        }
        for (_, slot) in std::mem::take(&mut self.attachments) {
            Self::discard(scene, slot);
        }
        self.document = None;
        self.pending_entry = None;
    }

    fn discard<G>(scene: &mut G, slot: SlotState<N>)
    where
        G: SceneGraph<Node = N>,
    {
        // In-flight loads are invalidated by removing their slot state
        if let SlotState::Loaded(part) = slot {
            scene.detach(part.node);
        }
    }

    fn request(&mut self, slot: Slot, descriptor: PartDescriptor) -> LoadRequest {
        self.sequence += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            slot,
            sequence: self.sequence,
        };
        debug!(slot = %ticket.slot, reference = %descriptor.asset_reference, sequence = ticket.sequence, "Requesting load");

        let state = SlotState::Loading {
            ticket: ticket.clone(),
            descriptor: descriptor.clone(),
        };
        match &ticket.slot {
            Slot::Base => self.base = Some(state),
            Slot::Attachment(category) => {
                self.attachments.insert(category.clone(), state);
            }
        }

        LoadRequest { ticket, descriptor }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        if ticket.generation != self.generation || self.phase != DocumentPhase::DocumentReady {
            return false;
        }
        let slot = match &ticket.slot {
            Slot::Base => self.base.as_ref(),
            Slot::Attachment(category) => self.attachments.get(category),
        };
        matches!(slot, Some(SlotState::Loading { ticket: current, .. }) if current == ticket)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::Aabb;
    use crate::part::PartTransform;
    use glam::Vec3;
    use std::collections::BTreeMap;

    /// Scene graph that records what is attached; assets are asset references
    #[derive(Debug, Default)]
    pub(crate) struct RecordingScene {
        pub attached: BTreeMap<u32, String>,
        pub released: Vec<String>,
        pub detached: Vec<String>,
        next_id: u32,
    }

    impl RecordingScene {
        pub fn references(&self) -> Vec<&str> {
            let mut refs: Vec<&str> = self.attached.values().map(String::as_str).collect();
            refs.sort();
            refs
        }
    }

    impl SceneGraph for RecordingScene {
        type Asset = String;
        type Node = u32;

        fn attach(&mut self, asset: String, _transform: &PartTransform) -> u32 {
            self.next_id += 1;
            self.attached.insert(self.next_id, asset);
            self.next_id
        }

        fn detach(&mut self, node: u32) {
            let reference = self.attached.remove(&node).expect("detach of unattached node");
            self.detached.push(reference);
        }

        fn release(&mut self, asset: String) {
            self.released.push(asset);
        }

        fn bounds(&self, node: &u32) -> Option<Aabb> {
            self.attached
                .get(node)
                .map(|_| Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)))
        }
    }

    pub(crate) const WEAPON: &str = r#"[
        {"filePath": "base.glb"},
        {"filePath": "A.glb", "category": "scope"},
        {"filePath": "B.glb", "category": "scope"},
        {"filePath": "C.glb", "category": "grip"}
    ]"#;

    fn document(entry: &str) -> ConfigurationDocument {
        ConfigurationDocument::from_json(CatalogEntry::new(entry), WEAPON).unwrap()
    }

    fn ok(request: &LoadRequest) -> Result<String, AssetLoadError> {
        Ok(request.descriptor.asset_reference.clone())
    }

    /// Engine with `D` selected and its base loaded
    fn ready(scene: &mut RecordingScene) -> CompositionEngine<u32> {
        let mut engine = CompositionEngine::new();
        let generation = engine.begin_document(scene, CatalogEntry::new("D"));
        let base = engine
            .document_fetched(generation, Ok(document("D")))
            .unwrap()
            .unwrap();
        engine.complete(scene, &base.ticket, ok(&base));
        engine
    }

    fn select(
        engine: &mut CompositionEngine<u32>,
        scene: &mut RecordingScene,
        category: &str,
        reference: Option<&str>,
    ) -> Option<LoadRequest> {
        engine.select_attachment(scene, category, reference).unwrap()
    }

    fn assert_exclusive(engine: &CompositionEngine<u32>, scene: &RecordingScene) {
        let mut categories: Vec<&str> = engine.active_attachments().map(|(c, _)| c).collect();
        let count = categories.len();
        categories.dedup();
        assert_eq!(categories.len(), count);
        assert_eq!(scene.attached.len(), engine.nodes().count());
    }

    #[test]
    fn test_scope_grip_scenario() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        assert_eq!(scene.references(), vec!["base.glb"]);

        let a = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        engine.complete(&mut scene, &a.ticket, ok(&a));
        assert_eq!(scene.references(), vec!["A.glb", "base.glb"]);

        let b = select(&mut engine, &mut scene, "scope", Some("B.glb")).unwrap();
        // A leaves the scene synchronously, before B is loaded
        assert_eq!(scene.references(), vec!["base.glb"]);
        engine.complete(&mut scene, &b.ticket, ok(&b));
        assert_eq!(scene.references(), vec!["B.glb", "base.glb"]);

        let c = select(&mut engine, &mut scene, "grip", Some("C.glb")).unwrap();
        engine.complete(&mut scene, &c.ticket, ok(&c));
        assert_eq!(scene.references(), vec!["B.glb", "C.glb", "base.glb"]);

        assert!(select(&mut engine, &mut scene, "scope", None).is_none());
        assert_eq!(scene.references(), vec!["C.glb", "base.glb"]);
        assert_exclusive(&engine, &scene);
    }

    #[test]
    fn test_new_document_clears_scene_before_base_request() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let a = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        engine.complete(&mut scene, &a.ticket, ok(&a));

        let generation = engine.begin_document(&mut scene, CatalogEntry::new("E"));
        assert!(scene.attached.is_empty());
        assert_eq!(engine.phase(), DocumentPhase::DocumentLoading);
        assert_eq!(engine.entry().map(CatalogEntry::as_str), Some("E"));

        let base = engine
            .document_fetched(generation, Ok(document("E")))
            .unwrap()
            .unwrap();
        assert_eq!(base.ticket.slot, Slot::Base);
        assert_eq!(base.ticket.generation, generation);
        assert_eq!(engine.phase(), DocumentPhase::DocumentReady);
    }

    #[test]
    fn test_clearing_unloaded_category_is_noop() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let before = scene.detached.len();
        assert_eq!(engine.select_attachment(&mut scene, "grip", None), Ok(None));
        assert_eq!(scene.detached.len(), before);
        assert_eq!(scene.references(), vec!["base.glb"]);
    }

    #[test]
    fn test_stale_generation_never_attaches() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let a = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();

        let generation = engine.begin_document(&mut scene, CatalogEntry::new("D"));
        let base = engine
            .document_fetched(generation, Ok(document("D")))
            .unwrap()
            .unwrap();

        // A from the previous generation resolves after the switch
        assert_eq!(engine.complete(&mut scene, &a.ticket, ok(&a)), LoadOutcome::Discarded);
        assert!(scene.attached.is_empty());
        assert_eq!(scene.released, vec!["A.glb"]);

        engine.complete(&mut scene, &base.ticket, ok(&base));
        assert_eq!(scene.references(), vec!["base.glb"]);
    }

    #[test]
    fn test_superseded_category_request_is_discarded() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let a = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        let b = select(&mut engine, &mut scene, "scope", Some("B.glb")).unwrap();

        // Out of order: B first, then the stale A
        engine.complete(&mut scene, &b.ticket, ok(&b));
        assert_eq!(engine.complete(&mut scene, &a.ticket, ok(&a)), LoadOutcome::Discarded);
        assert_eq!(scene.references(), vec!["B.glb", "base.glb"]);
        assert_eq!(engine.selected("scope"), Some("B.glb"));
        assert_exclusive(&engine, &scene);
    }

    #[test]
    fn test_reselecting_after_switch_back_still_discards_first_request() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let a1 = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        select(&mut engine, &mut scene, "scope", Some("B.glb")).unwrap();
        let a2 = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        assert_ne!(a1.ticket, a2.ticket);

        assert_eq!(engine.complete(&mut scene, &a1.ticket, ok(&a1)), LoadOutcome::Discarded);
        assert!(matches!(
            engine.complete(&mut scene, &a2.ticket, ok(&a2)),
            LoadOutcome::Installed { .. }
        ));
        assert_eq!(scene.references(), vec!["A.glb", "base.glb"]);
    }

    #[test]
    fn test_deselect_while_loading_discards_result() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let c = select(&mut engine, &mut scene, "grip", Some("C.glb")).unwrap();
        assert_eq!(engine.attachment_status("grip"), SlotStatus::Loading);

        select(&mut engine, &mut scene, "grip", None);
        assert_eq!(engine.attachment_status("grip"), SlotStatus::Unloaded);
        assert_eq!(engine.complete(&mut scene, &c.ticket, ok(&c)), LoadOutcome::Discarded);
        assert_eq!(scene.references(), vec!["base.glb"]);
    }

    #[test]
    fn test_same_selection_is_idempotent() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let a = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        assert!(select(&mut engine, &mut scene, "scope", Some("A.glb")).is_none());
        engine.complete(&mut scene, &a.ticket, ok(&a));
        assert!(select(&mut engine, &mut scene, "scope", Some("A.glb")).is_none());
        assert_eq!(scene.references(), vec!["A.glb", "base.glb"]);
    }

    #[test]
    fn test_failed_attachment_leaves_category_unloaded() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let c = select(&mut engine, &mut scene, "grip", Some("C.glb")).unwrap();
        let outcome = engine.complete(&mut scene, &c.ticket, Err(AssetLoadError::new("C.glb", "404")));
        assert!(matches!(outcome, LoadOutcome::Failed(ref e) if e.reference == "C.glb"));
        assert_eq!(engine.attachment_status("grip"), SlotStatus::Unloaded);
        assert_eq!(engine.phase(), DocumentPhase::DocumentReady);
    }

    #[test]
    fn test_failed_base_can_be_reloaded() {
        let mut scene = RecordingScene::default();
        let mut engine = CompositionEngine::new();
        let generation = engine.begin_document(&mut scene, CatalogEntry::new("D"));
        let base = engine.document_fetched(generation, Ok(document("D"))).unwrap().unwrap();
        engine.complete(&mut scene, &base.ticket, Err(AssetLoadError::new("base.glb", "corrupt")));
        assert_eq!(engine.phase(), DocumentPhase::DocumentReady);
        assert!(engine.base().is_none());

        // Attachments remain selectable without a base
        assert!(select(&mut engine, &mut scene, "grip", Some("C.glb")).is_some());

        let retry = engine.reload_base().unwrap().unwrap();
        assert!(engine.reload_base().unwrap().is_none());
        engine.complete(&mut scene, &retry.ticket, ok(&retry));
        assert_eq!(engine.base().map(|b| b.descriptor.asset_reference.as_str()), Some("base.glb"));
    }

    #[test]
    fn test_document_failure_returns_to_empty() {
        let mut scene = RecordingScene::default();
        let mut engine: CompositionEngine<u32> = CompositionEngine::new();
        let generation = engine.begin_document(&mut scene, CatalogEntry::new("missing"));
        let err = CatalogError::document(&CatalogEntry::new("missing"), "not found");
        assert!(engine.document_fetched(generation, Err(err)).is_err());
        assert_eq!(engine.phase(), DocumentPhase::Empty);
        assert_eq!(
            engine.select_attachment(&mut scene, "scope", Some("A.glb")),
            Err(CompositionError::NotReady)
        );
    }

    #[test]
    fn test_stale_document_fetch_is_dropped() {
        let mut scene = RecordingScene::default();
        let mut engine: CompositionEngine<u32> = CompositionEngine::new();
        let first = engine.begin_document(&mut scene, CatalogEntry::new("D"));
        let second = engine.begin_document(&mut scene, CatalogEntry::new("E"));

        assert_eq!(engine.document_fetched(first, Ok(document("D"))).unwrap(), None);
        assert_eq!(engine.phase(), DocumentPhase::DocumentLoading);
        let base = engine.document_fetched(second, Ok(document("E"))).unwrap();
        assert!(base.is_some());
        assert_eq!(engine.document().map(|d| d.entry.as_str()), Some("E"));
    }

    #[test]
    fn test_unknown_part_rejected_without_mutation() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let a = select(&mut engine, &mut scene, "scope", Some("A.glb")).unwrap();
        engine.complete(&mut scene, &a.ticket, ok(&a));

        let err = engine
            .select_attachment(&mut scene, "scope", Some("C.glb"))
            .unwrap_err();
        assert!(matches!(err, CompositionError::UnknownPart { .. }));
        assert_eq!(scene.references(), vec!["A.glb", "base.glb"]);
    }

    #[test]
    fn test_unload_all_invalidates_in_flight_loads() {
        let mut scene = RecordingScene::default();
        let mut engine = ready(&mut scene);
        let c = select(&mut engine, &mut scene, "grip", Some("C.glb")).unwrap();

        engine.unload_all(&mut scene);
        assert!(scene.attached.is_empty());
        assert_eq!(engine.phase(), DocumentPhase::Empty);
        assert_eq!(engine.complete(&mut scene, &c.ticket, ok(&c)), LoadOutcome::Discarded);
        assert!(scene.attached.is_empty());
    }
}
