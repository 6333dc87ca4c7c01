//! Part loading and scene composition
//!
//! The `Composition` resource owns the engine; entities are only spawned or
//! despawned through [`EntityScene`], its `SceneGraph` over `Commands`.
//! glTF handles are polled every frame and handed back to the engine with the
//! ticket they were requested under.

use bevy::asset::LoadState;
use bevy::ecs::system::SystemParam;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use javis_core::{
    AssetLoadError, CompositionEngine, LoadOutcome, LoadRequest, LoadTicket, PartTransform, SceneGraph, Slot,
};
use tracing::{debug, warn};

use crate::camera::OrbitCamera;
use crate::catalog::{CatalogPaths, CatalogState};
use crate::framing::Framer;
use crate::{JavisSystems, SelectionRequest, ViewerStatus};

/// Composition engine with entity nodes
#[derive(Debug, Default, Resource, Deref, DerefMut)]
pub struct Composition(pub CompositionEngine<Entity>);

/// Component on every spawned part root
#[derive(Component, Debug, Clone)]
pub struct PartNode {
    pub slot: Slot,
    pub asset_reference: String,
}

/// Part load waiting on the asset server
#[derive(Debug)]
pub struct PendingPart {
    pub ticket: LoadTicket,
    pub reference: String,
    pub handle: Handle<Gltf>,
}

#[derive(Resource, Default, Deref, DerefMut)]
pub struct PendingParts(pub Vec<PendingPart>);

/// Starts glTF loads for engine requests
#[derive(SystemParam)]
pub struct PartLoader<'w> {
    pub asset_server: Res<'w, AssetServer>,
    pub paths: Res<'w, CatalogPaths>,
    pub pending: ResMut<'w, PendingParts>,
}

impl PartLoader<'_> {
    pub fn start(&mut self, request: LoadRequest) {
        let LoadRequest { ticket, descriptor } = request;
        let path = self.paths.resolve(&descriptor.asset_reference);
        debug!(slot = %ticket.slot, path = %path, "Starting part load");
        let handle: Handle<Gltf> = self.asset_server.load(path);
        self.pending.push(PendingPart {
            ticket,
            reference: descriptor.asset_reference,
            handle,
        });
    }
}

/// Scene graph backed by ECS commands
pub struct EntityScene<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
}

impl<'a, 'w, 's> EntityScene<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>) -> Self {
        Self { commands }
    }
}

impl SceneGraph for EntityScene<'_, '_, '_> {
    type Asset = Handle<Scene>;
    type Node = Entity;

    fn attach(&mut self, asset: Handle<Scene>, transform: &PartTransform) -> Entity {
        self.commands
            .spawn((SceneRoot(asset), part_transform(transform)))
            .id()
    }

    fn detach(&mut self, node: Entity) {
        self.commands.entity(node).despawn();
    }

    /// Scene instances spawn after this frame; bounds are read by the framing systems
    fn bounds(&self, _node: &Entity) -> Option<javis_core::Aabb> {
        None
    }
}

/// Scale, rotation (X, then Y, then Z) and translation of a part
pub fn part_transform(transform: &PartTransform) -> Transform {
    Transform {
        translation: transform.position,
        rotation: transform.rotation(),
        scale: transform.scale,
    }
}

pub struct PartsPlugin;

impl Plugin for PartsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Composition>()
            .init_resource::<PendingParts>()
            .add_systems(
                Update,
                (apply_selections, poll_part_loads)
                    .chain()
                    .in_set(JavisSystems::Composition),
            )
            .add_systems(Last, teardown_on_exit);
    }
}

/// Apply UI selection requests to the engine
pub(crate) fn apply_selections(
    mut requests: MessageReader<SelectionRequest>,
    mut commands: Commands,
    mut composition: ResMut<Composition>,
    mut catalog: ResMut<CatalogState>,
    mut loader: PartLoader,
    mut framer: ResMut<Framer>,
    mut orbit: ResMut<OrbitCamera>,
    mut status: ResMut<ViewerStatus>,
) {
    for request in requests.read() {
        let mut scene = EntityScene::new(&mut commands);
        match request {
            SelectionRequest::Document(entry) => {
                let generation = composition.begin_document(&mut scene, entry.clone());
                framer.rearm(generation, &mut orbit.0);
                catalog.fetch_document(generation, entry.clone(), &loader.asset_server, &loader.paths);
                status.info(format!("Fetching {}", entry));
            }
            SelectionRequest::Attachment { category, reference } => {
                match composition.select_attachment(&mut scene, category, reference.as_deref()) {
                    Ok(Some(load)) => loader.start(load),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(category = %category, error = %e, "Attachment selection rejected");
                        status.error(e);
                    }
                }
            }
            SelectionRequest::ReloadBase => match composition.reload_base() {
                Ok(Some(load)) => loader.start(load),
                Ok(None) => {}
                Err(e) => status.error(e),
            },
        }
    }
}

/// Hand finished glTF loads back to the engine
fn poll_part_loads(
    mut commands: Commands,
    mut composition: ResMut<Composition>,
    mut pending: ResMut<PendingParts>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut status: ResMut<ViewerStatus>,
) {
    if pending.is_empty() {
        return;
    }

    let mut still_loading = Vec::new();
    for part in pending.drain(..) {
        let result = match asset_server.get_load_state(part.handle.id()) {
            Some(LoadState::Loaded) => gltf_scene(&gltf_assets, &part),
            Some(LoadState::Failed(err)) => Err(AssetLoadError::new(&part.reference, err)),
            _ => {
                still_loading.push(part);
                continue;
            }
        };

        let mut scene = EntityScene::new(&mut commands);
        match composition.complete(&mut scene, &part.ticket, result) {
            LoadOutcome::Installed { slot, .. } => {
                tag_part(&mut commands, &composition, &slot);
                status.info(format!("Loaded {}", part.reference));
            }
            LoadOutcome::Failed(e) => status.error(e),
            LoadOutcome::Discarded => {}
        }
    }
    pending.0 = still_loading;
}

/// Use the glTF default scene, or the first one when none is marked default
fn gltf_scene(gltf_assets: &Assets<Gltf>, part: &PendingPart) -> Result<Handle<Scene>, AssetLoadError> {
    let gltf = gltf_assets
        .get(&part.handle)
        .ok_or_else(|| AssetLoadError::new(&part.reference, "glTF asset missing after load"))?;
    gltf.default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
        .ok_or_else(|| AssetLoadError::new(&part.reference, "glTF has no scenes"))
}

fn tag_part(commands: &mut Commands, composition: &Composition, slot: &Slot) {
    let part = match slot {
        Slot::Base => composition.base(),
        Slot::Attachment(category) => composition.attachment(category),
    };
    if let Some(part) = part {
        commands.entity(part.node).insert((
            PartNode {
                slot: slot.clone(),
                asset_reference: part.descriptor.asset_reference.clone(),
            },
            Name::new(part.descriptor.display_name.clone()),
        ));
    }
}

/// Remove all parts when the app shuts down
fn teardown_on_exit(
    mut exit: MessageReader<AppExit>,
    mut commands: Commands,
    mut composition: ResMut<Composition>,
    mut pending: ResMut<PendingParts>,
) {
    if exit.read().next().is_none() {
        return;
    }
    composition.unload_all(&mut EntityScene::new(&mut commands));
    pending.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{EulerRot, Quat};

    #[test]
    fn test_part_transform_matches_descriptor() {
        let transform = PartTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::splat(2.0),
            rotation_degrees: Vec3::new(90.0, 0.0, 0.0),
        };
        let bevy_transform = part_transform(&transform);
        assert_eq!(bevy_transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bevy_transform.scale, Vec3::splat(2.0));
        let expected = Quat::from_euler(EulerRot::XYZ, 90f32.to_radians(), 0.0, 0.0);
        assert!(bevy_transform.rotation.angle_between(expected) < 1e-5);

        // Same mapping as the core affine
        let point = Vec3::new(0.0, 1.0, 0.0);
        let via_bevy = bevy_transform.transform_point(point);
        assert!((via_bevy - transform.transform_point(point)).length() < 1e-5);
    }

    #[test]
    fn test_selection_spawns_and_replaces_entities() {
        use javis_core::{CatalogEntry, ConfigurationDocument};

        let mut app = App::new();
        app.init_resource::<Composition>();
        let json = r#"[
            {"filePath": "base.glb"},
            {"filePath": "A.glb", "category": "scope"},
            {"filePath": "B.glb", "category": "scope"}
        ]"#;

        let world = app.world_mut();
        let base = world.resource_scope(|world, mut composition: Mut<Composition>| {
            let mut queue = bevy::ecs::world::CommandQueue::default();
            let mut commands = Commands::new(&mut queue, world);
            let mut scene = EntityScene::new(&mut commands);
            let generation = composition.begin_document(&mut scene, CatalogEntry::new("weapon.json"));
            let document = ConfigurationDocument::from_json(CatalogEntry::new("weapon.json"), json).unwrap();
            let base = composition.document_fetched(generation, Ok(document)).unwrap().unwrap();
            composition.complete(&mut scene, &base.ticket, Ok(Handle::default()));
            let a = composition
                .select_attachment(&mut scene, "scope", Some("A.glb"))
                .unwrap()
                .unwrap();
            composition.complete(&mut scene, &a.ticket, Ok(Handle::default()));
            queue.apply(world);
            composition.base().map(|b| b.node)
        });

        let base = base.unwrap();
        assert!(app.world().get_entity(base).is_ok());
        assert_eq!(app.world_mut().query::<&SceneRoot>().iter(app.world()).count(), 2);

        let world = app.world_mut();
        let previous = world.resource::<Composition>().attachment("scope").map(|p| p.node).unwrap();
        world.resource_scope(|world, mut composition: Mut<Composition>| {
            let mut queue = bevy::ecs::world::CommandQueue::default();
            let mut commands = Commands::new(&mut queue, world);
            let mut scene = EntityScene::new(&mut commands);
            composition
                .select_attachment(&mut scene, "scope", Some("B.glb"))
                .unwrap();
            queue.apply(world);
        });
        assert!(app.world().get_entity(previous).is_err());
    }
}
