//! Camera auto-framing from the spawned base part's mesh bounds

use bevy::camera::primitives::MeshAabb;
use bevy::prelude::*;
use bevy::scene::{SceneInstance, SceneSpawner};
use bevy::transform::TransformSystems;
use javis_core::{Aabb, AutoFramer};

use crate::camera::OrbitCamera;
use crate::parts::Composition;

#[derive(Debug, Default, Resource, Deref, DerefMut)]
pub struct Framer(pub AutoFramer);

pub struct FramingPlugin;

impl Plugin for FramingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Framer>()
            .add_systems(PostUpdate, frame_base_part.after(TransformSystems::Propagate));
    }
}

/// Frame the base part once its scene instance has spawned
///
/// Runs after transform propagation so mesh `GlobalTransform`s are current.
fn frame_base_part(
    composition: Res<Composition>,
    mut framer: ResMut<Framer>,
    mut orbit: ResMut<OrbitCamera>,
    scene_spawner: Res<SceneSpawner>,
    instances: Query<&SceneInstance>,
    children_query: Query<&Children>,
    mesh_query: Query<(&Mesh3d, &GlobalTransform)>,
    mesh_assets: Res<Assets<Mesh>>,
) {
    let generation = composition.generation();
    if !framer.wants(generation) {
        return;
    }
    let Some(base) = composition.base() else { return };

    let mut bounds = None;
    collect_bounds(base.node, &children_query, &mesh_query, &mesh_assets, &mut bounds);

    if bounds.is_none() {
        // No geometry yet: wait for the instance, then fall back to the origin
        let ready = instances
            .get(base.node)
            .is_ok_and(|instance| scene_spawner.instance_is_ready(**instance));
        if !ready {
            return;
        }
    }

    framer.on_base_loaded(generation, bounds, base.descriptor.transform.position, &mut orbit.0);
}

/// World-space bounds of every mesh below `entity`
fn collect_bounds(
    entity: Entity,
    children_query: &Query<&Children>,
    mesh_query: &Query<(&Mesh3d, &GlobalTransform)>,
    mesh_assets: &Assets<Mesh>,
    bounds: &mut Option<Aabb>,
) {
    if let Ok((mesh_handle, global_transform)) = mesh_query.get(entity) {
        if let Some(local) = mesh_assets.get(&mesh_handle.0).and_then(|m| m.compute_aabb()) {
            let center = Vec3::from(local.center);
            let half = Vec3::from(local.half_extents);
            let corners = Aabb::new(center - half, center + half)
                .corners()
                .map(|corner| global_transform.transform_point(corner));
            if let Some(world) = Aabb::from_points(corners) {
                *bounds = Some((*bounds).map_or(world, |existing| existing.union(&world)));
            }
        }
    }

    if let Ok(children) = children_query.get(entity) {
        for &child in &**children {
            collect_bounds(child, children_query, mesh_query, mesh_assets, bounds);
        }
    }
}
