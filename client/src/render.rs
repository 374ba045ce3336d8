//! Debug mesh rendering.
//!
//! Every [`DebugMesh`] attached to a collision model gets a view entity (child of the
//! model's entity) with one Bevy mesh per part. Each frame the view eases toward the
//! pose the physics sync copied into the debug mesh. Trigger meshes skip the easing
//! and snap, so the volume drawn is the volume tested.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use collision::{BodyId, DebugGeometry, DebugMesh, Iso, SPHERE_SECTORS, SPHERE_STACKS};

use crate::physics::CollisionBody;

const TRANSLATION_DECAY_RATE: f32 = 24.0;
const ROTATION_DECAY_RATE: f32 = 24.0;
const TRIGGER_ALPHA: f32 = 0.3;

/// Render proxy of one debug mesh of one body.
#[derive(Component, Debug, Clone, Copy)]
pub struct DebugMeshView {
    pub body: BodyId,
    pub index: usize,
    pub ignore_smoothing: bool,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, (spawn_debug_views, sync_debug_views).chain());
}

fn spawn_debug_views(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    added: Query<(Entity, &CollisionBody), Added<CollisionBody>>,
) {
    for (owner, body) in &added {
        let model = body.model();
        for collision_body in model.bodies() {
            for (index, debug_mesh) in model.meshes(collision_body.id()).iter().enumerate() {
                let material = materials.add(debug_material(debug_mesh));
                let view = commands
                    .spawn((
                        DebugMeshView {
                            body: collision_body.id(),
                            index,
                            ignore_smoothing: debug_mesh.ignore_smoothing,
                        },
                        iso_to_transform(&debug_mesh.pose),
                        Visibility::default(),
                        ChildOf(owner),
                    ))
                    .id();
                for part in &debug_mesh.parts {
                    commands.spawn((
                        Mesh3d(meshes.add(geometry_mesh(&part.geometry))),
                        MeshMaterial3d(material.clone()),
                        iso_to_transform(&part.local_pose),
                        ChildOf(view),
                    ));
                }
            }
        }
    }
}

fn sync_debug_views(
    time: Res<Time>,
    owners: Query<&CollisionBody>,
    mut views: Query<(&ChildOf, &DebugMeshView, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (child_of, view, mut transform) in &mut views {
        let Ok(body) = owners.get(child_of.parent()) else {
            continue;
        };
        let Some(debug_mesh) = body.model().meshes(view.body).get(view.index) else {
            continue;
        };
        let target = iso_to_transform(&debug_mesh.pose);
        if view.ignore_smoothing {
            *transform = target;
            continue;
        }
        transform
            .translation
            .smooth_nudge(&target.translation, TRANSLATION_DECAY_RATE, dt);
        transform.rotation = transform
            .rotation
            .slerp(target.rotation, 1.0 - (-ROTATION_DECAY_RATE * dt).exp());
    }
}

fn debug_material(debug_mesh: &DebugMesh) -> StandardMaterial {
    let [r, g, b] = debug_mesh.color;
    if debug_mesh.ignore_smoothing {
        StandardMaterial {
            base_color: Color::linear_rgba(r, g, b, TRIGGER_ALPHA),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        }
    } else {
        StandardMaterial {
            base_color: Color::linear_rgb(r, g, b),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        }
    }
}

pub fn iso_to_transform(pose: &Iso) -> Transform {
    let t = pose.translation.vector;
    let q = pose.rotation.coords;
    Transform {
        translation: Vec3::new(t.x, t.y, t.z),
        rotation: Quat::from_xyzw(q.x, q.y, q.z, q.w),
        ..default()
    }
}

fn geometry_mesh(geometry: &DebugGeometry) -> Mesh {
    match geometry {
        DebugGeometry::Box { half_extents } => Cuboid::new(
            half_extents.x * 2.0,
            half_extents.y * 2.0,
            half_extents.z * 2.0,
        )
        .into(),
        DebugGeometry::Sphere { radius } => Sphere::new(*radius).mesh().uv(SPHERE_SECTORS, SPHERE_STACKS),
        DebugGeometry::Triangles { positions, indices } => {
            let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
                .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions.clone())
                .with_inserted_indices(Indices::U32(indices.iter().flatten().copied().collect()));
            mesh.duplicate_vertices();
            mesh.compute_flat_normals();
            mesh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collision::{Quat as PhysicsQuat, Vec3 as PhysicsVec3};

    #[test]
    fn iso_maps_to_the_same_transform() {
        let pose = Iso::from_parts(
            PhysicsVec3::new(1.0, -2.0, 3.0).into(),
            PhysicsQuat::from_axis_angle(&PhysicsVec3::y_axis(), 0.5),
        );
        let transform = iso_to_transform(&pose);
        assert_eq!(transform.translation, Vec3::new(1.0, -2.0, 3.0));
        let expected = Quat::from_rotation_y(0.5);
        assert!(transform.rotation.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn triangles_become_an_unindexed_triangle_list() {
        let geometry = DebugGeometry::Triangles {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
            indices: vec![[0, 2, 1], [1, 2, 3]],
        };
        let mesh = geometry_mesh(&geometry);
        assert_eq!(mesh.count_vertices(), 6);
        assert!(mesh.indices().is_none());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }
}
