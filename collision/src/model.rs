/*!
Collision model: the bodies (and attached meshes) of one entity.

The model owns its bodies in definition order and a body → meshes mapping. It holds
no reference to the physics world; instead per-frame work takes the world (or any
[`ContactSource`] / [`PoseSource`]) as an argument:

1. physics step
2. [`CollisionModel::update_triggers`] - trigger bodies raise contact events
3. [`CollisionModel::update_attached_meshes`] - copy body poses into meshes

[`CollisionModel::update`] runs 2 and 3 in that order.
*/

use std::collections::HashMap;

use rapier3d::prelude::RigidBodyHandle;

use crate::body::Body;
use crate::contact::{BodyId, ContactEvent, ContactSource};
use crate::debug_mesh::DebugMesh;
use crate::types::Iso;

/// Something whose transform follows a body (a debug mesh, a render proxy...).
pub trait MeshTransform {
    fn set_pose(&mut self, pose: &Iso);
}

/// Read access to body poses, usually the physics world.
pub trait PoseSource {
    fn body_pose(&self, body: RigidBodyHandle) -> Option<Iso>;
}

impl PoseSource for HashMap<RigidBodyHandle, Iso> {
    fn body_pose(&self, body: RigidBodyHandle) -> Option<Iso> {
        self.get(&body).copied()
    }
}

#[derive(Debug)]
pub struct CollisionModel<M = DebugMesh> {
    bodies: Vec<Body>,
    meshes: HashMap<BodyId, Vec<M>>,
    dynamic: bool,
}

impl<M> CollisionModel<M> {
    /// Take ownership of `bodies`, numbering them in order.
    ///
    /// `dynamic` is derived here once; bodies are immutable after construction.
    pub fn new(bodies: Vec<Body>) -> Self {
        let mut bodies = bodies;
        for (index, body) in bodies.iter_mut().enumerate() {
            body.set_id(BodyId(index));
        }
        let dynamic = bodies.iter().any(|body| body.mass() > 0.0);
        Self {
            bodies,
            meshes: HashMap::new(),
            dynamic,
        }
    }

    /// True iff any body had mass > 0 at construction.
    pub fn dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// World handles of every inserted body.
    pub fn handles(&self) -> impl Iterator<Item = RigidBodyHandle> + '_ {
        self.bodies.iter().filter_map(Body::handle)
    }

    /// Append `mesh` to `body`'s mesh list. Several meshes per body are allowed.
    pub fn attach_mesh(&mut self, body: BodyId, mesh: M) {
        self.meshes.entry(body).or_default().push(mesh);
    }

    pub fn meshes(&self, body: BodyId) -> &[M] {
        self.meshes.get(&body).map_or(&[], Vec::as_slice)
    }

    pub fn meshes_mut(&mut self, body: BodyId) -> &mut [M] {
        self.meshes
            .get_mut(&body)
            .map_or(&mut [], Vec::as_mut_slice)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.values().map(Vec::len).sum()
    }

    /// Run every trigger body's state machine against `source`.
    ///
    /// Listeners fire during the call; the raised events are also returned.
    pub fn update_triggers(&mut self, source: &impl ContactSource) -> Vec<ContactEvent> {
        self.bodies
            .iter_mut()
            .filter_map(|body| body.update_trigger(source))
            .collect()
    }
}

impl<M: MeshTransform> CollisionModel<M> {
    /// Copy each body's current pose into every mesh attached to it.
    ///
    /// Bodies the source does not know (not inserted, or removed) are skipped.
    pub fn update_attached_meshes(&mut self, poses: &impl PoseSource) {
        for body in &self.bodies {
            let Some(pose) = body.handle().and_then(|h| poses.body_pose(h)) else {
                continue;
            };
            if let Some(meshes) = self.meshes.get_mut(&body.id()) {
                for mesh in meshes {
                    mesh.set_pose(&pose);
                }
            }
        }
    }

    /// Per-frame hook: triggers first, then render sync.
    pub fn update<S: ContactSource + PoseSource>(&mut self, world: &S) -> Vec<ContactEvent> {
        let events = self.update_triggers(world);
        self.update_attached_meshes(world);
        events
    }

    /// Write `pose` into every mesh of `body` directly (used by body adapters).
    pub(crate) fn set_mesh_pose(&mut self, body: BodyId, pose: &Iso) {
        for mesh in self.meshes_mut(body) {
            mesh.set_pose(pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyBuilder, BodyDef};
    use crate::config::{CollisionConfig, MaterialTable, PhysicsMaterial};
    use crate::contact::ContactListeners;
    use crate::shape::ShapeDef;
    use crate::types::{Quat, Vec3, iso};
    use rapier3d::prelude::{ColliderHandle, RigidBodyBuilder, RigidBodySet};

    #[derive(Debug, Default, PartialEq)]
    struct Probe(Option<Iso>);

    impl MeshTransform for Probe {
        fn set_pose(&mut self, pose: &Iso) {
            self.0 = Some(*pose);
        }
    }

    fn body(mass: f32) -> Body {
        let config = CollisionConfig::default();
        let materials = MaterialTable::with_default(PhysicsMaterial::default());
        BodyBuilder::new(&config, &materials)
            .build(
                &BodyDef::new(mass, "default").with_shape(ShapeDef::sphere(10.0)),
                ContactListeners::default(),
            )
            .unwrap()
    }

    #[test]
    fn bodies_are_numbered_in_definition_order() {
        let model: CollisionModel = CollisionModel::new(vec![body(0.0), body(0.0), body(1.0)]);
        let ids: Vec<_> = model.bodies().iter().map(Body::id).collect();
        assert_eq!(ids, vec![BodyId(0), BodyId(1), BodyId(2)]);
    }

    #[test]
    fn dynamic_flag_follows_mass() {
        let fixed: CollisionModel = CollisionModel::new(vec![body(0.0), body(0.0)]);
        assert!(!fixed.dynamic());

        let mixed: CollisionModel = CollisionModel::new(vec![body(0.0), body(3.0)]);
        assert!(mixed.dynamic());
    }

    #[test]
    fn attached_meshes_share_the_body_pose() {
        let mut set = RigidBodySet::new();
        let handle = set.insert(RigidBodyBuilder::fixed());

        let mut model: CollisionModel<Probe> = CollisionModel::new(vec![body(1.0)]);
        model.bodies_mut()[0].mark_inserted(handle, Vec::<ColliderHandle>::new());
        for _ in 0..3 {
            model.attach_mesh(BodyId(0), Probe::default());
        }

        let pose = iso(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_euler_angles(0.1, 0.2, 0.3),
        );
        let poses: HashMap<_, _> = [(handle, pose)].into_iter().collect();
        model.update_attached_meshes(&poses);

        assert_eq!(model.meshes(BodyId(0)).len(), 3);
        for mesh in model.meshes(BodyId(0)) {
            assert_eq!(mesh.0, Some(pose));
        }
    }

    #[test]
    fn meshes_of_uninserted_bodies_are_left_alone() {
        let mut model: CollisionModel<Probe> = CollisionModel::new(vec![body(0.0)]);
        model.attach_mesh(BodyId(0), Probe::default());

        model.update_attached_meshes(&HashMap::new());
        assert_eq!(model.meshes(BodyId(0)), &[Probe(None)]);
    }

    #[test]
    fn unknown_body_has_no_meshes() {
        let model: CollisionModel = CollisionModel::new(vec![body(0.0)]);
        assert!(model.meshes(BodyId(7)).is_empty());
        assert_eq!(model.mesh_count(), 0);
    }
}
