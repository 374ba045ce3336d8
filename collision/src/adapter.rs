/*!
Body adapters: one logical transform over a whole collision model.

Map geometry and moving platforms want to be positioned like any other scene
object, without reaching into Rapier. An adapter wraps a [`CollisionModel`] and
exposes a single pose:

- writes are broadcast to every body of the model (composed with the body's
  own spawn pose) and to every attached mesh,
- reads return the adapter's pose, never an aggregate of body poses. Before the
  first write that is the origin.

Two variants share the [`BodyAdapter`] capability:

| adapter         | moves bodies with               | impacts                       |
|-----------------|---------------------------------|-------------------------------|
| [`SurfaceBody`]   | teleport (`set_position`)       | impulse on dynamic bodies     |
| [`ElevatorBody`]  | `set_next_kinematic_position`   | ignored, platforms are driven |

Kinematic next-pose writes let the solver carry resting dynamic bodies along.
*/

use log::trace;

use crate::contact::BodyId;
use crate::debug_mesh::DebugMesh;
use crate::model::{CollisionModel, MeshTransform};
use crate::types::{Iso, Quat, Vec3, iso};
use crate::world::PhysicsWorld;

/// A "take impact" event: impulse applied at a world-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub point: Vec3,
    pub impulse: Vec3,
}

/// How a pose write reaches the rigid bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Teleport,
    NextKinematic,
}

/// Shared state of every adapter: the wrapped model and its logical pose.
#[derive(Debug)]
pub struct ModelTransform<M = DebugMesh> {
    model: CollisionModel<M>,
    pose: Iso,
}

impl<M: MeshTransform> ModelTransform<M> {
    pub fn new(model: CollisionModel<M>) -> Self {
        Self {
            model,
            pose: Iso::identity(),
        }
    }

    fn set_pose(&mut self, world: &mut PhysicsWorld, pose: Iso, placement: Placement) {
        self.pose = pose;
        let targets: Vec<(BodyId, Option<_>, Iso)> = self
            .model
            .bodies()
            .iter()
            .map(|body| (body.id(), body.handle(), pose * body.initial_pose()))
            .collect();

        for (id, handle, body_pose) in targets {
            if let Some(rb) = handle.and_then(|h| world.body_mut(h)) {
                match placement {
                    Placement::Teleport => rb.set_position(body_pose, true),
                    Placement::NextKinematic => rb.set_next_kinematic_position(body_pose),
                }
            }
            self.model.set_mesh_pose(id, &body_pose);
        }
    }

    /// Apply `impact` to every dynamic body. Returns how many bodies took it.
    fn apply_impact(&self, world: &mut PhysicsWorld, impact: &Impact) -> usize {
        let mut hit = 0;
        for body in self.model.bodies().iter().filter(|b| b.is_dynamic()) {
            if let Some(rb) = body.handle().and_then(|h| world.body_mut(h)) {
                rb.apply_impulse_at_point(impact.impulse, impact.point.into(), true);
                hit += 1;
            }
        }
        hit
    }
}

/// Transform capability shared by all adapter variants.
pub trait BodyAdapter<M: MeshTransform = DebugMesh> {
    fn transform(&self) -> &ModelTransform<M>;
    fn transform_mut(&mut self) -> &mut ModelTransform<M>;

    fn set_translation(&mut self, world: &mut PhysicsWorld, translation: Vec3);
    fn set_rotation(&mut self, world: &mut PhysicsWorld, rotation: Quat);
    /// Forward an impact into the physics world. Returns whether any body took it.
    fn take_impact(&mut self, world: &mut PhysicsWorld, impact: &Impact) -> bool;

    fn translation(&self) -> Vec3 {
        self.transform().pose.translation.vector
    }

    fn rotation(&self) -> Quat {
        self.transform().pose.rotation
    }

    fn model(&self) -> &CollisionModel<M> {
        &self.transform().model
    }

    fn model_mut(&mut self) -> &mut CollisionModel<M> {
        &mut self.transform_mut().model
    }
}

/// Map geometry placed (and occasionally re-placed) by gameplay code.
#[derive(Debug)]
pub struct SurfaceBody<M = DebugMesh> {
    inner: ModelTransform<M>,
}

impl<M: MeshTransform> SurfaceBody<M> {
    pub fn new(model: CollisionModel<M>) -> Self {
        Self {
            inner: ModelTransform::new(model),
        }
    }

    pub fn into_model(self) -> CollisionModel<M> {
        self.inner.model
    }
}

impl<M: MeshTransform> BodyAdapter<M> for SurfaceBody<M> {
    fn transform(&self) -> &ModelTransform<M> {
        &self.inner
    }

    fn transform_mut(&mut self) -> &mut ModelTransform<M> {
        &mut self.inner
    }

    fn set_translation(&mut self, world: &mut PhysicsWorld, translation: Vec3) {
        let pose = iso(translation, self.rotation());
        self.inner.set_pose(world, pose, Placement::Teleport);
    }

    fn set_rotation(&mut self, world: &mut PhysicsWorld, rotation: Quat) {
        let pose = iso(self.translation(), rotation);
        self.inner.set_pose(world, pose, Placement::Teleport);
    }

    fn take_impact(&mut self, world: &mut PhysicsWorld, impact: &Impact) -> bool {
        self.inner.apply_impact(world, impact) > 0
    }
}

/// Kinematic moving platform.
#[derive(Debug)]
pub struct ElevatorBody<M = DebugMesh> {
    inner: ModelTransform<M>,
}

impl<M: MeshTransform> ElevatorBody<M> {
    pub fn new(model: CollisionModel<M>) -> Self {
        Self {
            inner: ModelTransform::new(model),
        }
    }

    pub fn into_model(self) -> CollisionModel<M> {
        self.inner.model
    }
}

impl<M: MeshTransform> BodyAdapter<M> for ElevatorBody<M> {
    fn transform(&self) -> &ModelTransform<M> {
        &self.inner
    }

    fn transform_mut(&mut self) -> &mut ModelTransform<M> {
        &mut self.inner
    }

    fn set_translation(&mut self, world: &mut PhysicsWorld, translation: Vec3) {
        let pose = iso(translation, self.rotation());
        self.inner.set_pose(world, pose, Placement::NextKinematic);
    }

    fn set_rotation(&mut self, world: &mut PhysicsWorld, rotation: Quat) {
        let pose = iso(self.translation(), rotation);
        self.inner.set_pose(world, pose, Placement::NextKinematic);
    }

    fn take_impact(&mut self, _world: &mut PhysicsWorld, impact: &Impact) -> bool {
        trace!("elevator ignores impact at {:?}", impact.point);
        false
    }
}
