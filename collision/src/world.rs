//! Owned Rapier simulation the collision models live in.
//!
//! [`PhysicsWorld`] bundles the sets and pipeline stages a dynamic Rapier scene
//! needs. Models are built detached (see [`crate::CollisionModelFactory`]) and
//! inserted here by the caller; the world in turn answers contact and pose queries
//! for the per-frame model update.
//!
//! Frame order
//! 1. [`PhysicsWorld::step`]
//! 2. [`crate::CollisionModel::update`] for every model (triggers, then mesh sync)

use log::debug;
use rapier3d::prelude::*;

use crate::contact::ContactSource;
use crate::model::{CollisionModel, PoseSource};
use crate::settings::{DEFAULT_DT, GRAVITY_MPS2};
use crate::types::{Iso, Vec3};

pub struct PhysicsWorld {
    pub gravity: Vec3,
    pub integration_parameters: IntegrationParameters,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -GRAVITY_MPS2, 0.0))
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            integration_parameters: IntegrationParameters {
                dt: DEFAULT_DT,
                ..IntegrationParameters::default()
            },
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Insert every pending body of `model` (with its colliders) into the world.
    ///
    /// Bodies that were already inserted are left untouched, so calling this twice
    /// is harmless.
    pub fn add_model<M>(&mut self, model: &mut CollisionModel<M>) {
        let mut inserted = 0;
        for body in model.bodies_mut() {
            let Some((rigid_body, colliders)) = body.take_pending() else {
                continue;
            };
            let handle = self.bodies.insert(rigid_body);
            let collider_handles = colliders
                .into_iter()
                .map(|collider| {
                    self.colliders
                        .insert_with_parent(collider, handle, &mut self.bodies)
                })
                .collect();
            body.mark_inserted(handle, collider_handles);
            inserted += 1;
        }
        debug!(
            "inserted {inserted} bodies; world now holds {} bodies",
            self.bodies.len()
        );
    }

    /// Remove every inserted body of `model` and its colliders from the world.
    pub fn remove_model<M>(&mut self, model: &mut CollisionModel<M>) {
        let mut removed = 0;
        for body in model.bodies_mut() {
            let Some(handle) = body.mark_removed() else {
                continue;
            };
            if self
                .bodies
                .remove(
                    handle,
                    &mut self.islands,
                    &mut self.colliders,
                    &mut self.impulse_joints,
                    &mut self.multibody_joints,
                    true,
                )
                .is_some()
            {
                removed += 1;
            }
        }
        debug!(
            "removed {removed} bodies; world now holds {} bodies",
            self.bodies.len()
        );
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }
}

impl ContactSource for PhysicsWorld {
    /// True when any collider of `body` currently overlaps another collider.
    ///
    /// Only intersection pairs are inspected: sensor colliders (trigger bodies)
    /// never produce contact manifolds.
    fn in_contact(&self, body: RigidBodyHandle) -> bool {
        let Some(rigid_body) = self.bodies.get(body) else {
            return false;
        };
        rigid_body.colliders().iter().any(|&collider| {
            self.narrow_phase
                .intersection_pairs_with(collider)
                .any(|(_, _, intersecting)| intersecting)
        })
    }
}

impl PoseSource for PhysicsWorld {
    fn body_pose(&self, body: RigidBodyHandle) -> Option<Iso> {
        self.bodies.get(body).map(|rb| *rb.position())
    }
}
