//! Physics world resource and the fixed-step frame driver.
//!
//! Every fixed tick: step the world, then let each collision model evaluate its
//! trigger bodies and copy body poses into its debug meshes. Rendering reads those
//! mesh poses in `Update` (see `render`).

use bevy::prelude::*;
use collision::{
    BodyAdapter, CollisionModel, DEFAULT_DT, ElevatorBody, PhysicsWorld, SurfaceBody,
};

#[derive(Resource, Default)]
pub struct Physics(pub PhysicsWorld);

/// A collision model wrapped in the adapter gameplay uses to move it.
#[derive(Component, Debug)]
pub enum CollisionBody {
    Surface(SurfaceBody),
    Elevator(ElevatorBody),
}

impl CollisionBody {
    pub fn model(&self) -> &CollisionModel {
        match self {
            Self::Surface(surface) => surface.model(),
            Self::Elevator(elevator) => elevator.model(),
        }
    }

    pub fn model_mut(&mut self) -> &mut CollisionModel {
        match self {
            Self::Surface(surface) => surface.model_mut(),
            Self::Elevator(elevator) => elevator.model_mut(),
        }
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Step,
    Sync,
}

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_seconds(f64::from(DEFAULT_DT)));
    app.init_resource::<Physics>();
    app.configure_sets(FixedUpdate, (PhysicsSet::Step, PhysicsSet::Sync).chain());
    app.add_systems(
        FixedUpdate,
        (
            step_world.in_set(PhysicsSet::Step),
            update_models.in_set(PhysicsSet::Sync),
        ),
    );
    app.add_observer(remove_from_world);
}

fn step_world(mut physics: ResMut<Physics>, time: Res<Time>) {
    physics.0.step(time.delta_secs());
}

/// Trigger evaluation then mesh sync, for every model. Listeners fire in here.
fn update_models(physics: Res<Physics>, mut bodies: Query<&mut CollisionBody>) {
    for mut body in &mut bodies {
        body.model_mut().update(&physics.0);
    }
}

/// Despawned entities take their bodies out of the world. Occupied trigger bodies
/// report their final `contactEnd` here.
fn remove_from_world(
    remove: On<Remove, CollisionBody>,
    mut bodies: Query<&mut CollisionBody>,
    mut physics: ResMut<Physics>,
) {
    let Ok(mut body) = bodies.get_mut(remove.entity) else {
        return;
    };
    physics.0.remove_model(body.model_mut());
    body.model_mut().update_triggers(&physics.0);
}
