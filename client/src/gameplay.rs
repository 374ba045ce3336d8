//! Sandbox gameplay: lifts, doors and loose props driven through body adapters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use collision::{
    Activatable, BodyAdapter, BodyDef, CollisionDef, ContactListeners, Impact, PoseSource,
    SceneObject, ShapeDef, SurfaceBody,
};

use crate::physics::{CollisionBody, Physics, PhysicsSet};
use crate::settings::CollisionFactory;

/// Props below this height (physics units) have fallen off the map.
const KILL_HEIGHT: f32 = -20.0;
const KICK_IMPULSE: f32 = 4.0;

#[derive(Component, Debug)]
pub struct Prop;

/// Kinematic platform moving between its spawn height and `travel` above it.
#[derive(Component, Debug)]
pub struct Lift {
    requested: Arc<AtomicBool>,
    travel: f32,
    speed: f32,
    height: f32,
    raised: bool,
    moving: bool,
}

impl Lift {
    pub fn new(requested: Arc<AtomicBool>, travel: f32, speed: f32) -> Self {
        Self {
            requested,
            travel,
            speed,
            height: 0.0,
            raised: false,
            moving: false,
        }
    }
}

#[derive(Component, Debug)]
pub struct Door {
    open: Arc<AtomicBool>,
    travel: f32,
    speed: f32,
    lifted: f32,
}

impl Door {
    pub fn new(open: Arc<AtomicBool>, travel: f32, speed: f32) -> Self {
        Self {
            open,
            travel,
            speed,
            lifted: 0.0,
        }
    }
}

/// Scene-side handle of a lift: activation requests a trip.
pub struct LiftSwitch {
    pub requested: Arc<AtomicBool>,
}

impl Activatable for LiftSwitch {
    fn activate(&mut self) {
        self.requested.store(true, Ordering::Relaxed);
    }
}

impl SceneObject for LiftSwitch {
    fn as_activatable(&mut self) -> Option<&mut dyn Activatable> {
        Some(self)
    }
}

/// Scene-side handle of a door: activation opens it for good.
pub struct DoorSwitch {
    pub open: Arc<AtomicBool>,
}

impl Activatable for DoorSwitch {
    fn activate(&mut self) {
        self.open.store(true, Ordering::Relaxed);
    }
}

impl SceneObject for DoorSwitch {
    fn as_activatable(&mut self) -> Option<&mut dyn Activatable> {
        Some(self)
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (drive_lifts, open_doors, despawn_fallen_props).before(PhysicsSet::Step),
    );
    app.add_systems(Update, (kick_props, drop_crate));
}

fn drive_lifts(
    time: Res<Time>,
    mut physics: ResMut<Physics>,
    mut lifts: Query<(&mut Lift, &mut CollisionBody)>,
) {
    let dt = time.delta_secs();
    for (mut lift, mut body) in &mut lifts {
        let CollisionBody::Elevator(elevator) = &mut *body else {
            continue;
        };
        if !lift.moving && lift.requested.swap(false, Ordering::Relaxed) {
            lift.moving = true;
        }
        if !lift.moving {
            continue;
        }

        let target = if lift.raised { 0.0 } else { lift.travel };
        let step = lift.speed * dt;
        let remaining = target - lift.height;
        if remaining.abs() <= step {
            lift.height = target;
            lift.moving = false;
            lift.raised = !lift.raised;
        } else {
            lift.height += step.copysign(remaining);
        }

        let mut translation = elevator.translation();
        translation.y = lift.height;
        elevator.set_translation(&mut physics.0, translation);
    }
}

fn open_doors(
    time: Res<Time>,
    mut physics: ResMut<Physics>,
    mut doors: Query<(&mut Door, &mut CollisionBody)>,
) {
    let dt = time.delta_secs();
    for (mut door, mut body) in &mut doors {
        if !door.open.load(Ordering::Relaxed) || door.lifted >= door.travel {
            continue;
        }
        let CollisionBody::Surface(surface) = &mut *body else {
            continue;
        };
        door.lifted = (door.lifted + door.speed * dt).min(door.travel);
        let mut translation = surface.translation();
        translation.y = door.lifted;
        surface.set_translation(&mut physics.0, translation);
    }
}

/// K: kick every prop upwards through its adapter.
fn kick_props(
    keys: Res<ButtonInput<KeyCode>>,
    mut physics: ResMut<Physics>,
    mut props: Query<&mut CollisionBody, With<Prop>>,
) {
    if !keys.just_pressed(KeyCode::KeyK) {
        return;
    }
    for mut body in &mut props {
        let CollisionBody::Surface(surface) = &mut *body else {
            continue;
        };
        let Some(pose) = surface
            .model()
            .handles()
            .next()
            .and_then(|h| physics.0.body_pose(h))
        else {
            continue;
        };
        let impact = Impact {
            point: pose.translation.vector,
            impulse: nalgebra::Vector3::new(0.0, KICK_IMPULSE, 0.0),
        };
        surface.take_impact(&mut physics.0, &impact);
    }
}

/// Space: drop a fresh crate above the origin.
fn drop_crate(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    factory: Res<CollisionFactory>,
    mut physics: ResMut<Physics>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    let def = CollisionDef::new(vec![
        BodyDef::new(2.0, "wood")
            .with_position([0.0, 800.0, 0.0])
            .with_shape(ShapeDef::cuboid(60.0, 60.0, 60.0)),
    ]);
    let mut model = match factory
        .0
        .create_collision_model(&def, ContactListeners::default(), false)
    {
        Ok(model) => model,
        Err(err) => {
            error!("could not build crate: {err}");
            return;
        }
    };
    physics.0.add_model(&mut model);
    commands.spawn((
        Name::new("crate"),
        Prop,
        Transform::default(),
        Visibility::default(),
        CollisionBody::Surface(SurfaceBody::new(model)),
    ));
}

fn despawn_fallen_props(
    mut commands: Commands,
    physics: Res<Physics>,
    props: Query<(Entity, &CollisionBody), With<Prop>>,
) {
    for (entity, body) in &props {
        let fallen = body
            .model()
            .handles()
            .filter_map(|h| physics.0.body_pose(h))
            .all(|pose| pose.translation.vector.y < KILL_HEIGHT);
        if fallen && !body.model().is_empty() {
            debug!("despawning fallen prop {entity}");
            commands.entity(entity).despawn();
        }
    }
}
