//! Demo map: entity and trigger definitions loaded from RON and spawned at startup.
//!
//! Each map entity carries a collision definition plus a role deciding which body
//! adapter wraps it and which scene object (if any) represents it for triggers.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use bevy::prelude::*;
use collision::{
    CollisionDef, CollisionModel, Config, ContactListeners, ElevatorBody, GameEvent,
    SurfaceBody, TriggerDef, TriggerFactory,
};
use serde::Deserialize;

use crate::gameplay::{Door, DoorSwitch, Lift, LiftSwitch, Prop};
use crate::physics::{CollisionBody, Physics};
use crate::settings::{CollisionFactory, asset_path};
use crate::triggers::{Bus, ContactInbox, Scene, TriggerRequests, Triggers};

const DEMO_MAP: &str = "assets/maps/demo.ron";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapDef {
    pub entities: Vec<MapEntityDef>,
    pub triggers: Vec<TriggerDef>,
    /// Bus channel → trigger fired when something is posted on it.
    pub bindings: Vec<BindingDef>,
}

impl Config for MapDef {}

#[derive(Debug, Clone, Deserialize)]
pub struct MapEntityDef {
    pub name: String,
    #[serde(default)]
    pub role: EntityRole,
    pub collision: CollisionDef,
    /// Channel posted when a trigger body of this entity is first touched.
    #[serde(default)]
    pub on_contact: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum EntityRole {
    /// Static map geometry.
    #[default]
    Surface,
    /// Loose dynamic object that can be kicked.
    Prop,
    /// Kinematic platform travelling `travel` authoring units up at `speed` units/s.
    Lift { travel: f32, speed: f32 },
    /// Sliding door that rises by `travel` authoring units when opened.
    Door { travel: f32, speed: f32 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct BindingDef {
    pub event: String,
    pub trigger: String,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_demo_map);
}

fn spawn_demo_map(
    mut commands: Commands,
    factory: Res<CollisionFactory>,
    mut physics: ResMut<Physics>,
    inbox: Res<ContactInbox>,
    requests: Res<TriggerRequests>,
    mut bus: ResMut<Bus>,
    mut scene: ResMut<Scene>,
    mut triggers: ResMut<Triggers>,
) {
    let path = asset_path(DEMO_MAP);
    let map = match MapDef::load_from_file(&path) {
        Ok(map) => map,
        Err(err) => {
            error!("could not load map {}: {err}", path.display());
            return;
        }
    };

    for entity in &map.entities {
        let listeners = contact_listeners(entity, &inbox);
        let mut model = match factory.0.create_collision_model(&entity.collision, listeners, false) {
            Ok(model) => model,
            Err(err) => {
                error!("skipping '{}': {err}", entity.name);
                continue;
            }
        };
        physics.0.add_model(&mut model);
        spawn_entity(&mut commands, &mut scene, entity, model, factory.world_scale());
    }

    let trigger_factory = TriggerFactory;
    for def in &map.triggers {
        match trigger_factory.create_trigger(def) {
            Ok(trigger) => {
                triggers.0.insert(def.name.clone(), trigger);
            }
            Err(err) => error!("skipping trigger '{}': {err}", def.name),
        }
    }

    for binding in &map.bindings {
        bus.0
            .subscribe(binding.event.clone(), requests.subscriber(binding.trigger.clone()));
    }

    info!(
        "spawned {} map entities, {} triggers, {} bindings",
        map.entities.len(),
        triggers.0.len(),
        map.bindings.len()
    );
}

fn contact_listeners(entity: &MapEntityDef, inbox: &ContactInbox) -> ContactListeners {
    let Some(channel) = entity.on_contact.clone() else {
        return ContactListeners::default();
    };
    let inbox = inbox.clone();
    let source = entity.name.clone();
    ContactListeners::new().on_start(move |_| {
        inbox.push(GameEvent::from_source(channel.clone(), source.clone()));
    })
}

fn spawn_entity(
    commands: &mut Commands,
    scene: &mut Scene,
    def: &MapEntityDef,
    model: CollisionModel,
    world_scale: f32,
) {
    let base = (
        Name::new(def.name.clone()),
        Transform::default(),
        Visibility::default(),
    );
    match def.role {
        EntityRole::Surface => {
            commands.spawn((base, CollisionBody::Surface(SurfaceBody::new(model))));
        }
        EntityRole::Prop => {
            commands.spawn((base, Prop, CollisionBody::Surface(SurfaceBody::new(model))));
        }
        EntityRole::Lift { travel, speed } => {
            let requested = Arc::new(AtomicBool::new(false));
            scene.0.insert(
                def.name.clone(),
                Box::new(LiftSwitch {
                    requested: requested.clone(),
                }),
            );
            commands.spawn((
                base,
                Lift::new(requested, travel * world_scale, speed * world_scale),
                CollisionBody::Elevator(ElevatorBody::new(model)),
            ));
        }
        EntityRole::Door { travel, speed } => {
            let open = Arc::new(AtomicBool::new(false));
            scene.0.insert(def.name.clone(), Box::new(DoorSwitch { open: open.clone() }));
            commands.spawn((
                base,
                Door::new(open, travel * world_scale, speed * world_scale),
                CollisionBody::Surface(SurfaceBody::new(model)),
            ));
        }
    }
}
