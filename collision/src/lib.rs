pub mod adapter;
pub mod body;
pub mod config;
pub mod contact;
pub mod debug_mesh;
pub mod error;
pub mod factory;
pub mod layers;
pub mod model;
pub mod settings;
pub mod shape;
pub mod trigger;
pub mod types;
pub mod world;

// Re-export Rapier so the client can name handles and shapes without depending on
// `rapier3d` directly.
pub use rapier3d;

pub use adapter::{BodyAdapter, ElevatorBody, Impact, ModelTransform, SurfaceBody};
pub use body::{Body, BodyBuilder, BodyDef, BodyKind};
pub use config::{CollisionConfig, Config, ConfigError, MaterialTable, PhysicsMaterial};
pub use contact::{
    BodyId, ContactEvent, ContactListener, ContactListeners, ContactPhase, ContactSource,
    ContactState, TriggerBody,
};
pub use debug_mesh::{
    DebugGeometry, DebugMesh, DebugMeshPart, SPHERE_SECTORS, SPHERE_STACKS, debug_geometry,
    random_color,
};
pub use error::{CollisionError, Result};
pub use factory::{CollisionDef, CollisionModelFactory};
pub use layers::{CollisionFilter, CollisionLayer};
pub use model::{CollisionModel, MeshTransform, PoseSource};
pub use settings::{DEFAULT_DT, DEFAULT_MATERIAL, DEFAULT_WORLD_SCALE, GRAVITY_MPS2, SLEEP_SPEED_LIMIT};
pub use shape::{BuiltShape, ScaledShape, ShapeDef, build_shape};
pub use trigger::{
    Activatable, BusEvent, DelayedTrigger, EventBus, GameEvent, SceneIndex, SceneObject,
    Subscriber, SubscriberError, TimerQueue, Trigger, TriggerDef, TriggerFactory, TriggerScene,
};
pub use types::{Iso, Quat, Vec3};
pub use world::PhysicsWorld;
