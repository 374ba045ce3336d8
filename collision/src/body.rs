/*!
Body builder: body records → rigid bodies with their colliders.

A built [`Body`] starts out *pending*: it owns a Rapier `RigidBody` and its
`Collider`s but is not part of any world yet. [`crate::PhysicsWorld::add_model`]
moves them into the world and records the handles; from then on the body is
addressed by its [`RigidBodyHandle`].

Conventions
- `mass == 0` → fixed body (or kinematic when `kinematic` is set).
- `mass > 0` → dynamic body whose mass is exactly `mass`; colliders carry no density.
- `trigger` → every collider is a sensor: no collision response, overlap only.
- Positions are authoring units and get multiplied by the world scale.
*/

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{CollisionConfig, MaterialTable};
use crate::contact::{BodyId, ContactListeners, ContactSource, ContactEvent, TriggerBody};
use crate::error::Result;
use crate::layers::CollisionFilter;
use crate::shape::{BuiltShape, ShapeDef, build_shape};
use crate::types::{Iso, iso, resolve_orientation, scaled_vec3};

/// Raw body record as authored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyDef {
    pub mass: f32,
    pub material_name: String,
    pub collision_filter_group: Option<u32>,
    pub collision_filter_mask: Option<u32>,
    pub position: Option<[f32; 3]>,
    pub rotation_deg: Option<[f32; 3]>,
    /// `[x, y, z, w]`. Takes precedence over `rotation_deg`.
    pub quaternion: Option<[f32; 4]>,
    pub fixed_rotation: Option<bool>,
    pub allow_sleep: Option<bool>,
    pub trigger: bool,
    /// Mass-0 bodies driven by gameplay (moving platforms).
    pub kinematic: bool,
    pub shapes: Vec<ShapeDef>,
}

impl BodyDef {
    pub fn new(mass: f32, material_name: impl Into<String>) -> Self {
        Self {
            mass,
            material_name: material_name.into(),
            ..Self::default()
        }
    }

    pub fn with_shape(mut self, shape: ShapeDef) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = Some(position);
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    pub fn as_kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }

    pub fn kind(&self) -> BodyKind {
        if self.mass > 0.0 {
            BodyKind::Dynamic
        } else if self.kinematic {
            BodyKind::Kinematic
        } else {
            BodyKind::Fixed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Fixed,
    Kinematic,
    Dynamic,
}

impl From<BodyKind> for RigidBodyType {
    fn from(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Fixed => RigidBodyType::Fixed,
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
        }
    }
}

/// Where a body's Rapier data currently lives.
#[derive(Debug)]
enum Residence {
    Pending {
        rigid_body: RigidBody,
        colliders: Vec<Collider>,
    },
    Inserted {
        handle: RigidBodyHandle,
        colliders: Vec<ColliderHandle>,
    },
    Removed,
}

/// Runtime body owned by exactly one collision model.
#[derive(Debug)]
pub struct Body {
    id: BodyId,
    mass: f32,
    kind: BodyKind,
    initial_pose: Iso,
    shapes: Vec<BuiltShape>,
    trigger: Option<TriggerBody>,
    residence: Residence,
}

impl Body {
    pub fn id(&self) -> BodyId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BodyId) {
        self.id = id;
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn is_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn trigger(&self) -> Option<&TriggerBody> {
        self.trigger.as_ref()
    }

    /// Pose the body was defined with, in physics units.
    pub fn initial_pose(&self) -> Iso {
        self.initial_pose
    }

    /// Shapes in definition order; index `i` matches collider `i`.
    pub fn shapes(&self) -> &[BuiltShape] {
        &self.shapes
    }

    /// Handle in the physics world, once inserted.
    pub fn handle(&self) -> Option<RigidBodyHandle> {
        match &self.residence {
            Residence::Inserted { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    pub fn collider_handles(&self) -> &[ColliderHandle] {
        match &self.residence {
            Residence::Inserted { colliders, .. } => colliders,
            _ => &[],
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.residence, Residence::Pending { .. })
    }

    /// Hand the Rapier data over for insertion. `None` if already taken.
    pub(crate) fn take_pending(&mut self) -> Option<(RigidBody, Vec<Collider>)> {
        match std::mem::replace(&mut self.residence, Residence::Removed) {
            Residence::Pending {
                rigid_body,
                colliders,
            } => Some((rigid_body, colliders)),
            other => {
                self.residence = other;
                None
            }
        }
    }

    pub(crate) fn mark_inserted(&mut self, handle: RigidBodyHandle, colliders: Vec<ColliderHandle>) {
        self.residence = Residence::Inserted { handle, colliders };
    }

    /// Forget the world handles after removal. Returns the handle that was held.
    pub(crate) fn mark_removed(&mut self) -> Option<RigidBodyHandle> {
        let handle = self.handle();
        if handle.is_some() {
            self.residence = Residence::Removed;
        }
        handle
    }

    /// Run the trigger state machine; no-op for non-trigger bodies.
    pub fn update_trigger(&mut self, source: &impl ContactSource) -> Option<ContactEvent> {
        let handle = self.handle();
        let id = self.id;
        self.trigger.as_mut()?.evaluate(id, handle, source)
    }
}

/// Builds [`Body`] values from [`BodyDef`]s using one config and material table.
pub struct BodyBuilder<'a> {
    config: &'a CollisionConfig,
    materials: &'a MaterialTable,
}

impl<'a> BodyBuilder<'a> {
    pub fn new(config: &'a CollisionConfig, materials: &'a MaterialTable) -> Self {
        Self { config, materials }
    }

    /// Build one body. Fails before anything is allocated if a shape or the
    /// material is invalid, so no partial body escapes.
    ///
    /// `listeners` only take effect on trigger bodies: nothing else raises contact
    /// notifications.
    pub fn build(&self, def: &BodyDef, listeners: ContactListeners) -> Result<Body> {
        let scale = self.config.world_scale;
        let material = self.materials.resolve(&def.material_name)?;
        let shapes = def
            .shapes
            .iter()
            .map(|shape| build_shape(shape, scale))
            .collect::<Result<Vec<_>>>()?;

        let kind = def.kind();
        let initial_pose = iso(
            scaled_vec3(def.position, scale),
            resolve_orientation(def.rotation_deg, def.quaternion),
        );

        let mut builder = RigidBodyBuilder::new(kind.into()).pose(initial_pose);
        if kind == BodyKind::Dynamic {
            builder = builder.additional_mass(def.mass);
        }
        if def.fixed_rotation == Some(true) {
            builder = builder.lock_rotations();
        }
        if let Some(allow_sleep) = def.allow_sleep {
            builder = builder.can_sleep(allow_sleep);
        }
        let mut rigid_body = builder.build();
        if kind == BodyKind::Dynamic && def.allow_sleep == Some(true) {
            rigid_body.activation_mut().normalized_linear_threshold = self.config.sleep_speed_limit;
        }

        let groups: InteractionGroups =
            CollisionFilter::from_parts(def.collision_filter_group, def.collision_filter_mask).into();
        let colliders = shapes
            .iter()
            .map(|built| {
                ColliderBuilder::new(built.shape.clone())
                    .translation(built.local_offset)
                    .rotation(built.local_orientation.scaled_axis())
                    .friction(material.friction)
                    .restitution(material.restitution)
                    .density(0.0)
                    .collision_groups(groups)
                    .sensor(def.trigger)
                    // Fixed and kinematic geometry never counts as touching a trigger.
                    .active_collision_types(ActiveCollisionTypes::default())
                    .build()
            })
            .collect();

        Ok(Body {
            id: BodyId(0),
            mass: def.mass,
            kind,
            initial_pose,
            shapes,
            trigger: def.trigger.then(|| TriggerBody::new(listeners)),
            residence: Residence::Pending {
                rigid_body,
                colliders,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsMaterial;
    use crate::error::CollisionError;
    use crate::types::Vec3;
    use approx::assert_relative_eq;

    fn materials() -> MaterialTable {
        let mut table = MaterialTable::with_default(PhysicsMaterial::default());
        table.insert(
            "rubber",
            PhysicsMaterial {
                friction: 0.9,
                restitution: 0.8,
            },
        );
        table
    }

    fn build(def: &BodyDef) -> Result<Body> {
        let config = CollisionConfig::default();
        let materials = materials();
        BodyBuilder::new(&config, &materials).build(def, ContactListeners::default())
    }

    #[test]
    fn mass_selects_body_kind() {
        assert_eq!(BodyDef::new(0.0, "default").kind(), BodyKind::Fixed);
        assert_eq!(BodyDef::new(0.0, "default").as_kinematic().kind(), BodyKind::Kinematic);
        assert_eq!(BodyDef::new(2.0, "default").kind(), BodyKind::Dynamic);
        assert_eq!(BodyDef::new(2.0, "default").as_kinematic().kind(), BodyKind::Dynamic);
    }

    #[test]
    fn builds_pending_body_with_scaled_pose_and_ordered_shapes() {
        let def = BodyDef::new(5.0, "rubber")
            .with_position([100.0, 200.0, -300.0])
            .with_shape(ShapeDef::cuboid(10.0, 10.0, 10.0).with_name("first"))
            .with_shape(ShapeDef::sphere(5.0).with_name("second"));

        let mut body = build(&def).unwrap();
        assert!(body.is_pending());
        assert!(body.is_dynamic());
        assert_eq!(body.handle(), None);
        assert_relative_eq!(
            body.initial_pose().translation.vector,
            Vec3::new(1.0, 2.0, -3.0),
            epsilon = 1.0e-6
        );
        let names: Vec<_> = body.shapes().iter().map(|s| s.name.as_deref()).collect();
        assert_eq!(names, vec![Some("first"), Some("second")]);

        let (rigid_body, colliders) = body.take_pending().unwrap();
        assert!(rigid_body.is_dynamic());
        assert_eq!(colliders.len(), 2);
        assert_eq!(colliders[0].friction(), 0.9);
        assert_eq!(colliders[1].restitution(), 0.8);
        assert!(body.take_pending().is_none());
    }

    #[test]
    fn trigger_bodies_use_sensor_colliders() {
        let def = BodyDef::new(0.0, "default")
            .as_trigger()
            .with_shape(ShapeDef::cuboid(100.0, 100.0, 100.0));

        let mut body = build(&def).unwrap();
        assert!(body.is_trigger());
        let (_, colliders) = body.take_pending().unwrap();
        assert!(colliders[0].is_sensor());
    }

    #[test]
    fn solid_bodies_are_not_sensors() {
        let def = BodyDef::new(0.0, "default").with_shape(ShapeDef::sphere(1.0));
        let mut body = build(&def).unwrap();
        assert!(!body.is_trigger());
        let (rigid_body, colliders) = body.take_pending().unwrap();
        assert!(rigid_body.is_fixed());
        assert!(!colliders[0].is_sensor());
    }

    #[test]
    fn fixed_rotation_locks_rotations() {
        let mut def = BodyDef::new(1.0, "default").with_shape(ShapeDef::sphere(1.0));
        def.fixed_rotation = Some(true);

        let (rigid_body, _) = build(&def).unwrap().take_pending().unwrap();
        assert!(rigid_body.locked_axes().contains(LockedAxes::ROTATION_LOCKED));
    }

    #[test]
    fn allow_sleep_sets_threshold_on_dynamic_bodies() {
        let mut def = BodyDef::new(1.0, "default").with_shape(ShapeDef::sphere(1.0));
        def.allow_sleep = Some(true);

        let (rigid_body, _) = build(&def).unwrap().take_pending().unwrap();
        assert_eq!(rigid_body.activation().normalized_linear_threshold, 0.2);
    }

    #[test]
    fn unknown_material_without_default_fails() {
        let config = CollisionConfig::default();
        let materials = MaterialTable::new();
        let def = BodyDef::new(0.0, "granite").with_shape(ShapeDef::sphere(1.0));

        let err = BodyBuilder::new(&config, &materials)
            .build(&def, ContactListeners::default())
            .unwrap_err();
        assert_eq!(err, CollisionError::MaterialNotFound("granite".to_string()));
    }

    #[test]
    fn bad_shape_aborts_the_body() {
        let def = BodyDef::new(1.0, "default")
            .with_shape(ShapeDef::sphere(1.0))
            .with_shape(ShapeDef {
                kind: "torus".to_string(),
                ..ShapeDef::default()
            });

        assert_eq!(
            build(&def).unwrap_err(),
            CollisionError::UnsupportedShapeKind("torus".to_string())
        );
    }

    #[test]
    fn deserializes_ron_record() {
        let def: BodyDef = ron::from_str(
            r#"#![enable(implicit_some)]
            (mass: 0.0, materialName: "floor", collisionFilterGroup: 1,
             position: (0.0, -10.0, 0.0), trigger: true,
             shapes: [(kind: "sphere", radius: 4.0)])"#,
        )
        .unwrap();
        assert!(def.trigger);
        assert_eq!(def.collision_filter_group, Some(1));
        assert_eq!(def.collision_filter_mask, None);
        assert_eq!(def.shapes.len(), 1);
    }
}
