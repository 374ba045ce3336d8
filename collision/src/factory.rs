//! Collision model factory: entity collision definition → [`CollisionModel`].
//!
//! The factory is the only place that knows about every stage of construction. It
//! builds each body through [`BodyBuilder`] (which in turn builds each shape),
//! wires the contact listeners into trigger bodies and optionally generates debug
//! meshes. It never touches the physics world: inserting the model is the caller's
//! job ([`crate::PhysicsWorld::add_model`]).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::body::{BodyBuilder, BodyDef};
use crate::config::{CollisionConfig, MaterialTable};
use crate::contact::ContactListeners;
use crate::debug_mesh::{debug_mesh_for_body, random_color};
use crate::error::Result;
use crate::model::CollisionModel;

/// Collision description of one entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionDef {
    pub bodies: Vec<BodyDef>,
}

impl CollisionDef {
    pub fn new(bodies: Vec<BodyDef>) -> Self {
        Self { bodies }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CollisionModelFactory {
    config: CollisionConfig,
    materials: MaterialTable,
}

impl CollisionModelFactory {
    pub fn new(config: CollisionConfig, materials: MaterialTable) -> Self {
        Self { config, materials }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Build a model with one body per `def.bodies` entry, in order.
    ///
    /// Debug meshes are generated when `show_debug_meshes` is set or when the
    /// configuration enables them globally. Any error aborts the whole model.
    pub fn create_collision_model(
        &self,
        def: &CollisionDef,
        listeners: ContactListeners,
        show_debug_meshes: bool,
    ) -> Result<CollisionModel> {
        let builder = BodyBuilder::new(&self.config, &self.materials);
        let bodies = def
            .bodies
            .iter()
            .map(|body| builder.build(body, listeners.clone()))
            .collect::<Result<Vec<_>>>()?;

        let mut model = CollisionModel::new(bodies);

        if show_debug_meshes || self.config.show_debug_meshes {
            let meshes = model
                .bodies()
                .iter()
                .map(|body| Ok((body.id(), debug_mesh_for_body(body, random_color())?)))
                .collect::<Result<Vec<_>>>()?;
            for (id, mesh) in meshes {
                model.attach_mesh(id, mesh);
            }
        }

        debug!(
            "created collision model: {} bodies, dynamic={}, {} debug meshes",
            model.len(),
            model.dynamic(),
            model.mesh_count()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsMaterial;
    use crate::contact::BodyId;
    use crate::debug_mesh::DebugGeometry;
    use crate::error::CollisionError;
    use crate::shape::ShapeDef;
    use approx::assert_relative_eq;

    fn factory() -> CollisionModelFactory {
        CollisionModelFactory::new(
            CollisionConfig::default(),
            MaterialTable::with_default(PhysicsMaterial::default()),
        )
    }

    fn fixed_box() -> BodyDef {
        BodyDef::new(0.0, "default").with_shape(ShapeDef::cuboid(100.0, 10.0, 100.0))
    }

    #[test]
    fn all_static_definition_is_not_dynamic() {
        let def = CollisionDef::new(vec![fixed_box(), fixed_box()]);
        let model = factory()
            .create_collision_model(&def, ContactListeners::default(), false)
            .unwrap();

        assert_eq!(model.len(), 2);
        assert!(!model.dynamic());
        assert_eq!(model.mesh_count(), 0);
    }

    #[test]
    fn any_massive_body_makes_the_model_dynamic() {
        let crate_body = BodyDef::new(4.0, "default").with_shape(ShapeDef::cuboid(1.0, 1.0, 1.0));
        let def = CollisionDef::new(vec![fixed_box(), crate_body]);
        let model = factory()
            .create_collision_model(&def, ContactListeners::default(), false)
            .unwrap();

        assert!(model.dynamic());
        assert!(!model.bodies()[0].is_dynamic());
        assert!(model.bodies()[1].is_dynamic());
    }

    #[test]
    fn debug_meshes_follow_shape_order() {
        let def = CollisionDef::new(vec![
            BodyDef::new(0.0, "default")
                .with_shape(ShapeDef::cuboid(40.0, 10.0, 128.0).with_offset([-20.0, -2.0, -64.0]))
                .with_shape(ShapeDef::sphere(50.0)),
            fixed_box().as_trigger(),
        ]);
        let model = factory()
            .create_collision_model(&def, ContactListeners::default(), true)
            .unwrap();

        let meshes = model.meshes(BodyId(0));
        assert_eq!(meshes.len(), 1);
        let parts = &meshes[0].parts;
        assert_eq!(parts.len(), 2);
        let DebugGeometry::Box { half_extents } = parts[0].geometry else {
            panic!("expected a box first");
        };
        assert_relative_eq!(half_extents.x, 0.2, epsilon = 1.0e-6);
        assert_relative_eq!(parts[0].local_pose.translation.vector.z, -0.64, epsilon = 1.0e-6);
        let DebugGeometry::Sphere { radius } = parts[1].geometry else {
            panic!("expected a sphere second");
        };
        assert_relative_eq!(radius, 0.5, epsilon = 1.0e-6);
        assert!(!meshes[0].ignore_smoothing);

        assert!(model.meshes(BodyId(1))[0].ignore_smoothing);
    }

    #[test]
    fn global_setting_enables_debug_meshes() {
        let config = CollisionConfig {
            show_debug_meshes: true,
            ..CollisionConfig::default()
        };
        let factory =
            CollisionModelFactory::new(config, MaterialTable::with_default(PhysicsMaterial::default()));
        let model = factory
            .create_collision_model(
                &CollisionDef::new(vec![fixed_box()]),
                ContactListeners::default(),
                false,
            )
            .unwrap();

        assert_eq!(model.mesh_count(), 1);
    }

    #[test]
    fn invalid_body_yields_no_model() {
        let torus = BodyDef::new(1.0, "default").with_shape(ShapeDef {
            kind: "torus".to_string(),
            ..ShapeDef::default()
        });
        let def = CollisionDef::new(vec![fixed_box(), torus]);

        let err = factory()
            .create_collision_model(&def, ContactListeners::default(), true)
            .unwrap_err();
        assert_eq!(err, CollisionError::UnsupportedShapeKind("torus".to_string()));
    }

    #[test]
    fn missing_material_yields_no_model() {
        let factory = CollisionModelFactory::new(CollisionConfig::default(), MaterialTable::new());
        let err = factory
            .create_collision_model(
                &CollisionDef::new(vec![fixed_box()]),
                ContactListeners::default(),
                false,
            )
            .unwrap_err();
        assert_eq!(err, CollisionError::MaterialNotFound("default".to_string()));
    }

    #[test]
    fn deserializes_entity_definition() {
        let def: CollisionDef = ron::from_str(
            r#"#![enable(implicit_some)]
            (bodies: [
                (mass: 0.0, materialName: "default",
                 shapes: [(kind: "box", width: 40.0, height: 10.0, depth: 128.0)]),
                (mass: 2.0, materialName: "default", allowSleep: true,
                 shapes: [(kind: "sphere", radius: 5.0)]),
            ])"#,
        )
        .unwrap();
        let model = factory()
            .create_collision_model(&def, ContactListeners::default(), false)
            .unwrap();
        assert_eq!(model.len(), 2);
        assert!(model.dynamic());
    }
}
