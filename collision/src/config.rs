//! Explicit configuration handed to the collision model factory.
//!
//! Nothing in the core reads process-wide state: the world scale, the debug mesh
//! display switch and the material table all travel through these structs.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{CollisionError, Result};
use crate::settings::{DEFAULT_MATERIAL, DEFAULT_WORLD_SCALE, SLEEP_SPEED_LIMIT};

/// Scaling and display settings shared by every model a factory builds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionConfig {
    /// Authoring-unit to physics-unit multiplier.
    pub world_scale: f32,
    /// Global debug mesh display setting. OR-ed with the per-call flag.
    pub show_debug_meshes: bool,
    /// Sleep threshold applied to dynamic bodies that allow sleeping.
    pub sleep_speed_limit: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            world_scale: DEFAULT_WORLD_SCALE,
            show_debug_meshes: false,
            sleep_speed_limit: SLEEP_SPEED_LIMIT,
        }
    }
}

/// Surface response parameters applied to every collider of a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

/// Name → material lookup with a `"default"` fallback.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable(HashMap<String, PhysicsMaterial>);

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding only the `"default"` entry.
    pub fn with_default(material: PhysicsMaterial) -> Self {
        let mut table = Self::new();
        table.insert(DEFAULT_MATERIAL, material);
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, material: PhysicsMaterial) {
        self.0.insert(name.into(), material);
    }

    pub fn get(&self, name: &str) -> Option<&PhysicsMaterial> {
        self.0.get(name)
    }

    /// Resolve `name`, falling back to `"default"`.
    ///
    /// Fails with [`CollisionError::MaterialNotFound`] only when neither exists.
    pub fn resolve(&self, name: &str) -> Result<PhysicsMaterial> {
        if let Some(material) = self.0.get(name) {
            return Ok(*material);
        }
        match self.0.get(DEFAULT_MATERIAL) {
            Some(material) => {
                log::warn!("material `{name}` not found, using `{DEFAULT_MATERIAL}`");
                Ok(*material)
            }
            None => Err(CollisionError::MaterialNotFound(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Errors raised while reading configuration files.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// File-backed configuration. Only RON is understood.
pub trait Config: DeserializeOwned + Sized {
    fn load_from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => {
                let contents = std::fs::read_to_string(path)?;
                Self::from_ron(&contents)
            }
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn from_ron(contents: &str) -> std::result::Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Config for CollisionConfig {}
impl Config for MaterialTable {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_named_material() {
        let mut table = MaterialTable::with_default(PhysicsMaterial::default());
        let ice = PhysicsMaterial {
            friction: 0.01,
            restitution: 0.1,
        };
        table.insert("ice", ice);

        assert_eq!(table.resolve("ice"), Ok(ice));
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let table = MaterialTable::with_default(PhysicsMaterial {
            friction: 0.5,
            restitution: 0.2,
        });

        let material = table.resolve("rubber").unwrap();
        assert_eq!(material.friction, 0.5);
        assert_eq!(material.restitution, 0.2);
    }

    #[test]
    fn resolve_fails_without_named_or_default() {
        let mut table = MaterialTable::new();
        table.insert("metal", PhysicsMaterial::default());

        assert_eq!(
            table.resolve("wood"),
            Err(CollisionError::MaterialNotFound("wood".to_string()))
        );
    }

    #[test]
    fn collision_config_reads_partial_ron() {
        let config = CollisionConfig::from_ron("(showDebugMeshes: true)").unwrap();

        assert!(config.show_debug_meshes);
        assert_eq!(config.world_scale, DEFAULT_WORLD_SCALE);
        assert_eq!(config.sleep_speed_limit, SLEEP_SPEED_LIMIT);
    }

    #[test]
    fn material_table_reads_ron_map() {
        let table =
            MaterialTable::from_ron(r#"{ "default": (friction: 0.4), "ice": (friction: 0.0) }"#)
                .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("ice").unwrap().friction, 0.0);
        assert_eq!(table.get("default").unwrap().restitution, 0.0);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let err = CollisionConfig::load_from_file("physics.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
