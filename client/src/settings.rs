//! Collision configuration and material table, read from RON at startup.
//!
//! Missing or broken files are not fatal: the sandbox falls back to the built-in
//! defaults and says so in the log.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use collision::{CollisionConfig, CollisionModelFactory, Config, MaterialTable, PhysicsMaterial};

const COLLISION_CONFIG: &str = "assets/config/collision.ron";
const MATERIALS: &str = "assets/config/materials.ron";

/// Factory shared by everything that spawns collision models.
#[derive(Resource, Debug)]
pub struct CollisionFactory(pub CollisionModelFactory);

impl CollisionFactory {
    pub fn world_scale(&self) -> f32 {
        self.0.config().world_scale
    }
}

pub(super) fn plugin(app: &mut App) {
    let config = load_or_default::<CollisionConfig>(COLLISION_CONFIG, CollisionConfig::default);
    let materials = load_or_default::<MaterialTable>(MATERIALS, || {
        MaterialTable::with_default(PhysicsMaterial::default())
    });
    info!(
        "collision config: scale {}, debug meshes {}, {} materials",
        config.world_scale,
        config.show_debug_meshes,
        materials.len()
    );
    app.insert_resource(CollisionFactory(CollisionModelFactory::new(config, materials)));
}

pub fn asset_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn load_or_default<T: Config>(relative: &str, fallback: impl FnOnce() -> T) -> T {
    let path = asset_path(relative);
    match T::load_from_file(&path) {
        Ok(value) => value,
        Err(err) => {
            warn!("could not load {}: {err}; using defaults", path.display());
            fallback()
        }
    }
}
