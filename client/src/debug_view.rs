//! F3 shows or hides the debug meshes generated at spawn.
//!
//! Whether meshes exist at all is decided by the collision config when a model is
//! built; this only flips the visibility of the views that were created.

use bevy::prelude::*;

use crate::render::DebugMeshView;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMeshesVisible(pub bool);

impl Default for DebugMeshesVisible {
    fn default() -> Self {
        Self(true)
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugMeshesVisible>();
    app.add_systems(
        Update,
        (
            toggle_debug_meshes,
            apply_debug_visibility.run_if(resource_changed::<DebugMeshesVisible>),
        )
            .chain(),
    );
}

fn toggle_debug_meshes(keys: Res<ButtonInput<KeyCode>>, mut visible: ResMut<DebugMeshesVisible>) {
    if keys.just_pressed(KeyCode::F3) {
        visible.0 = !visible.0;
        info!("debug meshes {}", if visible.0 { "shown" } else { "hidden" });
    }
}

fn apply_debug_visibility(
    visible: Res<DebugMeshesVisible>,
    mut views: Query<&mut Visibility, With<DebugMeshView>>,
) {
    let value = if visible.0 {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut views {
        *visibility = value;
    }
}
