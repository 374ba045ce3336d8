use bevy::{camera::Exposure, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (add_camera, add_light));
    app.add_systems(Update, orbit_camera);
}

const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 9.0, -16.0);
const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Radians per second while Q/E is held.
const ORBIT_SPEED: f32 = 1.2;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure { ev100: 13.0 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(CAMERA_OFFSET).looking_at(CAMERA_TARGET, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                200.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

fn add_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, -4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn orbit_camera(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera: Single<&mut Transform, With<Camera3d>>,
) {
    let mut direction = 0.0;
    if keys.pressed(KeyCode::KeyQ) {
        direction += 1.0;
    }
    if keys.pressed(KeyCode::KeyE) {
        direction -= 1.0;
    }
    if direction == 0.0 {
        return;
    }
    let rotation = Quat::from_rotation_y(direction * ORBIT_SPEED * time.delta_secs());
    camera.rotate_around(CAMERA_TARGET, rotation);
    camera.look_at(CAMERA_TARGET, Vec3::Y);
}
