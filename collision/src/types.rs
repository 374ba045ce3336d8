/*!
Math aliases and small conversions shared by the builders.

This module intentionally contains no physics. It defines the vector/rotation
types exchanged between the shape builder, the body builder, the debug mesher and
the body adapters, plus the helpers that turn authoring-style orientation data
(Euler degrees or a raw `[x, y, z, w]` quaternion) into unit quaternions.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Build an isometry from a translation and a rotation.
#[inline]
pub fn iso(translation: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(na::Translation3::from(translation), rotation)
}

/// Convert XYZ-ordered Euler angles in degrees into a unit quaternion.
///
/// The rotation applies X first in the parent frame composition `Rx * Ry * Rz`,
/// matching the convention map editors export.
pub fn quat_from_euler_deg(deg: [f32; 3]) -> Quat {
    let [x, y, z] = deg.map(f32::to_radians);
    Quat::from_axis_angle(&Vec3::x_axis(), x)
        * Quat::from_axis_angle(&Vec3::y_axis(), y)
        * Quat::from_axis_angle(&Vec3::z_axis(), z)
}

/// Convert an `[x, y, z, w]` quaternion into a unit quaternion.
///
/// The components are taken as given; normalization only removes float drift.
#[inline]
pub fn quat_from_xyzw(q: [f32; 4]) -> Quat {
    let [x, y, z, w] = q;
    Quat::from_quaternion(na::Quaternion::new(w, x, y, z))
}

/// Resolve an optional orientation pair. An explicit quaternion wins over Euler angles.
pub fn resolve_orientation(rotation_deg: Option<[f32; 3]>, quaternion: Option<[f32; 4]>) -> Quat {
    match (quaternion, rotation_deg) {
        (Some(q), _) => quat_from_xyzw(q),
        (None, Some(deg)) => quat_from_euler_deg(deg),
        (None, None) => Quat::identity(),
    }
}

/// Scale an optional authoring-space vector into physics space.
#[inline]
pub fn scaled_vec3(v: Option<[f32; 3]>, world_scale: f32) -> Vec3 {
    v.map_or_else(Vec3::zeros, |[x, y, z]| Vec3::new(x, y, z) * world_scale)
}
