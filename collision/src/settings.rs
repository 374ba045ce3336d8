/*!
Collision core defaults and tolerances.

Values used when a definition or config file leaves something unspecified.

Notes
- Authoring units are whatever the map editor exports (roughly centimeters).
- Physics units are meters; `DEFAULT_WORLD_SCALE` converts one to the other.
*/

/// Multiplier from authoring units to physics units.
pub const DEFAULT_WORLD_SCALE: f32 = 0.01;

/// Linear speed below which an idle dynamic body with `allowSleep` may fall asleep
/// (world units per tick).
pub const SLEEP_SPEED_LIMIT: f32 = 0.2;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Name of the material used when a body asks for one the table does not have.
pub const DEFAULT_MATERIAL: &str = "default";

/// Default physics step, matching a 60 Hz fixed update.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;
