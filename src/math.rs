//! Math types shared across the engine.
//!
//! Game space is the host's convention: forward = +X, right = +Y, up = +Z,
//! distances in game units (roughly centimeters). Rotations arrive as
//! [`Rotator`]s in the host's integer angular units.

pub use glam::{Quat, Vec3};

use std::f32::consts::PI;

/// Game angular units per half revolution; a full turn is 65536 units.
pub const UNITS_PER_HALF_TURN: f32 = 32768.0;

/// A quarter revolution in game angular units.
pub const QUARTER_TURN: i32 = 16384;

/// Converts game angular units to radians.
pub fn game_angle_to_radians(units: i32) -> f32 {
    units as f32 * PI / UNITS_PER_HALF_TURN
}

/// Orientation in game angular units, as the host exposes it.
///
/// Positive pitch looks up and positive yaw turns toward game right (+Y).
/// Roll tilts about the forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rotator {
    pub pitch: i32,
    pub yaw: i32,
    pub roll: i32,
}

impl Rotator {
    pub fn new(pitch: i32, yaw: i32, roll: i32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Forward direction from yaw and pitch. Roll does not affect it.
    pub fn forward(&self) -> Vec3 {
        let pitch = game_angle_to_radians(self.pitch);
        let yaw = game_angle_to_radians(self.yaw);
        Vec3::new(
            yaw.cos() * pitch.cos(),
            yaw.sin() * pitch.cos(),
            pitch.sin(),
        )
    }

    /// Full orientation quaternion: roll, then pitch, then yaw.
    pub fn orientation(&self) -> Quat {
        let pitch = game_angle_to_radians(self.pitch);
        let yaw = game_angle_to_radians(self.yaw);
        let roll = game_angle_to_radians(self.roll);
        Quat::from_rotation_z(yaw) * Quat::from_rotation_y(-pitch) * Quat::from_rotation_x(roll)
    }

    /// World-up rotated by the full orientation.
    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }
}
