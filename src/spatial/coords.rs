use crate::math::Vec3;

/// Scale between game world units and engine meters.
pub const GAME_UNITS_PER_ENGINE_UNIT: f32 = 100.0;

/// Remaps a game-space vector onto the engine's axes.
///
/// The game uses X-forward, Y-right, Z-up; the engine listens along +Z with
/// +X to the right and +Y up, so `(x, y, z)` becomes `(-y, z, x)`.
fn permute(game: Vec3) -> Vec3 {
    Vec3::new(-game.y, game.z, game.x)
}

/// Converts a game-space position into engine space, including unit scale.
pub fn to_engine_space(game: Vec3) -> Vec3 {
    permute(game) / GAME_UNITS_PER_ENGINE_UNIT
}

/// Converts a game-space direction into a unit-length engine-space direction.
///
/// Zero-length input stays zero rather than becoming NaN.
pub fn to_engine_direction(game: Vec3) -> Vec3 {
    permute(game).normalize_or_zero()
}
