//! Positional audio: coordinate conversion, listener pose, and panning.

mod coords;
mod listener;
mod panner;

pub use coords::{GAME_UNITS_PER_ENGINE_UNIT, to_engine_direction, to_engine_space};
pub use listener::{ListenerPose, listener_pose};
pub use panner::{CURVE_DISTANCE_SCALER, MAX_OUTPUT_CHANNELS, fill_flat_matrix, fill_spatial_matrix};
