//! # CueSonic
//!
//! A positional sound-effect playback engine for game overlays and plugins.
//!
//! CueSonic decodes short clips from a sound directory, pools playback voices
//! by source format, and mixes everything into one cpal output stream.
//! Positioned sounds are panned across the speaker layout from the game
//! camera's point of view and keep following it while they play.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cuesonic::{
//!     CameraProfile, CueSonicDesc, CueSonicEngine, FixedCameraFeed, PlayParams, Vec3,
//! };
//! use std::sync::Arc;
//!
//! let desc = CueSonicDesc::new().sounds_dir("sounds").volume(0.8);
//! let camera = Arc::new(FixedCameraFeed::new(CameraProfile::default()));
//! let mut engine = CueSonicEngine::new(desc, camera);
//! engine.initialize()?;
//!
//! // Play a clip at a world position, in game units.
//! engine.play_sound(
//!     "bonk.wav",
//!     Some(PlayParams::at(Vec3::new(300.0, 0.0, 90.0))),
//!     0.5,
//! )?;
//!
//! // Once per frame: follow the camera and collect finished voices.
//! engine.retrack();
//! # Ok::<(), cuesonic::CueSonicError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`CueSonicEngine`]**: Facade over the clip store, voice pool, and output stream
//! - **[`ClipStore`]**: Decode-once cache of mono clips keyed by file name
//! - **[`CameraFeed`]**: Trait the host implements to expose its camera pose
//! - **[`EventSoundTable`]**: Per-event sound assignments a host binds to game moments
//! - **[`PlayParams`]**: Tracked, preview, or flat placement for one play
//!
//! ## Architecture
//!
//! Control stays on the host's thread: plays, retracks, and device changes
//! all go through [`CueSonicEngine`]. The cpal stream callback mixes active
//! voices on its own thread through a shared render state; it only ever tries
//! the lock and reports finished voices over a channel, which the pool drains
//! before handing out anything.

pub mod camera;
pub mod clip;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod spatial;
pub mod voice;

mod mixer;

pub use camera::{CameraFeed, CameraPose, CameraProfile, FixedCameraFeed};
pub use clip::{AudioClip, ClipLoader, ClipStore, DefaultClipLoader};
pub use config::CueSonicDesc;
pub use device::{
    DEFAULT_DEVICE_ID, DeviceSelection, OutputDevice, consolidate_output_devices,
    enumerate_output_devices,
};
pub use engine::{CueSonicEngine, PlayParams};
pub use error::{CueSonicError, Result};
pub use events::{EventKind, EventSound, EventSoundTable};
pub use math::{Quat, Rotator, Vec3};
pub use spatial::{CURVE_DISTANCE_SCALER, ListenerPose, listener_pose};
pub use voice::{VoiceFormat, VoiceIndex, VoiceState};
